//! Input validation for caller-supplied names
//!
//! Rejects malformed input before any subprocess is spawned. Arguments are
//! passed as an argv vector, so the checks guard against option injection
//! (`--root=/`) and traversal rather than shell metacharacters.

use super::error::{PkgError, Result};

/// Maximum accepted length for a package or repository name
const MAX_LENGTH: usize = 255;

/// Validate a required package name
///
/// Glob characters are allowed because rpm and dpkg-query accept patterns.
pub fn validate_package_name(name: &str) -> Result<()> {
    validate_name("package", name, false)
}

/// Validate a repository alias or display name
///
/// Display names such as "Main Repository" carry inner spaces, so only
/// surrounding whitespace is refused.
pub fn validate_repo_name(name: &str) -> Result<()> {
    if name.trim() != name {
        return Err(PkgError::MalformedInput(format!(
            "repository name has surrounding whitespace: {name:?}"
        )));
    }
    validate_name("repository", name, true)
}

/// Validate an optional name filter, empty meaning "everything"
pub fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Ok(());
    }
    validate_name("package", pattern, false)
}

fn validate_name(what: &str, name: &str, inner_spaces: bool) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PkgError::MalformedInput(format!(
            "name for {what} is mandatory"
        )));
    }

    if name.len() > MAX_LENGTH {
        return Err(PkgError::MalformedInput(format!(
            "{what} name too long (max {MAX_LENGTH} characters)"
        )));
    }

    if name.starts_with('-') {
        return Err(PkgError::MalformedInput(format!(
            "{what} name cannot start with '-': {name}"
        )));
    }

    for c in name.chars() {
        if c.is_control() || (c.is_whitespace() && !(inner_spaces && c == ' ')) {
            return Err(PkgError::MalformedInput(format!(
                "invalid character {c:?} in {what} name"
            )));
        }
    }

    if name.contains("..") || name.contains('/') {
        return Err(PkgError::MalformedInput(format!(
            "{what} name cannot contain a path: {name}"
        )));
    }

    Ok(())
}

/// Validate a free-form flag value passed straight through to a tool
pub fn validate_flag_value(what: &str, value: &str) -> Result<()> {
    if value.starts_with('-') {
        return Err(PkgError::MalformedInput(format!(
            "{what} cannot start with '-': {value}"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(PkgError::MalformedInput(format!(
            "invalid control character in {what}"
        )));
    }
    Ok(())
}
