//! Error types for package operations with helpful suggestions

use thiserror::Error;

/// Convenience Result type for package operations
pub type Result<T> = std::result::Result<T, PkgError>;

/// Coarse classification callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ToolExecution,
    Unsupported,
    MalformedInput,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ToolExecution => "tool_execution_failure",
            Self::Unsupported => "unsupported_operation",
            Self::MalformedInput => "malformed_input",
        }
    }
}

#[derive(Error, Debug)]
pub enum PkgError {
    #[error("package not found: {0}")]
    PackageNotFound(String),

    #[error("couldn't get repo {0}")]
    RepoNotFound(String),

    #[error("{tool} failed with {status}, output: {output}", status = exit_status(.code))]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        output: String,
    },

    #[error("could not run {tool}: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {tool} output: {message}")]
    Parse { tool: String, message: String },

    #[error("{operation} is not supported on {backend}")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },

    #[error("{operation} on {backend}: not implemented")]
    NotImplemented {
        operation: &'static str,
        backend: &'static str,
    },

    #[error("no package manager found")]
    NoPackageManager,

    #[error("{0}")]
    MalformedInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[allow(clippy::ref_option)]
fn exit_status(code: &Option<i32>) -> String {
    code.map_or_else(
        || "no exit code (terminated by signal)".to_string(),
        |c| format!("exit code {c}"),
    )
}

impl PkgError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PackageNotFound(_) | Self::RepoNotFound(_) => ErrorKind::NotFound,
            Self::Unsupported { .. } | Self::NotImplemented { .. } | Self::NoPackageManager => {
                ErrorKind::Unsupported
            }
            Self::MalformedInput(_) | Self::ConfigError(_) => ErrorKind::MalformedInput,
            Self::ToolFailed { .. }
            | Self::ToolUnavailable { .. }
            | Self::Parse { .. }
            | Self::IoError(_) => ErrorKind::ToolExecution,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        self.kind() == ErrorKind::Unsupported
    }

    /// Get a helpful suggestion for how to fix this error
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::PackageNotFound(_) => {
                Some("Try: search-package to find the exact name of an available package")
            }
            Self::RepoNotFound(_) => Some("Try: list-repos to see the configured repositories"),
            Self::NoPackageManager => Some(
                "Supported package managers: rpm with zypper, rpm with dnf, dpkg.\nIf the host uses an alternate root, pass --root",
            ),
            Self::ToolUnavailable { .. } => {
                Some("Check that the package manager is installed and on PATH")
            }
            Self::ToolFailed { .. } => Some(
                "Try running with sudo, or check the captured tool output above for details",
            ),
            Self::ConfigError(_) => Some(
                "Check ~/.config/managesw/config.toml for syntax errors.\nReset with: rm ~/.config/managesw/config.toml",
            ),
            Self::Parse { .. }
            | Self::Unsupported { .. }
            | Self::NotImplemented { .. }
            | Self::MalformedInput(_)
            | Self::IoError(_) => None,
        }
    }
}

/// Format an error with its suggestion for display
pub fn format_error_with_suggestion(err: &PkgError) -> String {
    let mut msg = format!("Error: {err}");
    if let Some(suggestion) = err.suggestion() {
        msg.push_str("\n\n");
        msg.push_str(suggestion);
    }
    msg
}
