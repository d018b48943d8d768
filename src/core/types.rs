//! Normalized data model shared by every backend

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{PkgError, Result};

/// One installed package as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    /// Installed size in bytes, 0 when the native tool reported something unparsable
    pub installed_size_bytes: u64,
}

/// Open attribute map used for repositories, patches and search hits.
///
/// The attribute set depends on the backend that produced it, so callers must
/// treat presence of any key as backend-dependent.
pub type Record = BTreeMap<String, String>;

pub type RepoRecord = Record;
pub type PatchRecord = Record;
pub type SearchHit = Record;

/// A single query attribute: one value (info mode) or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Text(String),
    Lines(Vec<String>),
}

impl QueryValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Lines(_) => None,
        }
    }

    #[must_use]
    pub fn as_lines(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::Lines(lines) => Some(lines),
        }
    }
}

pub type QueryResult = BTreeMap<String, QueryValue>;

/// What a package query asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    Info,
    Requires,
    Recommends,
    Obsoletes,
    Changelog,
}

impl QueryMode {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Info,
            Self::Requires,
            Self::Recommends,
            Self::Obsoletes,
            Self::Changelog,
        ]
    }

    /// Key under which line-oriented modes store their output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Requires => "requires",
            Self::Recommends => "recommends",
            Self::Obsoletes => "obsoletes",
            Self::Changelog => "changelog",
        }
    }

    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::all().iter().map(Self::as_str).collect()
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QueryMode {
    type Err = PkgError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "info" => Ok(Self::Info),
            "requires" => Ok(Self::Requires),
            "recommends" => Ok(Self::Recommends),
            "obsoletes" => Ok(Self::Obsoletes),
            "changelog" => Ok(Self::Changelog),
            _ => Err(PkgError::MalformedInput(format!(
                "invalid mode: {s} valid modes: {:?}",
                Self::names()
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATION PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPackagesParams {
    /// Name pattern; empty lists every installed package
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPackageParams {
    pub name: String,
    pub mode: QueryMode,
    /// Number of lines for line-oriented modes; `<= 0` means all of them
    pub lines: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListReposParams {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyRepoParams {
    pub name: String,
    /// Only needed when the repository does not exist yet
    pub url: String,
    pub disable: bool,
    pub no_gpgcheck: bool,
    pub remove: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshReposParams {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPatchesParams {
    pub category: String,
    pub severity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallPatchesParams {
    pub category: String,
    pub severity: String,
    pub show_details: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPackageParams {
    pub name: String,
    pub repos: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallPackageParams {
    pub name: String,
    pub version: String,
    pub from_repo: String,
    pub with_recommended: bool,
    /// Dry run: show what would happen without changing the system
    pub show_details: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovePackageParams {
    pub name: String,
    pub remove_deps: bool,
    pub purge: bool,
    pub show_details: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatePackageParams {
    /// Empty updates the whole system
    pub name: String,
    pub repos: Vec<String>,
    /// Distribution upgrade (`zypper dup`, `dnf distro-sync`)
    pub dist_upgrade: bool,
    pub show_details: bool,
}
