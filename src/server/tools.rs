//! Tool catalogue exposed through `tools/list`

use serde_json::{Value, json};
use std::str::FromStr;

use crate::core::QueryMode;

/// Every tool the server answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ListPackages,
    QueryPackage,
    ListRepos,
    ModifyRepo,
    RefreshRepos,
    ListPatches,
    InstallPatches,
    SearchPackage,
    InstallPackage,
    RemovePackage,
    UpdatePackage,
}

impl Tool {
    pub const ALL: [Self; 11] = [
        Self::ListPackages,
        Self::QueryPackage,
        Self::ListRepos,
        Self::ModifyRepo,
        Self::RefreshRepos,
        Self::ListPatches,
        Self::InstallPatches,
        Self::SearchPackage,
        Self::InstallPackage,
        Self::RemovePackage,
        Self::UpdatePackage,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListPackages => "list-packages",
            Self::QueryPackage => "query-package",
            Self::ListRepos => "list-repos",
            Self::ModifyRepo => "modify-repo",
            Self::RefreshRepos => "refresh-repos",
            Self::ListPatches => "list-patches",
            Self::InstallPatches => "install-patches",
            Self::SearchPackage => "search-package",
            Self::InstallPackage => "install-package",
            Self::RemovePackage => "remove-package",
            Self::UpdatePackage => "update-package",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ListPackages => {
                "List installed packages with name, version and installed size in bytes. \
                 An optional name pattern narrows the list; no match is an empty list."
            }
            Self::QueryPackage => {
                "Query an installed package. Mode info returns its attributes, the other \
                 modes return lines of requires, recommends, obsoletes or changelog output."
            }
            Self::ListRepos => "List configured repositories, optionally only the named one.",
            Self::ModifyRepo => {
                "Create, update or remove a repository. A missing repository is created \
                 from url; an existing one is enabled or disabled in place."
            }
            Self::RefreshRepos => "Refresh repository metadata, optionally for one repository.",
            Self::ListPatches => "List needed patches, optionally filtered by category and severity.",
            Self::InstallPatches => "Install needed patches, optionally filtered by category and severity.",
            Self::SearchPackage => "Search the configured repositories for packages by name.",
            Self::InstallPackage => "Install a package and return the package manager transcript.",
            Self::RemovePackage => "Remove a package and return the package manager transcript.",
            Self::UpdatePackage => {
                "Update one package, or the whole system when no name is given, and return \
                 the package manager transcript."
            }
        }
    }

    /// JSON schema of the `arguments` object
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let show_details = json!({
            "type": "boolean",
            "description": "Dry run: show what would happen without changing the system",
            "default": false
        });
        let repos = json!({
            "type": "array",
            "items": {"type": "string"},
            "description": "Restrict to these repositories"
        });

        match self {
            Self::ListPackages => object(
                json!({"name": string("Package name or pattern; empty lists everything")}),
                &[],
            ),
            Self::QueryPackage => object(
                json!({
                    "name": string("Installed package name"),
                    "mode": {
                        "type": "string",
                        "enum": QueryMode::names(),
                        "default": QueryMode::default().as_str(),
                        "description": "What to query"
                    },
                    "lines": {
                        "type": "integer",
                        "description": "Maximum number of lines for line-oriented modes; 0 or less for all",
                        "default": 0
                    }
                }),
                &["name"],
            ),
            Self::ListRepos | Self::RefreshRepos => {
                object(json!({"name": string("Repository alias; empty means all")}), &[])
            }
            Self::ModifyRepo => object(
                json!({
                    "name": string("Repository alias"),
                    "url": string("Repository url, required when the repository does not exist"),
                    "disable": {"type": "boolean", "description": "Disable instead of enable", "default": false},
                    "no_gpgcheck": {"type": "boolean", "description": "Turn off signature checking", "default": false},
                    "remove": {"type": "boolean", "description": "Remove the repository", "default": false}
                }),
                &["name"],
            ),
            Self::ListPatches => object(
                json!({
                    "category": string("Patch category, e.g. security"),
                    "severity": string("Patch severity, e.g. important")
                }),
                &[],
            ),
            Self::InstallPatches => object(
                json!({
                    "category": string("Patch category, e.g. security"),
                    "severity": string("Patch severity, e.g. important"),
                    "show_details": show_details
                }),
                &[],
            ),
            Self::SearchPackage => object(
                json!({"name": string("Search term"), "repos": repos}),
                &["name"],
            ),
            Self::InstallPackage => object(
                json!({
                    "name": string("Package name"),
                    "version": string("Exact version to install"),
                    "from_repo": string("Install from this repository"),
                    "with_recommended": {"type": "boolean", "description": "Also install recommended packages", "default": false},
                    "show_details": show_details
                }),
                &["name"],
            ),
            Self::RemovePackage => object(
                json!({
                    "name": string("Package name"),
                    "remove_deps": {"type": "boolean", "description": "Also remove dependencies no longer needed", "default": false},
                    "purge": {"type": "boolean", "description": "Also remove configuration files", "default": false},
                    "show_details": show_details
                }),
                &["name"],
            ),
            Self::UpdatePackage => object(
                json!({
                    "name": string("Package name; empty updates the whole system"),
                    "repos": repos,
                    "dist_upgrade": {"type": "boolean", "description": "Distribution upgrade instead of a plain update", "default": false},
                    "show_details": show_details
                }),
                &[],
            ),
        }
    }

    /// `tools/list` entry
    #[must_use]
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema(),
        })
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| format!("unknown tool: {s}"))
    }
}

fn string(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// All `tools/list` entries
#[must_use]
pub fn definitions() -> Vec<Value> {
    Tool::ALL.iter().map(Tool::definition).collect()
}
