//! RPM family backend: `rpm` for the installed-package database, paired with
//! either `zypper` or `dnf` for repositories, search and transactions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::PackageBackend;
use super::parse::{output_lines, parse_key_values, parse_package_lines, truncate_lines};
use crate::core::process::spawn;
use crate::core::{
    CommandRunner, InstallPackageParams, InstallPatchesParams, ListPatchesParams,
    ModifyRepoParams, PackageRecord, PatchRecord, PkgError, QueryMode, QueryResult, QueryValue,
    RemovePackageParams, RepoRecord, Result, SearchHit, SearchPackageParams, ToolOutput,
    UpdatePackageParams,
};

/// `rpm --qf` format producing `name,version,size` lines
const LIST_QUERY_FORMAT: &str = "%{NAME},%{VERSION},%{SIZE}\\n";

/// Front end paired with rpm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpmFlavor {
    Zypper,
    Dnf,
}

impl RpmFlavor {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Zypper => "zypper",
            Self::Dnf => "dnf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RpmBackend {
    runner: Arc<dyn CommandRunner>,
    rpm: PathBuf,
    flavor: RpmFlavor,
    manager: PathBuf,
    root: Option<PathBuf>,
}

impl RpmBackend {
    #[must_use]
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        rpm: PathBuf,
        flavor: RpmFlavor,
        manager: PathBuf,
        root: Option<PathBuf>,
    ) -> Self {
        Self {
            runner,
            rpm,
            flavor,
            manager,
            root,
        }
    }

    /// Run rpm with `--root` prefixed when configured
    fn rpm<I, S>(&self, args: I) -> Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = Vec::new();
        if let Some(root) = &self.root {
            argv.push("--root".to_string());
            argv.push(root.display().to_string());
        }
        argv.extend(args.into_iter().map(Into::into));
        spawn(self.runner.as_ref(), &self.rpm, &argv)
    }

    /// Run the paired front end with its alternate-root option prefixed
    pub(super) fn manager(&self, args: Vec<String>) -> Result<ToolOutput> {
        let mut argv = Vec::new();
        if let Some(root) = &self.root {
            let flag = match self.flavor {
                RpmFlavor::Zypper => "--root",
                RpmFlavor::Dnf => "--installroot",
            };
            argv.push(flag.to_string());
            argv.push(root.display().to_string());
        }
        argv.extend(args);
        spawn(self.runner.as_ref(), &self.manager, &argv)
    }

    pub(super) fn manager_path(&self) -> &Path {
        &self.manager
    }

    fn unsupported(&self, operation: &'static str) -> PkgError {
        PkgError::Unsupported {
            operation,
            backend: self.flavor.name(),
        }
    }
}

impl PackageBackend for RpmBackend {
    fn name(&self) -> &'static str {
        self.flavor.name()
    }

    fn list_packages(&self, pattern: &str) -> Result<Vec<PackageRecord>> {
        let mut args = vec!["-qa".to_string(), "--qf".to_string(), LIST_QUERY_FORMAT.to_string()];
        if !pattern.is_empty() {
            args.push(pattern.to_string());
        }
        let output = self.rpm(args)?;

        // rpm exits with 1 when nothing matches the pattern
        if output.exited_with(1) {
            return Ok(Vec::new());
        }
        let output = output.into_checked(&self.rpm)?;
        Ok(parse_package_lines(&output.stdout, 1))
    }

    fn query_package(&self, name: &str, mode: QueryMode, lines: i64) -> Result<QueryResult> {
        let args: Vec<&str> = match mode {
            QueryMode::Info => vec!["-qi", name],
            QueryMode::Requires => vec!["-q", "--requires", name],
            QueryMode::Recommends => vec!["-q", "--recommends", name],
            QueryMode::Obsoletes => vec!["-q", "--obsoletes", name],
            QueryMode::Changelog => vec!["-q", "--changelog", name],
        };
        let output = self.rpm(args)?;
        if output.exited_with(1) {
            return Err(PkgError::PackageNotFound(name.to_string()));
        }
        let output = output.into_checked(&self.rpm)?;

        let mut result = QueryResult::new();
        if mode == QueryMode::Info {
            for (key, value) in parse_key_values(&output.stdout, Some("Description")) {
                result.insert(key, QueryValue::Text(value));
            }
        } else {
            let lines = truncate_lines(output_lines(&output.stdout), lines);
            result.insert(mode.as_str().to_string(), QueryValue::Lines(lines));
        }
        Ok(result)
    }

    fn list_repos(&self, name: &str) -> Result<Vec<RepoRecord>> {
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_list_repos(name),
            RpmFlavor::Dnf => self.dnf_list_repos(name),
        }
    }

    fn modify_repo(&self, params: &ModifyRepoParams) -> Result<Option<RepoRecord>> {
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_modify_repo(params),
            RpmFlavor::Dnf => self.dnf_modify_repo(params),
        }
    }

    fn refresh_repos(&self, name: &str) -> Result<()> {
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_refresh_repos(name),
            RpmFlavor::Dnf => self.dnf_refresh_repos(name),
        }
    }

    fn list_patches(&self, params: &ListPatchesParams) -> Result<Vec<PatchRecord>> {
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_list_patches(params),
            RpmFlavor::Dnf => Err(self.unsupported("listing patches")),
        }
    }

    fn install_patches(&self, params: &InstallPatchesParams) -> Result<Vec<PatchRecord>> {
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_install_patches(params),
            RpmFlavor::Dnf => Err(self.unsupported("installing patches")),
        }
    }

    fn search_packages(&self, params: &SearchPackageParams) -> Result<Vec<SearchHit>> {
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_search(params),
            RpmFlavor::Dnf => self.dnf_search(params),
        }
    }

    fn install_package(&self, params: &InstallPackageParams) -> Result<String> {
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_install(params),
            RpmFlavor::Dnf => self.dnf_install(params),
        }
    }

    fn remove_package(&self, params: &RemovePackageParams) -> Result<String> {
        // Neither front end can purge configuration the way dpkg does
        if params.purge {
            return Err(self.unsupported("purging packages"));
        }
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_remove(params),
            RpmFlavor::Dnf => self.dnf_remove(params),
        }
    }

    fn update_package(&self, params: &UpdatePackageParams) -> Result<String> {
        match self.flavor {
            RpmFlavor::Zypper => self.zypper_update(params),
            RpmFlavor::Dnf => self.dnf_update(params),
        }
    }
}

/// Keep repos whose alias or display name equals `name`; empty keeps all
pub(super) fn filter_repos(repos: Vec<RepoRecord>, name: &str) -> Vec<RepoRecord> {
    if name.is_empty() {
        return repos;
    }
    repos
        .into_iter()
        .filter(|repo| {
            repo.get("alias").is_some_and(|a| a == name) || repo.get("name").is_some_and(|n| n == name)
        })
        .collect()
}
