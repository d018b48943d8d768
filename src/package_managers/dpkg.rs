//! dpkg backend
//!
//! dpkg only knows about installed packages, so repository, patch, search,
//! install and update operations report "not implemented". Changelogs are not
//! in the dpkg database; they are read from the gzip files packages ship
//! under `/usr/share/doc`.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;

use super::PackageBackend;
use super::parse::{output_lines, parse_key_values, parse_package_lines, truncate_lines};
use crate::core::process::spawn;
use crate::core::{
    CommandRunner, InstallPackageParams, InstallPatchesParams, ListPatchesParams,
    ModifyRepoParams, PackageRecord, PatchRecord, PkgError, QueryMode, QueryResult, QueryValue,
    RemovePackageParams, RepoRecord, Result, SearchHit, SearchPackageParams, ToolOutput,
    UpdatePackageParams,
};

const LIST_FORMAT: &str = "${binary:Package},${Version},${Installed-Size}\\n";

/// dpkg reports `Installed-Size` in KiB
const INSTALLED_SIZE_UNIT: u64 = 1024;

const CHANGELOG_FILES: [&str; 2] = ["changelog.Debian.gz", "changelog.gz"];

#[derive(Debug, Clone)]
pub struct DpkgBackend {
    runner: Arc<dyn CommandRunner>,
    dpkg: PathBuf,
    dpkg_query: PathBuf,
    root: Option<PathBuf>,
}

impl DpkgBackend {
    #[must_use]
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        dpkg: PathBuf,
        dpkg_query: PathBuf,
        root: Option<PathBuf>,
    ) -> Self {
        Self {
            runner,
            dpkg,
            dpkg_query,
            root,
        }
    }

    fn with_root(&self, args: &[&str]) -> Vec<String> {
        let mut argv = Vec::new();
        if let Some(root) = &self.root {
            argv.push("--root".to_string());
            argv.push(root.display().to_string());
        }
        argv.extend(args.iter().map(ToString::to_string));
        argv
    }

    fn query_tool(&self, args: &[&str]) -> Result<ToolOutput> {
        spawn(self.runner.as_ref(), &self.dpkg_query, &self.with_root(args))
    }

    /// Run a per-package dpkg-query, mapping exit 1 to not found
    fn query_installed(&self, name: &str, args: &[&str]) -> Result<ToolOutput> {
        let output = self.query_tool(args)?;
        if output.exited_with(1) {
            return Err(PkgError::PackageNotFound(name.to_string()));
        }
        output.into_checked(&self.dpkg_query)
    }

    fn relations(&self, name: &str, field: &str, lines: i64) -> Result<Vec<String>> {
        let format = format!("${{{field}}}");
        let output = self.query_installed(name, &["-W", "-f", &format, name])?;
        let relations = output
            .stdout
            .split(',')
            .map(str::trim)
            .filter(|relation| !relation.is_empty())
            .map(str::to_string)
            .collect();
        Ok(truncate_lines(relations, lines))
    }

    fn changelog(&self, name: &str, lines: i64) -> Result<Vec<String>> {
        self.query_installed(name, &["-W", name])?;

        // Multi-arch names (`libc6:amd64`) share one doc directory
        let package = name.split(':').next().unwrap_or(name);
        let doc_dir = self
            .root
            .as_deref()
            .unwrap_or(Path::new("/"))
            .join("usr/share/doc")
            .join(package);

        for file in CHANGELOG_FILES {
            let path = doc_dir.join(file);
            match read_gzip(&path) {
                Ok(text) => return Ok(truncate_lines(output_lines(&text), lines)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        tracing::debug!("no changelog shipped in {}", doc_dir.display());
        Ok(Vec::new())
    }

    const fn not_implemented(operation: &'static str) -> PkgError {
        PkgError::NotImplemented {
            operation,
            backend: "dpkg",
        }
    }
}

fn read_gzip(path: &Path) -> io::Result<String> {
    let mut text = String::new();
    GzDecoder::new(File::open(path)?).read_to_string(&mut text)?;
    Ok(text)
}

impl PackageBackend for DpkgBackend {
    fn name(&self) -> &'static str {
        "dpkg"
    }

    fn list_packages(&self, pattern: &str) -> Result<Vec<PackageRecord>> {
        let mut args = vec!["-W", "-f", LIST_FORMAT];
        if !pattern.is_empty() {
            args.push(pattern);
        }
        let output = self.query_tool(&args)?;

        // "dpkg-query: no packages found matching ..."
        if output.exited_with(1) {
            return Ok(Vec::new());
        }
        let output = output.into_checked(&self.dpkg_query)?;
        Ok(parse_package_lines(&output.stdout, INSTALLED_SIZE_UNIT))
    }

    fn query_package(&self, name: &str, mode: QueryMode, lines: i64) -> Result<QueryResult> {
        let mut result = QueryResult::new();
        let value = match mode {
            QueryMode::Info => {
                let output = self.query_installed(name, &["-s", name])?;
                for (key, value) in parse_key_values(&output.stdout, None) {
                    result.insert(key, QueryValue::Text(value));
                }
                return Ok(result);
            }
            QueryMode::Requires => self.relations(name, "Depends", lines)?,
            QueryMode::Recommends => self.relations(name, "Recommends", lines)?,
            QueryMode::Obsoletes => self.relations(name, "Breaks", lines)?,
            QueryMode::Changelog => self.changelog(name, lines)?,
        };
        result.insert(mode.as_str().to_string(), QueryValue::Lines(value));
        Ok(result)
    }

    fn list_repos(&self, _name: &str) -> Result<Vec<RepoRecord>> {
        Err(Self::not_implemented("listing repositories"))
    }

    fn modify_repo(&self, _params: &ModifyRepoParams) -> Result<Option<RepoRecord>> {
        Err(Self::not_implemented("modifying repositories"))
    }

    fn refresh_repos(&self, _name: &str) -> Result<()> {
        Err(Self::not_implemented("refreshing repositories"))
    }

    fn list_patches(&self, _params: &ListPatchesParams) -> Result<Vec<PatchRecord>> {
        Err(Self::not_implemented("listing patches"))
    }

    fn install_patches(&self, _params: &InstallPatchesParams) -> Result<Vec<PatchRecord>> {
        Err(Self::not_implemented("installing patches"))
    }

    fn search_packages(&self, _params: &SearchPackageParams) -> Result<Vec<SearchHit>> {
        Err(Self::not_implemented("searching packages"))
    }

    fn install_package(&self, _params: &InstallPackageParams) -> Result<String> {
        Err(Self::not_implemented("installing packages"))
    }

    fn remove_package(&self, params: &RemovePackageParams) -> Result<String> {
        if params.remove_deps {
            return Err(PkgError::Unsupported {
                operation: "removing dependencies",
                backend: "dpkg",
            });
        }
        let mut args = vec![if params.purge { "--purge" } else { "--remove" }];
        if params.show_details {
            args.push("--dry-run");
        }
        args.push(&params.name);

        let output = spawn(self.runner.as_ref(), &self.dpkg, &self.with_root(&args))?
            .into_checked(&self.dpkg)?;
        Ok(output.combined())
    }

    fn update_package(&self, _params: &UpdatePackageParams) -> Result<String> {
        Err(Self::not_implemented("updating packages"))
    }
}
