//! dnf front end for the RPM backend

use super::parse::{Separator, parse_blocks};
use super::rpm::{RpmBackend, filter_repos};
use crate::core::{
    InstallPackageParams, ModifyRepoParams, PkgError, Record, RemovePackageParams, RepoRecord,
    Result, SearchHit, SearchPackageParams, UpdatePackageParams,
};

/// Turns any transaction into a test transaction
const DRY_RUN: &str = "--setopt=tsflags=test";

/// dnf4 and dnf5 spell the repo info keys differently; both map onto the
/// same record keys zypper uses
fn normalize_repo_key(key: &str) -> &str {
    match key {
        "Repo-id" | "Repo ID" | "Id" => "alias",
        "Repo-name" | "Name" => "name",
        "Repo-status" | "Status" => "enabled",
        "Repo-baseurl" | "Base URL" => "url",
        "Repo-metalink" | "Metalink" => "metalink",
        "Repo-mirrors" | "Mirrorlist" => "mirrorlist",
        other => other,
    }
}

fn repo_record(entries: Vec<(String, String)>) -> RepoRecord {
    entries
        .into_iter()
        .map(|(key, value)| {
            let key = normalize_repo_key(&key).to_string();
            let value = if key == "enabled" {
                match value.as_str() {
                    "enabled" => "1".to_string(),
                    "disabled" => "0".to_string(),
                    _ => value,
                }
            } else {
                value
            };
            (key, value)
        })
        .collect()
}

fn with_repos(argv: &mut Vec<String>, repos: &[String]) {
    for repo in repos {
        argv.push(format!("--repo={repo}"));
    }
}

fn base(args: &[&str]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}

impl RpmBackend {
    // ═══════════════════════════════════════════════════════════════════════
    // REPOSITORIES
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn dnf_list_repos(&self, name: &str) -> Result<Vec<RepoRecord>> {
        let output = self
            .manager(base(&["repo", "info", "--all"]))?
            .into_checked(self.manager_path())?;
        let repos = parse_blocks(&output.stdout, Separator::BlankLine)
            .into_iter()
            .map(|block| repo_record(block.entries))
            .filter(|repo| repo.contains_key("alias"))
            .collect();
        Ok(filter_repos(repos, name))
    }

    pub(super) fn dnf_modify_repo(&self, params: &ModifyRepoParams) -> Result<Option<RepoRecord>> {
        if params.remove {
            return Err(PkgError::Unsupported {
                operation: "removing repositories",
                backend: "dnf",
            });
        }
        let name = params.name.as_str();

        let mut argv = base(&["-y", "repo", "modify"]);
        argv.push(if params.disable { "--disable" } else { "--enable" }.to_string());
        argv.push(name.to_string());
        let modified = self.manager(argv)?;

        if !modified.success() {
            // Not a known repo: add it from the url when we have one
            if params.url.is_empty() {
                return Err(modified.into_failure(self.manager_path()));
            }
            self.manager(vec![
                "-y".to_string(),
                "config-manager".to_string(),
                "--add-repo".to_string(),
                params.url.clone(),
            ])?
            .into_checked(self.manager_path())?;

            let mut setopts = Vec::new();
            if params.disable {
                setopts.push(format!("--setopt={name}.enabled=0"));
            }
            if params.no_gpgcheck {
                setopts.push(format!("--setopt={name}.gpgcheck=0"));
            }
            if !setopts.is_empty() {
                let mut argv = base(&["-y", "config-manager", "--save"]);
                argv.extend(setopts);
                self.manager(argv)?.into_checked(self.manager_path())?;
            }
        } else if params.no_gpgcheck {
            self.manager(vec![
                "-y".to_string(),
                "config-manager".to_string(),
                "--save".to_string(),
                format!("--setopt={name}.gpgcheck=0"),
            ])?
            .into_checked(self.manager_path())?;
        }

        self.dnf_list_repos(name)?
            .into_iter()
            .next()
            .map(Some)
            .ok_or_else(|| PkgError::RepoNotFound(name.to_string()))
    }

    pub(super) fn dnf_refresh_repos(&self, name: &str) -> Result<()> {
        let mut argv = base(&["makecache"]);
        if !name.is_empty() {
            argv.push("--disablerepo=*".to_string());
            argv.push(format!("--enablerepo={name}"));
        }
        self.manager(argv)?.into_checked(self.manager_path())?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SEARCH
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn dnf_search(&self, params: &SearchPackageParams) -> Result<Vec<SearchHit>> {
        let mut argv = base(&["search"]);
        with_repos(&mut argv, &params.repos);
        argv.push(params.name.clone());

        let output = self.manager(argv)?;
        // "No matches found."
        if output.exited_with(1) {
            return Ok(Vec::new());
        }
        let output = output.into_checked(self.manager_path())?;

        let mut hits = Vec::new();
        for block in parse_blocks(&output.stdout, Separator::Rule("=====")) {
            for (package, summary) in block.entries {
                let (name, arch) = package
                    .rsplit_once('.')
                    .map_or((package.as_str(), ""), |(n, a)| (n, a));
                let mut hit = Record::new();
                hit.insert("name".to_string(), name.to_string());
                if !arch.is_empty() {
                    hit.insert("arch".to_string(), arch.to_string());
                }
                hit.insert("summary".to_string(), summary);
                if let Some(header) = &block.header {
                    hit.insert("matched".to_string(), header.clone());
                }
                hits.push(hit);
            }
        }
        Ok(hits)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSACTIONS
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn dnf_install(&self, params: &InstallPackageParams) -> Result<String> {
        let mut argv = base(&["-y", "install"]);
        if params.show_details {
            argv.push(DRY_RUN.to_string());
        }
        if !params.from_repo.is_empty() {
            argv.push(format!("--repo={}", params.from_repo));
        }
        if params.with_recommended {
            argv.push("--setopt=install_weak_deps=True".to_string());
        }
        if params.version.is_empty() {
            argv.push(params.name.clone());
        } else {
            argv.push(format!("{}-{}", params.name, params.version));
        }

        let output = self.manager(argv)?.into_checked(self.manager_path())?;
        Ok(output.combined())
    }

    pub(super) fn dnf_remove(&self, params: &RemovePackageParams) -> Result<String> {
        let mut argv = base(&["-y", "remove"]);
        if params.show_details {
            argv.push(DRY_RUN.to_string());
        }
        if params.remove_deps {
            argv.push("--setopt=clean_requirements_on_remove=True".to_string());
        }
        argv.push(params.name.clone());

        let output = self.manager(argv)?.into_checked(self.manager_path())?;
        Ok(output.combined())
    }

    pub(super) fn dnf_update(&self, params: &UpdatePackageParams) -> Result<String> {
        let command = if params.dist_upgrade { "distro-sync" } else { "upgrade" };
        let mut argv = base(&["-y", command]);
        if params.show_details {
            argv.push(DRY_RUN.to_string());
        }
        with_repos(&mut argv, &params.repos);
        if !params.name.is_empty() {
            argv.push(params.name.clone());
        }

        let output = self.manager(argv)?.into_checked(self.manager_path())?;
        Ok(output.combined())
    }
}
