//! zypper front end for the RPM backend
//!
//! Read operations ask zypper for `--xmlout` and pick records out of the
//! element lists. Transactions return zypper's own transcript.

use super::parse::parse_xml_elements;
use super::rpm::{RpmBackend, filter_repos};
use crate::core::{
    InstallPackageParams, InstallPatchesParams, ListPatchesParams, ModifyRepoParams, PatchRecord,
    PkgError, Record, RemovePackageParams, RepoRecord, Result, SearchHit, SearchPackageParams,
    ToolOutput, UpdatePackageParams,
};

/// `lr` with nothing configured
const ZYPPER_EXIT_NO_REPOS: i32 = 6;

// zypper exit codes that still mean the command did its job
/// Updates or patches are pending (`lp`)
const ZYPPER_EXIT_INF_UPDATE_NEEDED: i32 = 100;
const ZYPPER_EXIT_INF_SEC_UPDATE_NEEDED: i32 = 101;
/// Transaction done, reboot or restart required
const ZYPPER_EXIT_INF_REBOOT_NEEDED: i32 = 102;
const ZYPPER_EXIT_INF_RESTART_NEEDED: i32 = 103;
/// Search or removal found nothing by that name
const ZYPPER_EXIT_INF_CAP_NOT_FOUND: i32 = 104;

fn args(base: &[&str]) -> Vec<String> {
    let mut argv = vec!["--non-interactive".to_string()];
    argv.extend(base.iter().map(ToString::to_string));
    argv
}

fn is_success(output: &ToolOutput, extra: &[i32]) -> bool {
    output.success() || output.code.is_some_and(|code| extra.contains(&code))
}

impl RpmBackend {
    fn zypper_checked(&self, argv: Vec<String>, extra: &[i32]) -> Result<ToolOutput> {
        let output = self.manager(argv)?;
        if is_success(&output, extra) {
            Ok(output)
        } else {
            Err(output.into_failure(self.manager_path()))
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // REPOSITORIES
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn zypper_list_repos(&self, name: &str) -> Result<Vec<RepoRecord>> {
        let output = self.manager(args(&["--xmlout", "lr"]))?;
        if output.exited_with(ZYPPER_EXIT_NO_REPOS) {
            return Ok(Vec::new());
        }
        if !output.success() {
            return Err(output.into_failure(self.manager_path()));
        }
        let repos = parse_xml_elements("zypper", &output.stdout, "repo-list", "repo")?
            .into_iter()
            .map(|element| {
                let mut repo = element.attributes.clone();
                if let Some(url) = element.child_text("url") {
                    repo.insert("url".to_string(), url.to_string());
                }
                repo
            })
            .collect();
        Ok(filter_repos(repos, name))
    }

    pub(super) fn zypper_modify_repo(&self, params: &ModifyRepoParams) -> Result<Option<RepoRecord>> {
        let name = params.name.as_str();

        if params.remove {
            self.zypper_checked(args(&["rr", name]), &[])?;
            return Ok(None);
        }

        // Modify in place when an alias or display name matches
        let existing = self.zypper_list_repos(name)?;
        let target = existing
            .first()
            .and_then(|repo| repo.get("alias"))
            .map_or_else(|| name.to_string(), Clone::clone);

        if existing.is_empty() {
            if params.url.is_empty() {
                return Err(PkgError::MalformedInput(format!(
                    "repository {name} does not exist and no url was given to create it"
                )));
            }
            let mut argv = args(&["ar", "-f"]);
            if params.disable {
                argv.push("-d".to_string());
            }
            if params.no_gpgcheck {
                argv.push("--no-gpgcheck".to_string());
            }
            argv.push(params.url.clone());
            argv.push(name.to_string());
            self.zypper_checked(argv, &[])?;
        } else {
            let mut argv = args(&["mr"]);
            argv.push(if params.disable { "-d" } else { "-e" }.to_string());
            if params.no_gpgcheck {
                argv.push("--no-gpgcheck".to_string());
            }
            argv.push(target.clone());
            self.zypper_checked(argv, &[])?;
        }

        self.zypper_list_repos(&target)?
            .into_iter()
            .next()
            .map(Some)
            .ok_or_else(|| PkgError::RepoNotFound(name.to_string()))
    }

    pub(super) fn zypper_refresh_repos(&self, name: &str) -> Result<()> {
        let mut argv = args(&["refresh"]);
        if !name.is_empty() {
            argv.push(name.to_string());
        }
        self.zypper_checked(argv, &[])?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PATCHES
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn zypper_list_patches(&self, params: &ListPatchesParams) -> Result<Vec<PatchRecord>> {
        let mut argv = args(&["--xmlout", "lp"]);
        push_patch_filters(&mut argv, &params.category, &params.severity);
        let output = self.zypper_checked(
            argv,
            &[ZYPPER_EXIT_INF_UPDATE_NEEDED, ZYPPER_EXIT_INF_SEC_UPDATE_NEEDED],
        )?;
        parse_patches(&output.stdout)
    }

    pub(super) fn zypper_install_patches(
        &self,
        params: &InstallPatchesParams,
    ) -> Result<Vec<PatchRecord>> {
        let mut argv = args(&["--xmlout", "patch"]);
        push_patch_filters(&mut argv, &params.category, &params.severity);
        if params.show_details {
            argv.push("--dry-run".to_string());
        }
        let output = self.zypper_checked(
            argv,
            &[ZYPPER_EXIT_INF_REBOOT_NEEDED, ZYPPER_EXIT_INF_RESTART_NEEDED],
        )?;
        parse_patches(&output.stdout)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SEARCH
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn zypper_search(&self, params: &SearchPackageParams) -> Result<Vec<SearchHit>> {
        let mut argv = args(&["--xmlout", "se", "-s"]);
        for repo in &params.repos {
            argv.push("--repo".to_string());
            argv.push(repo.clone());
        }
        argv.push(params.name.clone());

        let output = self.manager(argv)?;
        if output.exited_with(ZYPPER_EXIT_INF_CAP_NOT_FOUND) {
            return Ok(Vec::new());
        }
        let output = output.into_checked(self.manager_path())?;

        let hits = parse_xml_elements("zypper", &output.stdout, "solvable-list", "solvable")?
            .into_iter()
            .map(|element| {
                let mut hit = element.attributes;
                if let Some(edition) = hit.remove("edition") {
                    hit.insert("version".to_string(), edition);
                }
                hit
            })
            .collect();
        Ok(hits)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSACTIONS
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn zypper_install(&self, params: &InstallPackageParams) -> Result<String> {
        let mut argv = args(&["install"]);
        if params.show_details {
            argv.push("--dry-run".to_string());
        }
        if !params.from_repo.is_empty() {
            argv.push("--from".to_string());
            argv.push(params.from_repo.clone());
        }
        if params.with_recommended {
            argv.push("--recommends".to_string());
        }
        if params.version.is_empty() {
            argv.push(params.name.clone());
        } else {
            argv.push(format!("{}={}", params.name, params.version));
        }

        let output = self.zypper_checked(
            argv,
            &[ZYPPER_EXIT_INF_REBOOT_NEEDED, ZYPPER_EXIT_INF_RESTART_NEEDED],
        )?;
        Ok(output.combined())
    }

    pub(super) fn zypper_remove(&self, params: &RemovePackageParams) -> Result<String> {
        let mut argv = args(&["remove"]);
        if params.show_details {
            argv.push("--dry-run".to_string());
        }
        if params.remove_deps {
            argv.push("--clean-deps".to_string());
        }
        argv.push(params.name.clone());

        let output = self.manager(argv)?;
        if output.exited_with(ZYPPER_EXIT_INF_CAP_NOT_FOUND) {
            return Err(PkgError::PackageNotFound(params.name.clone()));
        }
        if !is_success(
            &output,
            &[ZYPPER_EXIT_INF_REBOOT_NEEDED, ZYPPER_EXIT_INF_RESTART_NEEDED],
        ) {
            return Err(output.into_failure(self.manager_path()));
        }
        Ok(output.combined())
    }

    pub(super) fn zypper_update(&self, params: &UpdatePackageParams) -> Result<String> {
        let mut argv = if params.dist_upgrade {
            if !params.name.is_empty() {
                return Err(PkgError::MalformedInput(
                    "a distribution upgrade cannot be limited to one package".to_string(),
                ));
            }
            args(&["dup"])
        } else {
            args(&["update"])
        };
        if params.show_details {
            argv.push("--dry-run".to_string());
        }
        let repo_flag = if params.dist_upgrade { "--from" } else { "--repo" };
        for repo in &params.repos {
            argv.push(repo_flag.to_string());
            argv.push(repo.clone());
        }
        if !params.name.is_empty() {
            argv.push(params.name.clone());
        }

        let output = self.zypper_checked(
            argv,
            &[ZYPPER_EXIT_INF_REBOOT_NEEDED, ZYPPER_EXIT_INF_RESTART_NEEDED],
        )?;
        Ok(output.combined())
    }
}

fn push_patch_filters(argv: &mut Vec<String>, category: &str, severity: &str) {
    if !category.is_empty() {
        argv.push("--category".to_string());
        argv.push(category.to_string());
    }
    if !severity.is_empty() {
        argv.push("--severity".to_string());
        argv.push(severity.to_string());
    }
}

/// Collect patches from every shape zypper emits them in: `lp` lists them in
/// `<update-list>` (kind `patch`) or `<patch-list>`, while `patch` reports the
/// solvables it will install under `<to-install>`.
fn parse_patches(xml: &str) -> Result<Vec<PatchRecord>> {
    let is_patch = |record: &Record| {
        record.get("kind").or_else(|| record.get("type")).is_none_or(|k| k == "patch")
    };

    let mut patches = Vec::new();
    for (parent, child) in [
        ("update-list", "update"),
        ("patch-list", "patch"),
        ("to-install", "solvable"),
    ] {
        for element in parse_xml_elements("zypper", xml, parent, child)? {
            let mut record = element.attributes.clone();
            if let Some(summary) = element.child_text("summary") {
                record.insert("summary".to_string(), summary.to_string());
            }
            if is_patch(&record) {
                patches.push(record);
            }
        }
    }
    Ok(patches)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::core::testing::{ScriptedRunner, exit, fixtures, ok};
    use crate::package_managers::{PackageBackend, RpmFlavor};

    fn zypper(runner: &Arc<ScriptedRunner>) -> RpmBackend {
        RpmBackend::new(
            runner.clone(),
            PathBuf::from("/usr/bin/rpm"),
            RpmFlavor::Zypper,
            PathBuf::from("/usr/bin/zypper"),
            None,
        )
    }

    #[test]
    fn test_list_repos() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lr"], ok(fixtures::ZYPPER_LR)));
        let backend = zypper(&runner);

        let repos = backend.list_repos("").unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0]["alias"], "my-local-repo");
        assert_eq!(repos[0]["url"], "dir:///tmp/my-local-repo");
        assert_eq!(repos[1]["enabled"], "0");

        let only = backend.list_repos("Main Repository").unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0]["alias"], "oss");
    }

    fn no_repos() -> ToolOutput {
        let output = fixtures::zypper_lr_no_repos();
        assert!(output.exited_with(ZYPPER_EXIT_NO_REPOS));
        output
    }

    #[test]
    fn test_list_repos_empty() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lr"], no_repos()));
        assert!(zypper(&runner).list_repos("").unwrap().is_empty());
        assert!(zypper(&runner).list_repos("oss").unwrap().is_empty());
    }

    #[test]
    fn test_list_repos_empty_stream() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lr"], ok(fixtures::ZYPPER_LR_EMPTY)));
        assert!(zypper(&runner).list_repos("").unwrap().is_empty());
    }

    #[test]
    fn test_list_repos_other_failure() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lr"], exit(7, "", "System management is locked")));
        let err = zypper(&runner).list_repos("").unwrap_err();
        assert!(matches!(err, PkgError::ToolFailed { code: Some(7), .. }));
    }

    #[test]
    fn test_modify_repo_creates_when_missing() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond_once("zypper", &["lr"], no_repos())
                .respond("zypper", &["lr"], ok(fixtures::ZYPPER_LR)),
        );
        let backend = zypper(&runner);

        let repo = backend
            .modify_repo(&ModifyRepoParams {
                name: "my-local-repo".into(),
                url: "dir:///tmp/my-local-repo".into(),
                ..Default::default()
            })
            .unwrap()
            .unwrap();
        assert_eq!(repo["alias"], "my-local-repo");

        let add = runner
            .calls_to("zypper")
            .into_iter()
            .find(|c| c.matches(&["ar"]))
            .unwrap();
        assert!(add.matches(&["--non-interactive", "ar", "-f", "dir:///tmp/my-local-repo", "my-local-repo"]));
    }

    #[test]
    fn test_modify_repo_updates_existing_by_alias() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lr"], ok(fixtures::ZYPPER_LR)));
        let backend = zypper(&runner);

        backend
            .modify_repo(&ModifyRepoParams {
                name: "oss".into(),
                disable: true,
                no_gpgcheck: true,
                ..Default::default()
            })
            .unwrap();

        let calls = runner.calls_to("zypper");
        assert!(calls.iter().any(|c| c.matches(&["mr", "-d", "--no-gpgcheck", "oss"])));
        assert!(!calls.iter().any(|c| c.matches(&["ar"])));
    }

    #[test]
    fn test_modify_repo_missing_without_url() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lr"], no_repos()));
        let err = zypper(&runner)
            .modify_repo(&ModifyRepoParams {
                name: "nowhere".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, PkgError::MalformedInput(_)));
    }

    #[test]
    fn test_modify_repo_not_listed_afterwards() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lr"], no_repos()));
        let err = zypper(&runner)
            .modify_repo(&ModifyRepoParams {
                name: "ghost".into(),
                url: "https://example.com/repo".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "couldn't get repo ghost");
    }

    #[test]
    fn test_remove_repo() {
        let runner = Arc::new(ScriptedRunner::new());
        let removed = zypper(&runner)
            .modify_repo(&ModifyRepoParams {
                name: "oss".into(),
                remove: true,
                ..Default::default()
            })
            .unwrap();
        assert!(removed.is_none());
        assert!(runner.last_call().unwrap().matches(&["rr", "oss"]));
    }

    #[test]
    fn test_list_patches_accepts_pending_exit_codes() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lp"], exit(100, fixtures::ZYPPER_LP, "")));
        let backend = zypper(&runner);
        let patches = backend
            .list_patches(&ListPatchesParams {
                category: "security".into(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0]["name"], "openSUSE-SLE-15.6-2025-1234");
        assert_eq!(patches[0]["summary"], "Security update for curl");
        assert_eq!(patches[1]["name"], "openSUSE-2025-77");
        assert!(runner.last_call().unwrap().matches(&["lp", "--category", "security"]));
    }

    #[test]
    fn test_install_patches_dry_run() {
        let xml = r#"<?xml version='1.0'?>
<stream>
<install-summary download-size="1024" space-usage-diff="0" packages-to-change="1">
<to-install>
<solvable type="patch" name="openSUSE-2025-77" edition="1" arch="noarch" repository="oss"/>
<solvable type="package" name="curl" edition="8.0-1" arch="x86_64" repository="oss"/>
</to-install>
</install-summary>
</stream>
"#;
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["patch"], exit(102, xml, "")));
        let patches = zypper(&runner)
            .install_patches(&InstallPatchesParams {
                show_details: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0]["name"], "openSUSE-2025-77");
        assert!(runner.last_call().unwrap().matches(&["patch", "--dry-run"]));
    }

    #[test]
    fn test_search_renames_edition() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["se"], ok(fixtures::ZYPPER_SE)));
        let hits = zypper(&runner)
            .search_packages(&SearchPackageParams {
                name: "base".into(),
                repos: vec!["my-local-repo".into()],
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["version"], "1.0-1");
        assert!(!hits[0].contains_key("edition"));
        assert!(runner.last_call().unwrap().matches(&["se", "-s", "--repo", "my-local-repo", "base"]));
    }

    #[test]
    fn test_search_nothing_found() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["se"], exit(104, "", "No matching items found.")));
        let hits = zypper(&runner)
            .search_packages(&SearchPackageParams {
                name: "ghost".into(),
                ..Default::default()
            })
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_install_with_version_and_repo() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["install"], ok("1 new package to install.\n")));
        let transcript = zypper(&runner)
            .install_package(&InstallPackageParams {
                name: "base".into(),
                version: "1.0".into(),
                from_repo: "my-local-repo".into(),
                with_recommended: true,
                show_details: true,
            })
            .unwrap();
        assert_eq!(transcript, "1 new package to install.\n");
        assert!(runner.last_call().unwrap().matches(&[
            "install",
            "--dry-run",
            "--from",
            "my-local-repo",
            "--recommends",
            "base=1.0"
        ]));
    }

    #[test]
    fn test_install_failure_carries_transcript() {
        let runner = Arc::new(ScriptedRunner::new().respond(
            "zypper",
            &["install"],
            exit(104, "", "No provider of 'ghost' found."),
        ));
        let err = zypper(&runner)
            .install_package(&InstallPackageParams {
                name: "ghost".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("No provider of 'ghost' found."));
    }

    #[test]
    fn test_remove_missing_package() {
        let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["remove"], exit(104, "", "")));
        let err = zypper(&runner)
            .remove_package(&RemovePackageParams {
                name: "ghost".into(),
                remove_deps: true,
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(runner.last_call().unwrap().matches(&["remove", "--clean-deps", "ghost"]));
    }

    #[test]
    fn test_dist_upgrade_rejects_package_name() {
        let runner = Arc::new(ScriptedRunner::new());
        let err = zypper(&runner)
            .update_package(&UpdatePackageParams {
                name: "base".into(),
                dist_upgrade: true,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, PkgError::MalformedInput(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_update_restricted_to_repos() {
        let runner = Arc::new(ScriptedRunner::new());
        zypper(&runner)
            .update_package(&UpdatePackageParams {
                repos: vec!["oss".into()],
                ..Default::default()
            })
            .unwrap();
        let call = runner.last_call().unwrap();
        assert_eq!(call.args, vec!["--non-interactive", "update", "--repo", "oss"]);
    }
}
