//! Behavior every backend must share, checked against scripted tool output
//!
//! Run: cargo test --test backend_properties

mod common;

use std::sync::Arc;

use common::{Kind, backend, rpm_backend};
use managesw_lib::core::testing::{ScriptedRunner, exit, fixtures, ok};
use managesw_lib::core::{
    ErrorKind, ListPatchesParams, ModifyRepoParams, PackageRecord, PackageService,
    QueryMode, QueryPackageParams, QueryValue,
};
use managesw_lib::package_managers::{PackageBackend, RpmFlavor};

// ═══════════════════════════════════════════════════════════════════════════════
// LISTING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_empty_system_lists_nothing() {
    for kind in Kind::ALL {
        let runner = Arc::new(ScriptedRunner::new().respond(kind.list_tool(), &[], ok("")));
        let pkgs = backend(kind, &runner).list_packages("").unwrap();
        assert!(pkgs.is_empty(), "{kind:?} listed {pkgs:?}");
    }
}

#[test]
fn test_no_match_is_empty_not_error() {
    for kind in Kind::ALL {
        let runner = Arc::new(ScriptedRunner::new().respond(
            kind.list_tool(),
            &[],
            exit(1, "", "no packages found matching ghost"),
        ));
        let pkgs = backend(kind, &runner).list_packages("ghost").unwrap();
        assert!(pkgs.is_empty(), "{kind:?} listed {pkgs:?}");
    }
}

#[test]
fn test_hard_list_failure_is_tool_error() {
    for kind in Kind::ALL {
        let runner = Arc::new(ScriptedRunner::new().respond(
            kind.list_tool(),
            &[],
            exit(2, "", "database is locked"),
        ));
        let err = backend(kind, &runner).list_packages("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolExecution, "{kind:?}");
        assert!(err.to_string().contains("database is locked"));
    }
}

#[test]
fn test_synthetic_base_package() {
    let runner = Arc::new(ScriptedRunner::new().respond("rpm", &["-qa", "--qf"], ok("base,1.0,12345\n")));
    let pkgs = rpm_backend(RpmFlavor::Zypper, &runner)
        .list_packages("base")
        .unwrap();
    assert_eq!(
        pkgs,
        vec![PackageRecord {
            name: "base".into(),
            version: "1.0".into(),
            installed_size_bytes: 12345,
        }]
    );

    let json = serde_json::to_value(&pkgs).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{"name": "base", "version": "1.0", "installedSizeBytes": 12345}])
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPOSITORIES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_list_repos_is_idempotent() {
    let runner = Arc::new(ScriptedRunner::new().respond("zypper", &["lr"], ok(fixtures::ZYPPER_LR)));
    let zypper = rpm_backend(RpmFlavor::Zypper, &runner);
    assert_eq!(zypper.list_repos("").unwrap(), zypper.list_repos("").unwrap());

    let runner = Arc::new(ScriptedRunner::new().respond("dnf", &["repo"], ok(fixtures::DNF_REPO_INFO)));
    let dnf = rpm_backend(RpmFlavor::Dnf, &runner);
    assert_eq!(dnf.list_repos("").unwrap(), dnf.list_repos("").unwrap());
}

#[test]
fn test_modify_repo_creates_then_updates_in_place() {
    // The second listing and everything after it sees the new repository
    let runner = Arc::new(
        ScriptedRunner::new()
            .respond_once("zypper", &["lr"], fixtures::zypper_lr_no_repos())
            .respond("zypper", &["lr"], ok(fixtures::ZYPPER_LR)),
    );
    let zypper = rpm_backend(RpmFlavor::Zypper, &runner);
    let params = ModifyRepoParams {
        name: "my-local-repo".into(),
        url: "dir:///tmp/my-local-repo".into(),
        ..Default::default()
    };

    let created = zypper.modify_repo(&params).unwrap().unwrap();
    assert_eq!(created["alias"], "my-local-repo");

    let updated = zypper.modify_repo(&params).unwrap().unwrap();
    assert_eq!(updated["alias"], "my-local-repo");

    let calls = runner.calls_to("zypper");
    assert_eq!(calls.iter().filter(|c| c.matches(&["ar"])).count(), 1);
    assert_eq!(calls.iter().filter(|c| c.matches(&["mr"])).count(), 1);

    let listed = zypper.list_repos("my-local-repo").unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn test_fresh_root_has_no_repos_until_one_is_added() {
    let runner = Arc::new(
        ScriptedRunner::new()
            .respond_once("zypper", &["lr"], fixtures::zypper_lr_no_repos())
            .respond_once("zypper", &["lr"], fixtures::zypper_lr_no_repos())
            .respond("zypper", &["lr"], ok(fixtures::ZYPPER_LR)),
    );
    let zypper = rpm_backend(RpmFlavor::Zypper, &runner);
    assert!(zypper.list_repos("").unwrap().is_empty());

    let created = zypper
        .modify_repo(&ModifyRepoParams {
            name: "my-local-repo".into(),
            url: "dir:///tmp/my-local-repo".into(),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
    assert_eq!(created["url"], "dir:///tmp/my-local-repo");

    let calls = runner.calls_to("zypper");
    assert!(calls.iter().any(|c| c.matches(&["ar", "-f", "dir:///tmp/my-local-repo", "my-local-repo"])));
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITY GAPS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_patches_gap_messages_differ_by_backend() {
    let runner = Arc::new(ScriptedRunner::new());

    let dnf = backend(Kind::Dnf, &runner)
        .list_patches(&ListPatchesParams::default())
        .unwrap_err();
    assert!(dnf.to_string().contains("not supported"));
    assert_eq!(dnf.kind(), ErrorKind::Unsupported);

    let dpkg = backend(Kind::Dpkg, &runner)
        .list_patches(&ListPatchesParams::default())
        .unwrap_err();
    assert!(dpkg.to_string().contains("not implemented"));
    assert_eq!(dpkg.kind(), ErrorKind::Unsupported);

    assert!(runner.calls().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// QUERIES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_query_info_names_the_package() {
    let runner = Arc::new(ScriptedRunner::new().respond("rpm", &["-qi", "base"], ok(fixtures::RPM_QI_BASE)));
    let service = PackageService::new(Arc::new(rpm_backend(RpmFlavor::Dnf, &runner)));
    let info = service
        .query_package(&QueryPackageParams {
            name: "base".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(info["Name"], QueryValue::Text("base".into()));
}

#[test]
fn test_changelog_truncation() {
    let runner = Arc::new(ScriptedRunner::new().respond(
        "rpm",
        &["--changelog"],
        ok(fixtures::RPM_CHANGELOG_BASE),
    ));
    let rpm = rpm_backend(RpmFlavor::Zypper, &runner);

    let one = rpm.query_package("base", QueryMode::Changelog, 1).unwrap();
    assert_eq!(one["changelog"].as_lines().unwrap().len(), 1);

    let all = rpm.query_package("base", QueryMode::Changelog, 0).unwrap();
    assert_eq!(all["changelog"].as_lines().unwrap().len(), 4);

    // A one-entry changelog is returned whole even when one line is asked for
    let runner = Arc::new(ScriptedRunner::new().respond("rpm", &["--changelog"], ok("- only entry\n")));
    let short = rpm_backend(RpmFlavor::Zypper, &runner)
        .query_package("base", QueryMode::Changelog, 1)
        .unwrap();
    assert_eq!(
        short["changelog"].as_lines().unwrap(),
        ["- only entry".to_string()]
    );
}

#[test]
fn test_missing_package_is_not_found_everywhere() {
    for kind in Kind::ALL {
        let runner = Arc::new(ScriptedRunner::new().respond(
            kind.list_tool(),
            &[],
            exit(1, "", "package ghost is not installed"),
        ));
        let err = backend(kind, &runner)
            .query_package("ghost", QueryMode::Info, 0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "{kind:?}");
    }
}
