//! managesw test infrastructure
//!
//! Backend constructors over the scripted runner, plus helpers for driving
//! the `managesw-mcp` binary.

#![allow(dead_code)] // Test utilities may not all be used in every test file

use std::path::PathBuf;
use std::sync::Arc;

use managesw_lib::core::testing::ScriptedRunner;
use managesw_lib::package_managers::{DpkgBackend, PackageBackend, RpmBackend, RpmFlavor};

// Re-export serial_test for use in test files
#[allow(unused_imports)]
pub use serial_test::serial;

// ═══════════════════════════════════════════════════════════════════════════════
// BACKENDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Which adapter a scenario runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Zypper,
    Dnf,
    Dpkg,
}

impl Kind {
    pub const ALL: [Self; 3] = [Self::Zypper, Self::Dnf, Self::Dpkg];

    /// Tool that lists installed packages for this backend
    pub const fn list_tool(self) -> &'static str {
        match self {
            Self::Zypper | Self::Dnf => "rpm",
            Self::Dpkg => "dpkg-query",
        }
    }
}

pub fn backend(kind: Kind, runner: &Arc<ScriptedRunner>) -> Arc<dyn PackageBackend> {
    match kind {
        Kind::Zypper => Arc::new(rpm_backend(RpmFlavor::Zypper, runner)),
        Kind::Dnf => Arc::new(rpm_backend(RpmFlavor::Dnf, runner)),
        Kind::Dpkg => Arc::new(DpkgBackend::new(
            runner.clone(),
            PathBuf::from("/usr/bin/dpkg"),
            PathBuf::from("/usr/bin/dpkg-query"),
            None,
        )),
    }
}

pub fn rpm_backend(flavor: RpmFlavor, runner: &Arc<ScriptedRunner>) -> RpmBackend {
    RpmBackend::new(
        runner.clone(),
        PathBuf::from("/usr/bin/rpm"),
        flavor,
        PathBuf::from(format!("/usr/bin/{}", flavor.name())),
        None,
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// BINARY
// ═══════════════════════════════════════════════════════════════════════════════

/// `managesw-mcp` isolated from the host config and pointed at an empty root,
/// so detection always ends at the null backend
pub fn mcp_cmd(root: &std::path::Path, config_dir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("managesw-mcp").unwrap();
    cmd.env("MANAGESW_CONFIG_DIR", config_dir)
        .env_remove("MANAGESW_ROOT")
        .env_remove("MANAGESW_SOCKET")
        .env_remove("MANAGESW_HTTP")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(root);
    cmd
}

/// Parse every stdout line as JSON
pub fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Whether host-dependent tests were asked for
pub fn system_tests_enabled() -> bool {
    std::env::var("MANAGESW_RUN_SYSTEM_TESTS").is_ok_and(|v| v == "1")
}
