//! One-time backend selection
//!
//! A binary on the search path is not enough: each candidate must also answer
//! a query about its own database, which fails in minimal containers and
//! half-populated chroots.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{DpkgBackend, NullBackend, PackageBackend, RpmBackend, RpmFlavor};
use crate::core::CommandRunner;

/// Probe the host (or `root`) and pick the first usable backend.
///
/// Order: rpm paired with zypper, rpm paired with dnf, dpkg, then the
/// [`NullBackend`]. Plain rpm without a front end is skipped since it cannot
/// serve repositories, patches or search.
pub fn detect_backend(runner: Arc<dyn CommandRunner>, root: Option<PathBuf>) -> Arc<dyn PackageBackend> {
    if let Some(backend) = detect_rpm(&runner, root.as_deref()) {
        tracing::info!("selected {} backend", backend.name());
        return Arc::new(backend);
    }

    if let Some(backend) = detect_dpkg(&runner, root.as_deref()) {
        tracing::info!("selected dpkg backend");
        return Arc::new(backend);
    }

    tracing::warn!("no usable package manager found, every operation will fail");
    Arc::new(NullBackend)
}

fn detect_rpm(runner: &Arc<dyn CommandRunner>, root: Option<&Path>) -> Option<RpmBackend> {
    let rpm = runner.locate("rpm")?;
    if !probe(runner.as_ref(), &rpm, root, &["-q", "rpm"]) {
        return None;
    }

    let front_end = [RpmFlavor::Zypper, RpmFlavor::Dnf]
        .into_iter()
        .find_map(|flavor| runner.locate(flavor.name()).map(|path| (flavor, path)));
    let Some((flavor, manager)) = front_end else {
        tracing::debug!("rpm found but neither zypper nor dnf, skipping");
        return None;
    };

    Some(RpmBackend::new(
        Arc::clone(runner),
        rpm,
        flavor,
        manager,
        root.map(Path::to_path_buf),
    ))
}

fn detect_dpkg(runner: &Arc<dyn CommandRunner>, root: Option<&Path>) -> Option<DpkgBackend> {
    let dpkg = runner.locate("dpkg")?;
    let dpkg_query = runner.locate("dpkg-query")?;
    if !probe(runner.as_ref(), &dpkg_query, root, &["-s", "dpkg"]) {
        return None;
    }

    Some(DpkgBackend::new(
        Arc::clone(runner),
        dpkg,
        dpkg_query,
        root.map(Path::to_path_buf),
    ))
}

/// Run a self-query; any failure, including a failed spawn, is a miss
fn probe(runner: &dyn CommandRunner, program: &Path, root: Option<&Path>, args: &[&str]) -> bool {
    let mut argv = Vec::new();
    if let Some(root) = root {
        argv.push("--root".to_string());
        argv.push(root.display().to_string());
    }
    argv.extend(args.iter().map(ToString::to_string));

    match runner.run(program, &argv) {
        Ok(output) if output.success() => true,
        Ok(output) => {
            tracing::debug!(
                "probe {} {} failed: {}",
                program.display(),
                argv.join(" "),
                output.combined().trim()
            );
            false
        }
        Err(e) => {
            tracing::debug!("probe {} could not start: {e}", program.display());
            false
        }
    }
}
