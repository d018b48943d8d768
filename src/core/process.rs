//! Subprocess execution for native package tools
//!
//! Every adapter goes through a [`CommandRunner`] so the whole command
//! construction and output parsing path can be exercised without a real
//! package manager on the test host.

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::error::{PkgError, Result};

/// Captured result of one finished tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    #[must_use]
    pub fn exited_with(&self, code: i32) -> bool {
        self.code == Some(code)
    }

    /// Stdout followed by stderr, the transcript shown to callers
    #[must_use]
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => {
                let mut out = self.stdout.clone();
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&self.stderr);
                out
            }
        }
    }

    /// Turn a non-zero exit into [`PkgError::ToolFailed`]
    pub fn into_checked(self, tool: &Path) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(self.into_failure(tool))
        }
    }

    #[must_use]
    pub fn into_failure(self, tool: &Path) -> PkgError {
        PkgError::ToolFailed {
            tool: tool_name(tool),
            code: self.code,
            output: self.combined(),
        }
    }
}

/// Short display name for a tool path (`/usr/bin/zypper` -> `zypper`)
#[must_use]
pub fn tool_name(tool: &Path) -> String {
    tool.file_name()
        .unwrap_or(tool.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Spawns native tools and locates them on the search path.
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// Find an executable on the search path
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` with a literal argument vector and wait for it to finish
    fn run(&self, program: &Path, args: &[String]) -> io::Result<ToolOutput>;
}

/// Runs commands on the real host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run(&self, program: &Path, args: &[String]) -> io::Result<ToolOutput> {
        tracing::debug!("running {} {}", program.display(), args.join(" "));
        let output = Command::new(program)
            .args(args.iter().map(OsStr::new))
            .stdin(Stdio::null())
            .env("LC_ALL", "C")
            .output()?;
        let out = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!("{} exited with {:?}", program.display(), out.code);
        Ok(out)
    }
}

/// Run a tool, converting a spawn failure into [`PkgError::ToolUnavailable`].
pub fn spawn(runner: &dyn CommandRunner, program: &Path, args: &[String]) -> Result<ToolOutput> {
    runner
        .run(program, args)
        .map_err(|source| PkgError::ToolUnavailable {
            tool: tool_name(program),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_joins_streams() {
        let out = ToolOutput {
            code: Some(0),
            stdout: "one".into(),
            stderr: "two\n".into(),
        };
        assert_eq!(out.combined(), "one\ntwo\n");

        let only_err = ToolOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "boom".into(),
        };
        assert_eq!(only_err.combined(), "boom");
    }

    #[test]
    fn test_into_checked_keeps_output_on_failure() {
        let out = ToolOutput {
            code: Some(2),
            stdout: "partial".into(),
            stderr: "error: db locked".into(),
        };
        let err = out.into_checked(Path::new("/usr/bin/rpm")).unwrap_err();
        match err {
            PkgError::ToolFailed { tool, code, output } => {
                assert_eq!(tool, "rpm");
                assert_eq!(code, Some(2));
                assert!(output.contains("db locked"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_system_runner_reports_missing_binary() {
        let runner = SystemRunner;
        let err = spawn(
            &runner,
            Path::new("/nonexistent/managesw-no-such-tool"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, PkgError::ToolUnavailable { .. }));
    }
}
