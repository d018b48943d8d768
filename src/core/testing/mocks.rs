//! Scripted command runner for exercising adapters without native tools

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::process::{CommandRunner, ToolOutput, tool_name};

/// One recorded tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// True when every needle appears in `args`, in order
    #[must_use]
    pub fn matches(&self, needles: &[&str]) -> bool {
        let mut rest = self.args.iter();
        needles
            .iter()
            .all(|needle| rest.by_ref().any(|arg| arg == *needle))
    }
}

#[derive(Debug)]
struct Rule {
    tool: String,
    needles: Vec<String>,
    output: ToolOutput,
    once: bool,
}

/// A [`CommandRunner`] that replays canned outputs and records every call.
///
/// Rules are matched in insertion order on the tool name plus an ordered
/// subsequence of arguments. Unmatched calls succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    tools: Mutex<BTreeSet<String>>,
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `tool` discoverable on the fake search path
    #[must_use]
    pub fn with_tool(self, tool: &str) -> Self {
        self.tools.lock().unwrap().insert(tool.to_string());
        self
    }

    #[must_use]
    pub fn with_tools(self, tools: &[&str]) -> Self {
        tools.iter().fold(self, |runner, tool| runner.with_tool(tool))
    }

    /// Answer every matching call with `output`
    #[must_use]
    pub fn respond(self, tool: &str, needles: &[&str], output: ToolOutput) -> Self {
        self.push_rule(tool, needles, output, false);
        self
    }

    /// Answer only the next matching call with `output`
    #[must_use]
    pub fn respond_once(self, tool: &str, needles: &[&str], output: ToolOutput) -> Self {
        self.push_rule(tool, needles, output, true);
        self
    }

    fn push_rule(&self, tool: &str, needles: &[&str], output: ToolOutput, once: bool) {
        self.rules.lock().unwrap().push(Rule {
            tool: tool.to_string(),
            needles: needles.iter().map(ToString::to_string).collect(),
            output,
            once,
        });
    }

    /// All invocations so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn last_call(&self) -> Option<Invocation> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Invocations of one tool
    #[must_use]
    pub fn calls_to(&self, tool: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|call| call.tool == tool)
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.tools
            .lock()
            .unwrap()
            .contains(program)
            .then(|| PathBuf::from(format!("/usr/bin/{program}")))
    }

    fn run(&self, program: &Path, args: &[String]) -> io::Result<ToolOutput> {
        let invocation = Invocation {
            tool: tool_name(program),
            args: args.to_vec(),
        };
        self.calls.lock().unwrap().push(invocation.clone());

        let mut rules = self.rules.lock().unwrap();
        let position = rules.iter().position(|rule| {
            rule.tool == invocation.tool
                && invocation.matches(&rule.needles.iter().map(String::as_str).collect::<Vec<_>>())
        });
        match position {
            Some(idx) if rules[idx].once => Ok(rules.remove(idx).output),
            Some(idx) => Ok(rules[idx].output.clone()),
            None => Ok(ToolOutput {
                code: Some(0),
                ..ToolOutput::default()
            }),
        }
    }
}

/// Successful output with the given stdout
#[must_use]
pub fn ok(stdout: &str) -> ToolOutput {
    ToolOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Output with an explicit exit code
#[must_use]
pub fn exit(code: i32, stdout: &str, stderr: &str) -> ToolOutput {
    ToolOutput {
        code: Some(code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_match_in_order() {
        let runner = ScriptedRunner::new()
            .with_tool("rpm")
            .respond_once("rpm", &["-q", "rpm"], exit(1, "", "not installed"))
            .respond("rpm", &["-q"], ok("rpm-4.18"));

        let rpm = runner.locate("rpm").unwrap();
        let first = runner.run(&rpm, &["-q".into(), "rpm".into()]).unwrap();
        assert_eq!(first.code, Some(1));
        let second = runner.run(&rpm, &["-q".into(), "rpm".into()]).unwrap();
        assert_eq!(second.stdout, "rpm-4.18");
        assert_eq!(runner.calls_to("rpm").len(), 2);
        assert!(runner.locate("dnf").is_none());
    }

    #[test]
    fn test_invocation_matches_subsequence() {
        let call = Invocation {
            tool: "zypper".into(),
            args: vec!["--root".into(), "/r".into(), "--xmlout".into(), "lr".into()],
        };
        assert!(call.matches(&["--xmlout", "lr"]));
        assert!(!call.matches(&["lr", "--xmlout"]));
    }
}
