use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;
use crate::git::{command_line, into_stdout, CommandOutput, CommandRunner};

/// Mock runner for testing without spawning git
///
/// Responses are keyed by git subcommand (the first argument). Subcommands
/// without a canned response succeed with empty stdout. Every call is recorded.
#[derive(Default)]
pub struct MockRunner {
    responses: RefCell<HashMap<String, CommandOutput>>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl MockRunner {
    /// Create a runner where every command succeeds silently
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with `stdout` whenever `subcommand` runs
    pub fn respond(&self, subcommand: impl Into<String>, stdout: impl Into<String>) {
        self.responses.borrow_mut().insert(
            subcommand.into(),
            CommandOutput {
                code: Some(0),
                stdout: stdout.into(),
                stderr: String::new(),
            },
        );
    }

    /// Exit with code 1 and `stderr` whenever `subcommand` runs
    pub fn fail(&self, subcommand: impl Into<String>, stderr: impl Into<String>) {
        self.responses.borrow_mut().insert(
            subcommand.into(),
            CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: stderr.into(),
            },
        );
    }

    /// Arguments of every call so far, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, args: &[&str]) -> Result<String> {
        self.calls
            .borrow_mut()
            .push(args.iter().map(|a| a.to_string()).collect());

        let output = args
            .first()
            .and_then(|sub| self.responses.borrow().get(*sub).cloned())
            .unwrap_or(CommandOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            });

        into_stdout(command_line("git", args), output)
    }
}
