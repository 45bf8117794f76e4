//! Git operations abstraction layer
//!
//! All git access goes through the [CommandRunner] trait, which runs one
//! git command to completion and returns its stdout. The release steps
//! ([check_clean] and [commit_and_tag]) are written against the trait so the
//! coordinator can be exercised without spawning processes.
//!
//! - [SystemGit]: runs the real `git` executable
//! - [MockRunner]: canned responses and a call log for tests

pub mod mock;
pub mod system;

pub use mock::MockRunner;
pub use system::SystemGit;

use semver::Version;

use crate::config::TagConfig;
use crate::error::{Result, VersionError};

/// Outcome of one subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a single git command
///
/// Implementations must not retry; a nonzero exit is reported as
/// [VersionError::Command] carrying the joined command line and stderr.
pub trait CommandRunner {
    /// Run git with `args` and return its decoded stdout
    fn run(&self, args: &[&str]) -> Result<String>;
}

/// Joins a command line for error messages and logs.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns a finished command into its stdout or a [VersionError::Command].
pub fn into_stdout(command: String, output: CommandOutput) -> Result<String> {
    if !output.success() {
        return Err(VersionError::Command {
            command,
            stderr: output.stderr.trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Fails with [VersionError::DirtyWorkingTree] when git reports pending changes.
pub fn check_clean(runner: &dyn CommandRunner) -> Result<()> {
    let status = runner.run(&["status", "--porcelain"])?;

    if !status.trim().is_empty() {
        log::debug!("pending changes:\n{}", status.trim_end());
        return Err(VersionError::DirtyWorkingTree);
    }

    Ok(())
}

/// Stages the version file, commits it and tags the commit.
///
/// The steps run strictly in order and stop at the first failure. A commit
/// that succeeded before a failed tag is left in place.
pub fn commit_and_tag(
    runner: &dyn CommandRunner,
    version: &Version,
    file_name: &str,
    tag: &TagConfig,
) -> Result<String> {
    let message = version.to_string();
    let tag_name = tag.tag_pattern()?.format(version);

    runner.run(&["add", file_name])?;
    runner.run(&["commit", "-m", &message])?;

    if tag.annotate {
        runner.run(&["tag", &tag_name, "-m", &message])?;
    } else {
        runner.run(&["tag", &tag_name])?;
    }
    log::info!("tagged {} as {}", message, tag_name);

    Ok(tag_name)
}
