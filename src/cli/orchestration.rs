//! Release workflow orchestration
//!
//! This is the only place that decides the order of operations. Every
//! mutating action follows the same linear path:
//!
//! 1. Read the current version (increments only)
//! 2. Compute the target version
//! 3. Normalize and validate it
//! 4. Refuse to continue if the working tree has pending changes
//! 5. Write the version file
//! 6. Stage, commit and tag it
//!
//! Nothing here recovers from errors; they propagate to the boundary in `main`.

use semver::Version;
use std::fmt;
use std::str::FromStr;

use crate::config::TagConfig;
use crate::domain::{self, VersionBump};
use crate::error::{Result, VersionError};
use crate::git::{self, CommandRunner};
use crate::store::VersionStore;

/// Version written by `init` when no argument is given
pub const DEFAULT_INITIAL_VERSION: &str = "1.0.0";

/// Actions accepted as the first positional argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Major,
    Minor,
    Patch,
    Init,
    Set,
    Get,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Major,
        Action::Minor,
        Action::Patch,
        Action::Init,
        Action::Set,
        Action::Get,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Major => "major",
            Action::Minor => "minor",
            Action::Patch => "patch",
            Action::Init => "init",
            Action::Set => "set",
            Action::Get => "get",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| VersionError::usage(usage()))
    }
}

/// Top-level usage line listing every action
pub fn usage() -> String {
    let names: Vec<&str> = Action::ALL.iter().map(|a| a.name()).collect();
    format!("Usage: version <{}>", names.join("|"))
}

/// Arguments for the release workflow, decoupled from clap
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReleaseWorkflowArgs {
    /// Raw action name; `None` when no positional argument was given
    pub action: Option<String>,

    /// Remaining positional arguments
    pub params: Vec<String>,
}

/// Collaborators for one run, resolved once at startup
pub struct ReleaseContext<'a> {
    pub store: &'a VersionStore,
    pub runner: &'a dyn CommandRunner,
    pub tag: &'a TagConfig,
}

/// Runs one action and returns the version to print.
pub fn run_release_workflow(args: &ReleaseWorkflowArgs, ctx: &ReleaseContext<'_>) -> Result<Version> {
    let action: Action = args
        .action
        .as_deref()
        .ok_or_else(|| VersionError::usage(usage()))?
        .parse()?;
    log::debug!("action {} with params {:?}", action, args.params);

    match action {
        Action::Get => ctx.store.read_version(),
        Action::Init => {
            let input = args
                .params
                .first()
                .map(String::as_str)
                .unwrap_or(DEFAULT_INITIAL_VERSION);
            release(input, ctx)
        }
        Action::Set => {
            let input = args
                .params
                .first()
                .ok_or_else(|| VersionError::usage("Usage: version set <version>"))?;
            release(input, ctx)
        }
        Action::Major => bump_release(VersionBump::Major, ctx),
        Action::Minor => bump_release(VersionBump::Minor, ctx),
        Action::Patch => bump_release(VersionBump::Patch, ctx),
    }
}

fn bump_release(bump: VersionBump, ctx: &ReleaseContext<'_>) -> Result<Version> {
    let current = ctx.store.read_version()?;
    let next = domain::increment(&current, bump)
        .ok_or_else(|| VersionError::internal(format!("Could not increment version {}", current)))?;
    log::debug!("{} bump: {} -> {}", bump, current, next);

    release(&next.to_string(), ctx)
}

/// Normalizes, checks the tree, writes and commits a target version.
fn release(input: &str, ctx: &ReleaseContext<'_>) -> Result<Version> {
    let target = domain::clean(input).ok_or_else(|| VersionError::InvalidInput {
        input: input.to_string(),
    })?;
    if target.to_string() != input {
        log::warn!("normalized {:?} to {}", input, target);
    }

    git::check_clean(ctx.runner)?;

    let written = ctx.store.write_version(&target.to_string())?;
    git::commit_and_tag(ctx.runner, &written, ctx.store.file_name(), ctx.tag)?;

    Ok(written)
}
