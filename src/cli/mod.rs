//! Command-line workflow, separated from clap argument parsing

pub mod orchestration;

pub use orchestration::{run_release_workflow, Action, ReleaseContext, ReleaseWorkflowArgs};
