use std::time::Duration;

use thiserror::Error;

/// Unified error type for version-bump operations
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("{input} is not a valid version string")]
    InvalidInput { input: String },

    #[error("{file} file contained \"{content}\", which is not a valid version string")]
    InvalidVersion { file: String, content: String },

    #[error("Could not read {file} file. Run `version init` to create one")]
    NotFound { file: String },

    #[error("Could not find a single `export const VERSION = \"...\"` declaration in {file} ({matches} found)")]
    ParseFailure { file: String, matches: usize },

    #[error("Cannot release with uncommitted changes")]
    DirtyWorkingTree,

    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git error: `{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Git error: `{command}` did not finish within {}s", .after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("{0}")]
    Permission(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Results in version-bump
pub type Result<T> = std::result::Result<T, VersionError>;

impl From<std::io::Error> for VersionError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            VersionError::Permission(err)
        } else {
            VersionError::Io(err)
        }
    }
}

impl VersionError {
    /// Create a usage error with the given message
    pub fn usage(msg: impl Into<String>) -> Self {
        VersionError::Usage(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VersionError::Config(msg.into())
    }

    /// Create an internal error; these indicate a broken contract, not a user mistake
    pub fn internal(msg: impl Into<String>) -> Self {
        VersionError::Internal(msg.into())
    }

    /// Whether this error came from the external git tool
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            VersionError::Command { .. } | VersionError::Spawn { .. } | VersionError::Timeout { .. }
        )
    }
}
