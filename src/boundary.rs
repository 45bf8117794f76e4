use crate::error::VersionError;

/// What the top level does with an error that reached it.
#[derive(Debug)]
pub enum Disposition {
    /// Recoverable: print `message` to stderr and exit with `code`
    Report {
        code: u8,
        message: String,
        prefixed: bool,
    },
    /// Contract violation: let it escape `main` unhandled
    Fatal(VersionError),
}

/// Maps the closed error taxonomy to an exit code and message.
///
/// User and command errors get an `Error:` prefix. Permission failures are
/// shown verbatim. Internal errors and unexpected I/O failures are fatal.
pub fn classify(err: VersionError) -> Disposition {
    match err {
        VersionError::Permission(ref io) => Disposition::Report {
            code: 1,
            message: io.to_string(),
            prefixed: false,
        },
        VersionError::Internal(_) | VersionError::Io(_) => Disposition::Fatal(err),
        VersionError::InvalidInput { .. }
        | VersionError::InvalidVersion { .. }
        | VersionError::NotFound { .. }
        | VersionError::ParseFailure { .. }
        | VersionError::DirtyWorkingTree
        | VersionError::Usage(_)
        | VersionError::Config(_)
        | VersionError::Command { .. }
        | VersionError::Spawn { .. }
        | VersionError::Timeout { .. } => Disposition::Report {
            code: 1,
            message: err.to_string(),
            prefixed: true,
        },
    }
}
