//! Semantic version contract on top of the `semver` crate.
//!
//! The grammar itself is owned by `semver`; this module only adds the
//! loose "clean" transform and the release increment law.

use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Which numeric field a release bumps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        };
        f.write_str(name)
    }
}

/// Parses a strict semantic version string, as stored in a version file.
pub fn parse(input: &str) -> Option<Version> {
    Version::parse(input).ok()
}

/// Normalizes a loosely written version into its canonical form.
///
/// Surrounding whitespace and any leading `v` or `=` characters are dropped
/// before parsing, so `" v1.2.3 "` and `"=1.2.3"` both clean to `1.2.3`.
/// Returns `None` when what remains is not a semantic version.
pub fn clean(input: &str) -> Option<Version> {
    let trimmed = input.trim().trim_start_matches(['=', 'v', 'V']);
    Version::parse(trimmed).ok()
}

/// Applies a release bump.
///
/// Prerelease and build metadata are always dropped and exactly one numeric
/// field moves up, with lower fields reset to zero. Returns `None` only when
/// the bumped field would overflow.
pub fn increment(current: &Version, bump: VersionBump) -> Option<Version> {
    let (major, minor, patch) = match bump {
        VersionBump::Major => (current.major.checked_add(1)?, 0, 0),
        VersionBump::Minor => (current.major, current.minor.checked_add(1)?, 0),
        VersionBump::Patch => (current.major, current.minor, current.patch.checked_add(1)?),
    };

    Some(Version {
        major,
        minor,
        patch,
        pre: Prerelease::EMPTY,
        build: BuildMetadata::EMPTY,
    })
}
