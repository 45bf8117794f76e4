//! Persisted version record.
//!
//! Two encodings are supported and exactly one is active for a run:
//! a plain `VERSION` file holding the raw string, or a `version.ts`
//! module holding `export const VERSION = "<value>";`.

use regex::Regex;
use semver::Version;
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::domain;
use crate::error::{Result, VersionError};

pub const PLAIN_FILE_NAME: &str = "VERSION";
pub const EMBEDDED_FILE_NAME: &str = "version.ts";

/// Encoding of the version file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFormat {
    Plain,
    Embedded,
}

impl VersionFormat {
    /// Picks the format for a run.
    ///
    /// An explicit choice wins; otherwise an existing `version.ts` in `root`
    /// selects the embedded format.
    pub fn resolve(root: &Path, explicit: Option<VersionFormat>) -> Self {
        if let Some(format) = explicit {
            return format;
        }

        if root.join(EMBEDDED_FILE_NAME).exists() {
            VersionFormat::Embedded
        } else {
            VersionFormat::Plain
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            VersionFormat::Plain => PLAIN_FILE_NAME,
            VersionFormat::Embedded => EMBEDDED_FILE_NAME,
        }
    }

    /// Pulls the raw version text out of the file contents.
    fn decode(&self, content: &str) -> Result<String> {
        match self {
            VersionFormat::Plain => Ok(content.chars().filter(|c| !c.is_whitespace()).collect()),
            VersionFormat::Embedded => Ok(content[declared_value(content)?].to_string()),
        }
    }

    /// Renders the file contents for `version`.
    ///
    /// An embedded file that already holds exactly one declaration keeps
    /// everything around the quoted value; otherwise a fresh declaration is
    /// written.
    fn encode(&self, version: &Version, existing: Option<&str>) -> String {
        match self {
            VersionFormat::Plain => version.to_string(),
            VersionFormat::Embedded => {
                let located = existing
                    .and_then(|content| declared_value(content).ok().map(|span| (content, span)));

                match located {
                    Some((content, span)) => format!(
                        "{}{}{}",
                        &content[..span.start],
                        version,
                        &content[span.end..]
                    ),
                    None => format!("export const VERSION = \"{}\";\n", version),
                }
            }
        }
    }
}

/// Locates the quoted value of the single `VERSION` declaration.
fn declared_value(content: &str) -> Result<Range<usize>> {
    let mut matches = declaration_regex().captures_iter(content);
    let first = matches.next();
    let extra = matches.count();

    match first {
        Some(caps) if extra == 0 => caps
            .name("double")
            .or_else(|| caps.name("single"))
            .map(|m| m.range())
            .ok_or_else(|| VersionError::ParseFailure {
                file: EMBEDDED_FILE_NAME.to_string(),
                matches: 0,
            }),
        Some(_) => Err(VersionError::ParseFailure {
            file: EMBEDDED_FILE_NAME.to_string(),
            matches: extra + 1,
        }),
        None => Err(VersionError::ParseFailure {
            file: EMBEDDED_FILE_NAME.to_string(),
            matches: 0,
        }),
    }
}

fn declaration_regex() -> &'static Regex {
    static DECLARATION: OnceLock<Regex> = OnceLock::new();
    DECLARATION.get_or_init(|| {
        Regex::new(
            r#"export\s+const\s+VERSION\s*=\s*(?:"(?P<double>[^"\n]*)"|'(?P<single>[^'\n]*)')[ \t]*;?"#,
        )
        .expect("declaration pattern is valid")
    })
}

/// Reads and writes the version file in a project directory
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
    format: VersionFormat,
}

impl VersionStore {
    pub fn new(root: impl Into<PathBuf>, format: VersionFormat) -> Self {
        VersionStore {
            root: root.into(),
            format,
        }
    }

    /// File name relative to the project root, as passed to `git add`
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(self.file_name())
    }

    /// Reads and validates the current version.
    pub fn read_version(&self) -> Result<Version> {
        let path = self.path();
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => VersionError::Permission(e),
            _ => {
                log::debug!("cannot read {}: {}", path.display(), e);
                VersionError::NotFound {
                    file: self.file_name().to_string(),
                }
            }
        })?;

        let raw = self.format.decode(&content)?;

        domain::parse(&raw).ok_or_else(|| VersionError::InvalidVersion {
            file: self.file_name().to_string(),
            content: raw,
        })
    }

    /// Normalizes `input` and overwrites the version file with it.
    ///
    /// The write is a plain overwrite, not a rename; an interrupted write can
    /// leave a truncated file. Text around an existing embedded declaration
    /// is preserved.
    pub fn write_version(&self, input: &str) -> Result<Version> {
        let version = domain::clean(input).ok_or_else(|| VersionError::InvalidInput {
            input: input.to_string(),
        })?;

        let path = self.path();
        let existing = fs::read_to_string(&path).ok();
        fs::write(&path, self.format.encode(&version, existing.as_deref()))?;
        log::info!("wrote {} to {}", version, path.display());

        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir, format: VersionFormat) -> VersionStore {
        VersionStore::new(dir.path(), format)
    }

    #[test]
    fn test_resolve_prefers_explicit_choice() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(EMBEDDED_FILE_NAME), "").unwrap();

        assert_eq!(
            VersionFormat::resolve(dir.path(), Some(VersionFormat::Plain)),
            VersionFormat::Plain
        );
        assert_eq!(
            VersionFormat::resolve(dir.path(), None),
            VersionFormat::Embedded
        );
    }

    #[test]
    fn test_resolve_defaults_to_plain() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PLAIN_FILE_NAME), "1.0.0").unwrap();
        assert_eq!(VersionFormat::resolve(dir.path(), None), VersionFormat::Plain);
    }

    #[test]
    fn test_read_plain_strips_whitespace() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PLAIN_FILE_NAME), " 1.2.3\r\n\t").unwrap();

        let version = store(&dir, VersionFormat::Plain).read_version().unwrap();
        assert_eq!(version, Version::new(1, 2, 3));
    }

    #[test]
    fn test_read_missing_file_suggests_init() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir, VersionFormat::Plain).read_version().unwrap_err();

        assert!(matches!(err, VersionError::NotFound { .. }));
        assert!(err.to_string().contains("version init"));
    }

    #[test]
    fn test_read_invalid_plain_content() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PLAIN_FILE_NAME), "one point oh").unwrap();

        let err = store(&dir, VersionFormat::Plain).read_version().unwrap_err();
        match err {
            VersionError::InvalidVersion { file, content } => {
                assert_eq!(file, "VERSION");
                assert_eq!(content, "onepointoh");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_embedded_declaration() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(EMBEDDED_FILE_NAME),
            "// generated\nexport const VERSION = \"2.0.0-rc.1\";\n",
        )
        .unwrap();

        let version = store(&dir, VersionFormat::Embedded).read_version().unwrap();
        assert_eq!(version, Version::parse("2.0.0-rc.1").unwrap());
    }

    #[test]
    fn test_read_embedded_single_quotes() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(EMBEDDED_FILE_NAME),
            "export const VERSION = '0.4.1';",
        )
        .unwrap();

        let version = store(&dir, VersionFormat::Embedded).read_version().unwrap();
        assert_eq!(version, Version::new(0, 4, 1));
    }

    #[test]
    fn test_read_embedded_without_declaration() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(EMBEDDED_FILE_NAME), "export const NAME = \"x\";").unwrap();

        let err = store(&dir, VersionFormat::Embedded).read_version().unwrap_err();
        assert!(matches!(err, VersionError::ParseFailure { matches: 0, .. }));
    }

    #[test]
    fn test_read_embedded_with_duplicate_declarations() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(EMBEDDED_FILE_NAME),
            "export const VERSION = \"1.0.0\";\nexport const VERSION = \"2.0.0\";\n",
        )
        .unwrap();

        let err = store(&dir, VersionFormat::Embedded).read_version().unwrap_err();
        assert!(matches!(err, VersionError::ParseFailure { matches: 2, .. }));
    }

    #[test]
    fn test_read_embedded_non_string_value() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(EMBEDDED_FILE_NAME), "export const VERSION = 3;").unwrap();

        let err = store(&dir, VersionFormat::Embedded).read_version().unwrap_err();
        assert!(matches!(err, VersionError::ParseFailure { .. }));
    }

    #[test]
    fn test_write_plain_is_raw_string() {
        let dir = TempDir::new().unwrap();
        let version = store(&dir, VersionFormat::Plain)
            .write_version(" v1.4.0 ")
            .unwrap();

        assert_eq!(version, Version::new(1, 4, 0));
        assert_eq!(
            fs::read_to_string(dir.path().join(PLAIN_FILE_NAME)).unwrap(),
            "1.4.0"
        );
    }

    #[test]
    fn test_write_embedded_is_full_declaration() {
        let dir = TempDir::new().unwrap();
        store(&dir, VersionFormat::Embedded)
            .write_version("2.1.0")
            .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(EMBEDDED_FILE_NAME)).unwrap(),
            "export const VERSION = \"2.1.0\";\n"
        );
    }

    #[test]
    fn test_write_embedded_keeps_surrounding_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(EMBEDDED_FILE_NAME);
        fs::write(
            &path,
            "// generated by release tooling\nexport const VERSION = '1.9.0'\nexport const NAME = \"app\";\n",
        )
        .unwrap();

        let store = store(&dir, VersionFormat::Embedded);
        store.write_version("2.0.0").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "// generated by release tooling\nexport const VERSION = '2.0.0'\nexport const NAME = \"app\";\n"
        );
        assert_eq!(store.read_version().unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_write_embedded_replaces_unreadable_declarations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(EMBEDDED_FILE_NAME);
        fs::write(&path, "export const VERSION = 3;\n").unwrap();

        store(&dir, VersionFormat::Embedded)
            .write_version("1.0.0")
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "export const VERSION = \"1.0.0\";\n"
        );
    }

    #[test]
    fn test_write_invalid_input_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PLAIN_FILE_NAME);
        fs::write(&path, "1.0.0").unwrap();

        let err = store(&dir, VersionFormat::Plain)
            .write_version("not-a-version")
            .unwrap_err();

        assert!(matches!(err, VersionError::InvalidInput { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1.0.0");
    }

    #[test]
    fn test_round_trip_both_formats() {
        for format in [VersionFormat::Plain, VersionFormat::Embedded] {
            for input in ["1.2.3", "v3.0.0-beta", " 0.0.1+build.9\n"] {
                let dir = TempDir::new().unwrap();
                let store = store(&dir, format);

                let written = store.write_version(input).unwrap();
                assert_eq!(written, domain::clean(input).unwrap());
                assert_eq!(store.read_version().unwrap(), written, "{format:?} {input:?}");
            }
        }
    }
}
