use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::domain::TagPattern;
use crate::error::{Result, VersionError};

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = ".versionrc.toml";

/// Represents the complete configuration for version-bump.
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub tag: TagConfig,

    #[serde(default)]
    pub git: GitConfig,
}

fn default_tag_pattern() -> String {
    "{version}".to_string()
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// How release tags are named and whether they are annotated.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagConfig {
    /// Tag name pattern; `{version}` is replaced with the normalized version.
    #[serde(default = "default_tag_pattern")]
    pub pattern: String,

    /// Create an annotated tag whose message is the version string.
    #[serde(default)]
    pub annotate: bool,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            pattern: default_tag_pattern(),
            annotate: false,
        }
    }
}

impl TagConfig {
    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(self.pattern.clone())
    }
}

/// How the git executable is invoked.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_git_program")]
    pub program: String,

    /// Upper bound on how long a single git command may run.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            program: default_git_program(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `.versionrc.toml` in current directory
/// 3. `.versionrc.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// The tag pattern is validated here so a bad file fails before any git work.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let (source, config_str) = if let Some(path) = config_path {
        (path.to_string(), read_config_file(Path::new(path))?)
    } else if local.exists() {
        (local.display().to_string(), read_config_file(&local)?)
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(CONFIG_FILE_NAME);
        if user_config.exists() {
            (
                user_config.display().to_string(),
                read_config_file(&user_config)?,
            )
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    log::debug!("loading configuration from {}", source);
    parse_config(&config_str).map_err(|e| match e {
        VersionError::Config(msg) => VersionError::config(format!("{}: {}", source, msg)),
        other => other,
    })
}

/// Parses and validates a configuration document.
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(config_str).map_err(|e| VersionError::config(e.to_string()))?;
    config.tag.tag_pattern()?;
    if config.git.timeout_secs == 0 {
        return Err(VersionError::config("[git] timeout_secs must be at least 1"));
    }
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => VersionError::Permission(e),
        _ => VersionError::config(format!("cannot read {}: {}", path.display(), e)),
    })
}
