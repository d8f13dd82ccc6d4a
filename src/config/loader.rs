//! Loading `hashref.toml`.
//!
//! Text is parsed and validated in one step; the file path, when there is
//! one, travels with every error as its [`Origin`].

use crate::config::schema::{HashrefConfig, ValidationError};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in a workspace root when no config path is given.
pub const CONFIG_FILE: &str = "hashref.toml";

/// Where a config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Inline,
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Inline => write!(f, "config"),
            Origin::File(path) => write!(f, "config {}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse {origin}: {source}")]
    Toml {
        origin: Origin,
        source: toml_edit::de::Error,
    },

    #[error("invalid {origin}: {source}")]
    Validation {
        origin: Origin,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn origin(&self) -> Option<&Origin> {
        match self {
            ConfigError::Io { .. } => None,
            ConfigError::Toml { origin, .. } | ConfigError::Validation { origin, .. } => {
                Some(origin)
            }
        }
    }
}

fn parse(input: &str, origin: Origin) -> Result<HashrefConfig, ConfigError> {
    let config: HashrefConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(source) => return Err(ConfigError::Toml { origin, source }),
    };
    match config.validate() {
        Ok(()) => Ok(config),
        Err(source) => Err(ConfigError::Validation { origin, source }),
    }
}

pub fn load_from_str(input: &str) -> Result<HashrefConfig, ConfigError> {
    parse(input, Origin::Inline)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<HashrefConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, Origin::File(path.to_path_buf()))
}

/// Load `<root>/hashref.toml` if it exists.
pub fn discover(root: impl AsRef<Path>) -> Result<Option<HashrefConfig>, ConfigError> {
    let candidate = root.as_ref().join(CONFIG_FILE);
    if !candidate.is_file() {
        return Ok(None);
    }
    load_from_path(candidate).map(Some)
}
