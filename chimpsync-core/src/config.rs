//! YAML config at `~/.chimpsync/config.yaml`.
//!
//! # API pattern
//!
//! - `load_at(home: &Path)`: explicit home; used in tests with `TempDir`
//! - `load()`: derives home from `dirs::home_dir()`, delegates to `_at`
//! - `load_from(path)`: explicit file (`--config`)
//!
//! A missing file is not an error: every field can also come from the command
//! line or the environment. [`Config::resolve`] checks that the merged result is
//! complete.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Transport timeout used when the config does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings as stored on disk; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Overrides the data-centre URL derived from the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// A complete, validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub api_key: String,
    pub store_id: String,
    pub database: PathBuf,
    pub api_base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Config {
    /// Overlay `other` on top of `self`: any field set in `other` wins.
    pub fn merge(self, other: Config) -> Config {
        Config {
            api_key: other.api_key.or(self.api_key),
            store_id: other.store_id.or(self.store_id),
            database: other.database.or(self.database),
            api_base_url: other.api_base_url.or(self.api_base_url),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Require the mandatory fields and apply defaults.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        Ok(ResolvedConfig {
            api_key: non_empty(self.api_key).ok_or(ConfigError::Missing("api_key"))?,
            store_id: non_empty(self.store_id).ok_or(ConfigError::Missing("store_id"))?,
            database: self.database.ok_or(ConfigError::Missing("database"))?,
            api_base_url: non_empty(self.api_base_url),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `<home>/.chimpsync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".chimpsync").join("config.yaml")
}

/// Load `<home>/.chimpsync/config.yaml`, or defaults if it does not exist.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_optional(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    load_at(&home)
}

/// Load an explicitly named config file; it must exist.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &contents)
}

fn load_optional(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    load_from(path)
}

fn parse(path: &Path, contents: &str) -> Result<Config, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
