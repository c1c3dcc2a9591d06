//! Configuration loaded from `config.toml`
//!
//! Looked up in the user config directory (~/.config/mixconsole on Linux).
//! A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Config-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG or defaults to "info"
    pub log_level: Option<String>,
    /// Preset JSON merged into the catalog at start-up
    pub user_presets: Option<PathBuf>,
}

/// Get the config directory path (~/.config/mixconsole)
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mixconsole")
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
