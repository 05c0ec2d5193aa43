//! # Configuration
//!
//! `padwatch` reads a single TOML file. Every field has a default, so a missing
//! or partial file still yields a usable configuration and
//! [`PadConfig::load_or_create`] writes the defaults out on first start.
//!
//! ## Location
//! `$PADWATCH_CONFIG` when set, otherwise `<config dir>/padwatch/config.toml`
//! (`~/.config/padwatch/config.toml` on Linux).
//!
//! ## Example
//! ```toml
//! device_index = 0
//! poll_interval_ms = 50
//! on_disconnect = "skip"
//!
//! [[bindings]]
//! event = "buttonpressed"
//! action = "log"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::bindings::Binding;
use crate::gamepad::{DisconnectPolicy, PollSettings};

pub const CONFIG_ENV: &str = "PADWATCH_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No platform config directory available")]
    NoConfigDir,
}

/// Settings for one watched gamepad
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PadConfig {
    /// Index of the gamepad among the connected ones
    pub device_index: usize,
    /// Milliseconds between poll ticks
    pub poll_interval_ms: u64,
    pub on_disconnect: DisconnectPolicy,
    /// Listeners registered by name at startup
    pub bindings: Vec<Binding>,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            poll_interval_ms: 50,
            on_disconnect: DisconnectPolicy::Skip,
            bindings: Vec::new(),
        }
    }
}

impl PadConfig {
    /// Resolves the config file path from the environment or the platform dirs.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join("padwatch").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)
    }

    /// Loads `path`, writing the default configuration there first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        Self::load(path)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            on_disconnect: self.on_disconnect,
        }
    }
}
