//! Application configuration file.
//!
//! Looked up at `$FOCUSGUARD_CONFIG`, then `~/.config/focusguard/config.json`.
//! Every field is optional; a missing file means defaults.

use crate::constants::*;
use crate::store::StoreOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding settings and the block event log.
    pub database_path: PathBuf,

    /// Package id the accessibility service is registered under.
    pub package_id: String,

    pub history_capacity: usize,
    pub event_channel_capacity: usize,
    pub command_channel_capacity: usize,

    /// Minimum spacing between two content checks.
    pub check_interval_ms: u64,

    /// How long the block overlay stays up.
    pub overlay_duration_ms: u64,

    /// Delay between the two back navigations after the overlay hides.
    pub back_repeat_delay_ms: u64,

    /// `tracing_subscriber` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            package_id: DEFAULT_PACKAGE_ID.to_string(),
            history_capacity: HISTORY_CAPACITY,
            event_channel_capacity: EVENT_CHANNEL_CAPACITY,
            command_channel_capacity: COMMAND_CHANNEL_CAPACITY,
            check_interval_ms: 500,
            overlay_duration_ms: 2000,
            back_repeat_delay_ms: 300,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("focusguard")
        .join("focusguard.db")
}

impl AppConfig {
    /// Config file location: `$FOCUSGUARD_CONFIG`, else the user config dir.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|config| config.join("focusguard").join("config.json"))
    }

    /// Load from [`AppConfig::default_path`], or defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load a config file. A file that does not exist yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let config = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            history_capacity: self.history_capacity.max(1),
            command_capacity: self.command_channel_capacity.max(1),
            event_capacity: self.event_channel_capacity.max(1),
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn overlay_duration(&self) -> Duration {
        Duration::from_millis(self.overlay_duration_ms)
    }

    pub fn back_repeat_delay(&self) -> Duration {
        Duration::from_millis(self.back_repeat_delay_ms)
    }
}
