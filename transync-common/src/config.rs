//! Configuration loading
//!
//! Bootstrap configuration comes from an optional TOML file. Every field has a
//! built-in default, and a missing file is never fatal.
//!
//! # Config file resolution
//!
//! 1. Explicit path (command-line argument), must exist
//! 2. `TRANSYNC_CONFIG` environment variable
//! 3. `<user config dir>/transync/config.toml`
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "TRANSYNC_CONFIG";

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub sync: SyncSection,
    pub editor: EditorSection,
    pub logging: LoggingConfig,
}

/// Synchronization settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncSection {
    /// Slack subtracted from the time remaining in a segment.
    ///
    /// With a non-zero tolerance the scheduler advances this much before the
    /// segment's end timestamp.
    pub boundary_tolerance_ms: u64,

    /// Leave playback paused after the session starts
    pub start_paused: bool,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            boundary_tolerance_ms: 0,
            start_paused: false,
        }
    }
}

/// Editor / display settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSection {
    /// Number of segments shown around the current one
    pub window_size: usize,

    /// Write the transcript back to its source when the session closes
    pub save_on_close: bool,
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            window_size: 10,
            save_on_close: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Resolve and load configuration following the priority order above
    ///
    /// An explicitly named file must exist; implicit locations fall back to
    /// defaults when absent. A file that exists but does not parse is always
    /// an error.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::from_file(path);
        }

        match resolve_config_path() {
            Some(path) => Self::from_file(&path),
            None => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Locate an implicit config file (environment variable, then user config dir)
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        warn!(
            "{} points to missing file {:?}, ignoring",
            CONFIG_ENV_VAR, path
        );
    }

    default_config_path().filter(|path| path.exists())
}

/// Platform config location: `<config dir>/transync/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("transync").join("config.toml"))
}
