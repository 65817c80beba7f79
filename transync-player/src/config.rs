//! transync-player session configuration

use std::path::PathBuf;
use std::time::Duration;
use transync_common::config::TomlConfig;

/// Settings for one transcript session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Slack subtracted from the time remaining in each segment
    pub boundary_tolerance: Duration,

    /// Leave playback paused when the session starts
    pub start_paused: bool,

    /// Segments shown by the display window
    pub window_size: usize,

    /// Save a dirty transcript when the session closes
    pub save_on_close: bool,

    /// Where saves go by default (the source file when None)
    pub destination: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}

impl From<&TomlConfig> for SessionConfig {
    fn from(config: &TomlConfig) -> Self {
        Self {
            boundary_tolerance: Duration::from_millis(config.sync.boundary_tolerance_ms),
            start_paused: config.sync.start_paused,
            window_size: config.editor.window_size,
            save_on_close: config.editor.save_on_close,
            destination: None,
        }
    }
}
