//! Error types for transync-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for transync-player
#[derive(Error, Debug)]
pub enum Error {
    /// Transcript storage errors (parse failures, file I/O)
    #[error(transparent)]
    Transcript(#[from] transync_common::Error),

    /// Media engine failures (not retried)
    #[error("Playback error: {0}")]
    Playback(String),

    /// Segment index outside `0..len`
    #[error("Segment index {index} out of range (transcript has {len} segments)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Convenience Result type using transync-player Error
pub type Result<T> = std::result::Result<T, Error>;
