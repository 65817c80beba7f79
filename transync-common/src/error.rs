//! Common error types for Transync

use thiserror::Error;

/// Common result type for Transync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by all Transync crates
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed transcript row (1-based line number)
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            line,
            reason: reason.into(),
        }
    }
}
