//! # Transync Common Library
//!
//! Shared code for the transcript synchronization engine:
//! - Transcript segments and the on-disk storage format
//! - Event types (SessionEvent enum)
//! - Configuration loading
//! - Time formatting and display window helpers

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod transcript;

pub use error::{Error, Result};
pub use transcript::Segment;
