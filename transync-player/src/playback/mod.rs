//! Playback port and media engine abstraction
//!
//! The media engine (decoding, output) lives outside this crate. The core
//! only drives it through [`MediaEngine`], and only through the
//! [`PlaybackPort`] that owns it.

mod port;
mod simulated;

pub use port::PlaybackPort;
pub use simulated::SimulatedEngine;

use crate::error::Result;
use std::time::Duration;

/// Operations the synchronization core needs from a media engine
///
/// Calls are expected to return promptly. Implementations need no internal
/// locking: the port serializes every call.
pub trait MediaEngine: Send {
    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the position
    fn pause(&mut self) -> Result<()>;

    /// Stop playback and release the media
    fn stop(&mut self) -> Result<()>;

    /// Current position within the media
    fn get_elapsed(&self) -> Result<Duration>;

    /// Move the playback cursor
    fn set_elapsed(&mut self, position: Duration) -> Result<()>;

    /// Whether the clock is currently advancing
    fn is_playing(&self) -> bool;
}
