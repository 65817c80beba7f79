//! Synchronized facade over the media engine
//!
//! Every engine call goes through one mutex, so time navigation
//! (`get_time` / `set_time`) never interleaves with other engine calls.

use super::MediaEngine;
use crate::error::Result;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Exclusive owner of the media engine handle
pub struct PlaybackPort {
    engine: Mutex<Box<dyn MediaEngine>>,
}

impl PlaybackPort {
    pub fn new<E: MediaEngine + 'static>(engine: E) -> Self {
        Self {
            engine: Mutex::new(Box::new(engine)),
        }
    }

    fn engine(&self) -> MutexGuard<'_, Box<dyn MediaEngine>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start playback (no-op when already playing)
    pub fn play(&self) -> Result<()> {
        let mut engine = self.engine();
        if engine.is_playing() {
            return Ok(());
        }
        engine.play()
    }

    /// Pause playback (no-op when not playing)
    pub fn pause(&self) -> Result<()> {
        let mut engine = self.engine();
        if !engine.is_playing() {
            return Ok(());
        }
        engine.pause()
    }

    /// Stop the engine
    pub fn stop(&self) -> Result<()> {
        self.engine().stop()
    }

    /// Toggle playback based on the engine's playing flag
    ///
    /// Returns the new playing state.
    pub fn pause_or_resume(&self) -> Result<bool> {
        let mut engine = self.engine();
        if engine.is_playing() {
            engine.pause()?;
        } else {
            engine.play()?;
        }
        let playing = engine.is_playing();
        debug!("Playback toggled (playing={})", playing);
        Ok(playing)
    }

    /// Engine's reported elapsed time
    pub fn get_time(&self) -> Result<Duration> {
        self.engine().get_elapsed()
    }

    /// Reposition the playback cursor (does not notify anyone)
    pub fn set_time(&self, position: Duration) -> Result<()> {
        self.engine().set_elapsed(position)
    }

    pub fn is_playing(&self) -> bool {
        self.engine().is_playing()
    }
}
