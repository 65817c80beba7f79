//! Wall-clock media engine
//!
//! Advances elapsed time in real time while "playing", without decoding any
//! audio. Used for headless sessions and tests.

use super::MediaEngine;
use crate::error::Result;
use std::time::{Duration, Instant};

/// Media engine driven by the system monotonic clock
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    /// Position accumulated up to the last pause/seek
    base: Duration,

    /// When the clock last started running (None while paused)
    started_at: Option<Instant>,

    /// Media length; playback stops by itself when reached
    duration: Option<Duration>,
}

impl SimulatedEngine {
    /// Paused engine at position zero, unbounded length
    pub fn new() -> Self {
        Self {
            base: Duration::ZERO,
            started_at: None,
            duration: None,
        }
    }

    /// Paused engine at `position`
    pub fn at(position: Duration) -> Self {
        Self {
            base: position,
            ..Self::new()
        }
    }

    /// Bound the media length
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    fn position(&self) -> Duration {
        let running = self
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default();
        let position = self.base + running;
        match self.duration {
            Some(limit) => position.min(limit),
            None => position,
        }
    }

    fn at_end(&self) -> bool {
        self.duration
            .map(|limit| self.position() >= limit)
            .unwrap_or(false)
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaEngine for SimulatedEngine {
    fn play(&mut self) -> Result<()> {
        if self.started_at.is_none() && !self.at_end() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.base = self.position();
        self.started_at = None;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.base = Duration::ZERO;
        self.started_at = None;
        Ok(())
    }

    fn get_elapsed(&self) -> Result<Duration> {
        Ok(self.position())
    }

    fn set_elapsed(&mut self, position: Duration) -> Result<()> {
        self.base = match self.duration {
            Some(limit) => position.min(limit),
            None => position,
        };
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some() && !self.at_end()
    }
}
