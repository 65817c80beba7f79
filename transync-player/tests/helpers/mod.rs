//! Shared test helpers for transync-player integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use transync_common::Segment;
use transync_player::config::SessionConfig;
use transync_player::playback::MediaEngine;
use transync_player::{Error, Result, SegmentListener};

/// Listener recording every delivered index
#[derive(Default)]
pub struct RecordingListener {
    seen: Mutex<Vec<usize>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

impl SegmentListener for RecordingListener {
    fn segment_changed(&self, index: usize) {
        self.seen.lock().unwrap().push(index);
    }
}

/// Segments from `(start_ms, end_ms)` pairs, text "s<index>"
pub fn segments_ms(bounds: &[(u64, u64)]) -> Vec<Segment> {
    bounds
        .iter()
        .enumerate()
        .map(|(i, (start, end))| {
            Segment::new(
                Duration::from_millis(*start),
                Duration::from_millis(*end),
                format!("s{}", i),
            )
        })
        .collect()
}

/// Segments from `(start_s, end_s)` pairs, text "s<index>"
pub fn segments_secs(bounds: &[(u64, u64)]) -> Vec<Segment> {
    let ms: Vec<(u64, u64)> = bounds.iter().map(|(s, e)| (s * 1000, e * 1000)).collect();
    segments_ms(&ms)
}

/// Session config that does not start playback on `start()`
pub fn paused_config() -> SessionConfig {
    SessionConfig {
        start_paused: true,
        ..SessionConfig::default()
    }
}

/// Poll `condition` every few milliseconds until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Observable state of a [`ManualEngine`]
#[derive(Debug, Default, Clone)]
pub struct ManualState {
    pub playing: bool,
    pub position: Duration,
    pub plays: usize,
    pub pauses: usize,
    pub stops: usize,
    pub fail_play: bool,
}

/// Engine whose clock only moves when set explicitly
///
/// The test keeps a probe to the same state to inspect engine calls.
#[derive(Clone, Default)]
pub struct ManualEngine {
    state: Arc<Mutex<ManualState>>,
}

impl ManualEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> Arc<Mutex<ManualState>> {
        Arc::clone(&self.state)
    }

    pub fn failing_play() -> Self {
        let engine = Self::new();
        engine.state.lock().unwrap().fail_play = true;
        engine
    }
}

impl MediaEngine for ManualEngine {
    fn play(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_play {
            return Err(Error::Playback("output device unavailable".to_string()));
        }
        state.plays += 1;
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.pauses += 1;
        state.playing = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.stops += 1;
        state.playing = false;
        state.position = Duration::ZERO;
        Ok(())
    }

    fn get_elapsed(&self) -> Result<Duration> {
        Ok(self.state.lock().unwrap().position)
    }

    fn set_elapsed(&mut self, position: Duration) -> Result<()> {
        self.state.lock().unwrap().position = position;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }
}
