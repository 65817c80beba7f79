//! Sync scheduler: background task tracking the current segment
//!
//! Sleeps until the current segment's end instead of polling:
//! - while paused, waits with no timeout until signaled
//! - while playing, waits up to the time remaining in the segment
//! - a state-changed signal (seek, jump, pause, resume) cuts the wait short
//!   and forces a fresh evaluation; only a wait that times out naturally
//!   advances the index
//!
//! Wakeups are therefore proportional to segment transitions plus external
//! events, not to a fixed tick rate.

use super::{SyncCore, SyncState};
use crate::error::{Error, Result};
use crate::notify::NotificationHub;
use crate::playback::PlaybackPort;
use crate::state::SharedTranscript;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, trace};

/// Externally visible scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started yet, or shut down (terminal)
    Stopped,
    Running,
}

enum Lifecycle {
    NotStarted,
    Running(JoinHandle<()>),
    Terminated,
}

/// What the scheduler should do after looking at the current state
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// Segment end already reached
    Advance,

    /// Sleep until signaled or until the segment ends
    WaitFor(Duration),

    /// Sleep until signaled (paused, end of transcript, empty transcript)
    Park,
}

/// Everything the worker thread reads, shared with the session
struct SchedulerContext {
    core: Arc<SyncCore>,
    port: Arc<PlaybackPort>,
    transcript: SharedTranscript,
    hub: Arc<NotificationHub>,
    boundary_tolerance: Duration,
}

/// Background task advancing the current segment index
pub struct SyncScheduler {
    context: Arc<SchedulerContext>,
    lifecycle: Mutex<Lifecycle>,
}

impl SyncScheduler {
    pub fn new(
        core: Arc<SyncCore>,
        port: Arc<PlaybackPort>,
        transcript: SharedTranscript,
        hub: Arc<NotificationHub>,
        boundary_tolerance: Duration,
    ) -> Self {
        Self {
            context: Arc::new(SchedulerContext {
                core,
                port,
                transcript,
                hub,
                boundary_tolerance,
            }),
            lifecycle: Mutex::new(Lifecycle::NotStarted),
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SchedulerState {
        match *self.lifecycle() {
            Lifecycle::Running(_) => SchedulerState::Running,
            Lifecycle::NotStarted | Lifecycle::Terminated => SchedulerState::Stopped,
        }
    }

    /// Spawn the worker thread
    ///
    /// A scheduler runs at most once: starting it twice, or after shutdown,
    /// is an error.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle();
        match *lifecycle {
            Lifecycle::NotStarted => {}
            Lifecycle::Running(_) => {
                return Err(Error::InvalidState("sync scheduler already running".to_string()))
            }
            Lifecycle::Terminated => {
                return Err(Error::InvalidState("sync scheduler was shut down".to_string()))
            }
        }

        let context = Arc::clone(&self.context);
        let handle = thread::Builder::new()
            .name("transync-sync".to_string())
            .spawn(move || context.run())
            .map_err(|e| Error::InvalidState(format!("failed to spawn sync scheduler: {}", e)))?;

        *lifecycle = Lifecycle::Running(handle);
        info!(
            "Sync scheduler started (boundary tolerance {}ms)",
            self.context.boundary_tolerance.as_millis()
        );
        Ok(())
    }

    /// Stop the worker and wait for it to exit
    ///
    /// Idempotent. Must not be called from a listener running on the
    /// scheduler thread.
    pub fn shutdown(&self) {
        let handle = match std::mem::replace(&mut *self.lifecycle(), Lifecycle::Terminated) {
            Lifecycle::Running(handle) => Some(handle),
            Lifecycle::NotStarted | Lifecycle::Terminated => None,
        };

        let mut state = self.context.core.lock();
        state.request_shutdown();
        drop(state);
        self.context.core.condvar().notify_all();

        if let Some(handle) = handle {
            match handle.join() {
                Ok(()) => info!("Sync scheduler shut down"),
                Err(e) => error!("Sync scheduler thread panicked: {:?}", e),
            }
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl SchedulerContext {
    /// Worker thread main loop
    ///
    /// The sync lock is held except while waiting on the condition variable,
    /// so an evaluation never interleaves with a session seek.
    fn run(&self) {
        debug!("Sync scheduler worker started");
        let mut state = self.core.lock();

        while !state.is_shutdown() {
            // Fresh evaluation: any pending signal is consumed here
            state.take_signal();

            match self.evaluate(&state) {
                Step::Advance => self.advance(&mut state),
                Step::WaitFor(remaining) => {
                    trace!("Waiting {:?} for segment {} to end", remaining, state.current_index());
                    let (guard, result) = self
                        .core
                        .condvar()
                        .wait_timeout_while(state, remaining, |s| s.should_sleep())
                        .unwrap_or_else(PoisonError::into_inner);
                    state = guard;

                    if result.timed_out() && state.should_sleep() {
                        self.advance(&mut state);
                    } else {
                        trace!("Woken early, re-evaluating");
                    }
                }
                Step::Park => {
                    state = self
                        .core
                        .condvar()
                        .wait_while(state, |s| s.should_sleep())
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }

        debug!("Sync scheduler worker exiting");
    }

    fn evaluate(&self, state: &SyncState) -> Step {
        if !self.port.is_playing() {
            return Step::Park;
        }

        let index = state.current_index();
        let Some(end) = self.transcript.end_time(index) else {
            return Step::Park;
        };

        let elapsed = match self.port.get_time() {
            Ok(elapsed) => elapsed,
            Err(e) => {
                // Retried on the next external state change
                error!("Failed to read playback position: {}", e);
                return Step::Park;
            }
        };

        let is_last = index + 1 >= self.transcript.len();
        next_step(end, elapsed, self.boundary_tolerance, is_last)
    }

    /// Move to the next segment, clamped at the last one
    fn advance(&self, state: &mut SyncState) {
        let next = state.current_index() + 1;
        if next < self.transcript.len() {
            state.set_index(next, &self.hub);
        } else {
            trace!("End of transcript, not advancing");
        }
    }
}

/// Decide the next step from the segment end and playback position
fn next_step(end: Duration, elapsed: Duration, tolerance: Duration, is_last: bool) -> Step {
    match end.checked_sub(elapsed + tolerance) {
        Some(remaining) if !remaining.is_zero() => Step::WaitFor(remaining),
        // remaining <= 0
        _ if is_last => Step::Park,
        _ => Step::Advance,
    }
}
