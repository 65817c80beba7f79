//! Segment synchronization
//!
//! [`SyncCore`] holds the current segment index and the wake-up signal shared
//! by the scheduler thread and the session. [`SyncScheduler`] is the
//! background task that advances the index as playback crosses segment ends.

mod scheduler;

pub use scheduler::{SchedulerState, SyncScheduler};

use crate::notify::NotificationHub;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Index and signal state, guarded by [`SyncCore`]'s mutex
#[derive(Debug, Default)]
pub struct SyncState {
    current_index: usize,

    /// "State changed externally" flag. Raised by the session, cleared only by
    /// the scheduler when it starts a fresh evaluation, so a signal raised
    /// before the scheduler begins waiting is never lost.
    signaled: bool,

    /// Stop request for the scheduler thread
    shutdown: bool,
}

impl SyncState {
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Set the index and broadcast it before the lock can be released
    ///
    /// This is the only way to change the index, so every change is delivered
    /// before the next one can happen.
    pub fn set_index(&mut self, index: usize, hub: &NotificationHub) {
        debug!("Current segment {} -> {}", self.current_index, index);
        self.current_index = index;
        hub.notify(index);
    }

    pub(crate) fn raise_signal(&mut self) {
        self.signaled = true;
    }

    pub(crate) fn take_signal(&mut self) -> bool {
        std::mem::take(&mut self.signaled)
    }

    pub(crate) fn is_signaled(&self) -> bool {
        self.signaled
    }

    pub(crate) fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Whether a blocked scheduler should stay asleep
    pub(crate) fn should_sleep(&self) -> bool {
        !self.signaled && !self.shutdown
    }
}

/// Shared synchronization state plus the condition variable that wakes the
/// scheduler
#[derive(Debug, Default)]
pub struct SyncCore {
    state: Mutex<SyncState>,
    wake: Condvar,
}

impl SyncCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_index(&self) -> usize {
        self.lock().current_index
    }

    /// Raise the state-changed signal and wake the scheduler
    ///
    /// Consumes the guard so the wake-up happens after the lock is released.
    pub fn signal(&self, mut state: MutexGuard<'_, SyncState>) {
        state.raise_signal();
        drop(state);
        self.wake.notify_all();
    }

    pub(crate) fn condvar(&self) -> &Condvar {
        &self.wake
    }
}
