//! Transcript session: the control facade
//!
//! Single entry point for callers (UI, console). Owns the transcript, the
//! playback port, the notification hub and the sync scheduler, and makes
//! compound navigation atomic with respect to the scheduler.
//!
//! Not designed for concurrent callers: one foreground control thread drives
//! a session while the scheduler runs in the background.

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::notify::{ChannelListener, NotificationHub, SegmentListener};
use crate::playback::{MediaEngine, PlaybackPort};
use crate::state::SharedTranscript;
use crate::sync::{SchedulerState, SyncCore, SyncScheduler, SyncState};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use transync_common::events::SessionEvent;
use transync_common::transcript::{self, Segment};

/// Capacity of the session event channel
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// One running transcript/playback session
pub struct Session {
    transcript: SharedTranscript,
    port: Arc<PlaybackPort>,
    core: Arc<SyncCore>,
    hub: Arc<NotificationHub>,
    scheduler: SyncScheduler,

    /// Event broadcaster for async consumers
    event_tx: broadcast::Sender<SessionEvent>,

    /// Kept alive here; the hub only holds a weak reference
    _event_forwarder: Arc<ChannelListener>,

    config: SessionConfig,

    /// File the transcript was loaded from
    source: Option<PathBuf>,

    /// One-shot shutdown guard
    closed: AtomicBool,
}

impl Session {
    /// Create a session over already-loaded segments
    pub fn new<E: MediaEngine + 'static>(
        segments: Vec<Segment>,
        engine: E,
        config: SessionConfig,
    ) -> Self {
        let transcript = SharedTranscript::new(segments);
        let port = Arc::new(PlaybackPort::new(engine));
        let core = Arc::new(SyncCore::new());
        let hub = Arc::new(NotificationHub::new());

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let event_forwarder = Arc::new(ChannelListener::new(event_tx.clone()));
        hub.attach(&event_forwarder);

        let scheduler = SyncScheduler::new(
            Arc::clone(&core),
            Arc::clone(&port),
            transcript.clone(),
            Arc::clone(&hub),
            config.boundary_tolerance,
        );

        Self {
            transcript,
            port,
            core,
            hub,
            scheduler,
            event_tx,
            _event_forwarder: event_forwarder,
            config,
            source: None,
            closed: AtomicBool::new(false),
        }
    }

    /// Load a transcript file and create a session over it
    pub fn open<E: MediaEngine + 'static>(
        path: &Path,
        engine: E,
        config: SessionConfig,
    ) -> Result<Self> {
        let segments = transcript::load(path)?;
        let mut session = Self::new(segments, engine, config);
        session.source = Some(path.to_path_buf());
        info!("Opened transcript session for {}", path.display());
        Ok(session)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::InvalidState("session is shut down".to_string()));
        }
        Ok(())
    }

    fn broadcast_event(&self, event: SessionEvent) {
        // No receivers is OK
        let _ = self.event_tx.send(event);
    }

    /// Start the sync scheduler and, unless configured paused, playback
    pub fn start(&self) -> Result<()> {
        self.ensure_open()?;
        self.scheduler.start()?;

        if !self.config.start_paused {
            let state = self.core.lock();
            let played = self.port.play();
            self.core.signal(state);
            played?;
        }
        Ok(())
    }

    /// Toggle playback; returns the new playing state
    pub fn pause_resume(&self) -> Result<bool> {
        self.ensure_open()?;
        let state = self.core.lock();
        let toggled = self.port.pause_or_resume();
        self.core.signal(state);

        let playing = toggled?;
        self.broadcast_event(SessionEvent::PlaybackToggled { playing });
        Ok(playing)
    }

    /// Move by `delta` segments relative to the current one
    ///
    /// `delta = 0` restarts the current segment. A target outside the
    /// transcript is ignored. Returns whether playback was repositioned.
    pub fn seek(&self, delta: isize) -> Result<bool> {
        self.ensure_open()?;
        let state = self.core.lock();
        match state.current_index().checked_add_signed(delta) {
            Some(target) => self.reposition(state, target),
            None => {
                debug!("Seek by {} before first segment, ignoring", delta);
                Ok(false)
            }
        }
    }

    /// Jump to an explicit segment; out-of-range indices are ignored
    pub fn jump_to(&self, index: usize) -> Result<bool> {
        self.ensure_open()?;
        let state = self.core.lock();
        self.reposition(state, index)
    }

    /// pause → move clock → set index (notifies) → resume → signal
    ///
    /// Runs entirely under the sync lock, so the scheduler observes either
    /// the state before or after, never a partial sequence.
    fn reposition(&self, mut state: MutexGuard<'_, SyncState>, target: usize) -> Result<bool> {
        let Some(start) = self.transcript.start_time(target) else {
            debug!(
                "Segment {} outside 0..{}, ignoring",
                target,
                self.transcript.len()
            );
            return Ok(false);
        };

        let result = self.apply_reposition(&mut state, target, start);
        // Always wake the scheduler, even after a partial engine failure
        self.core.signal(state);
        result.map(|()| true)
    }

    fn apply_reposition(&self, state: &mut SyncState, target: usize, start: Duration) -> Result<()> {
        self.port.pause()?;
        self.port.set_time(start)?;
        state.set_index(target, &self.hub);
        self.port.play()?;
        debug!("Repositioned to segment {} at {:?}", target, start);
        Ok(())
    }

    /// Replace a segment's text and mark it modified
    pub fn edit_segment(&self, index: usize, text: &str) -> Result<()> {
        if text.contains(['\n', '\r']) {
            return Err(transync_common::Error::InvalidInput(
                "segment text cannot contain line breaks".to_string(),
            )
            .into());
        }
        self.transcript.edit(index, text)?;
        debug!("Edited segment {}", index);
        self.broadcast_event(SessionEvent::SegmentEdited { index });
        Ok(())
    }

    /// Empty a segment's text (marks it modified)
    pub fn clear_segment(&self, index: usize) -> Result<()> {
        self.edit_segment(index, "")
    }

    /// Write the transcript to `destination`
    pub fn save(&self, destination: &Path) -> Result<()> {
        transcript::save(&self.transcript.snapshot(), destination)?;
        self.transcript.mark_saved();
        self.broadcast_event(SessionEvent::TranscriptSaved {
            path: destination.display().to_string(),
        });
        Ok(())
    }

    /// Default save location: configured destination, else the source file
    pub fn default_destination(&self) -> Option<PathBuf> {
        self.config
            .destination
            .clone()
            .or_else(|| self.source.clone())
    }

    /// Save to the default location
    pub fn save_default(&self) -> Result<PathBuf> {
        let destination = self.default_destination().ok_or_else(|| {
            Error::InvalidState("no save destination for this session".to_string())
        })?;
        self.save(&destination)?;
        Ok(destination)
    }

    /// Save a dirty transcript (when configured), then shut down
    ///
    /// The session is shut down even if saving fails; the save error is
    /// returned afterwards.
    pub fn close(&self) -> Result<()> {
        let saved = if self.config.save_on_close && self.transcript.is_dirty() {
            match self.default_destination() {
                Some(destination) => self.save(&destination),
                None => {
                    warn!("Transcript has unsaved edits but no save destination");
                    Ok(())
                }
            }
        } else {
            Ok(())
        };

        self.shutdown()?;
        saved
    }

    /// Stop the scheduler, wait for it, then stop playback
    ///
    /// Idempotent; later calls return immediately.
    pub fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Shutting down transcript session");
        self.scheduler.shutdown();
        self.port.stop()
    }

    /// Index of the current segment
    ///
    /// Must not be called from a listener callback (the index lock is held
    /// during delivery); listeners receive the index as an argument instead.
    pub fn current_segment(&self) -> usize {
        self.core.current_index()
    }

    /// Playback position reported by the engine
    pub fn elapsed(&self) -> Result<Duration> {
        self.port.get_time()
    }

    pub fn is_playing(&self) -> bool {
        self.port.is_playing()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Handle to the shared transcript (read access for renderers)
    pub fn transcript(&self) -> &SharedTranscript {
        &self.transcript
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.transcript.snapshot()
    }

    pub fn is_dirty(&self) -> bool {
        self.transcript.is_dirty()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Display window around `current` using the configured size
    pub fn window(&self, current: usize) -> Vec<(usize, Segment)> {
        self.transcript.window(current, self.config.window_size)
    }

    pub fn attach<L: SegmentListener + 'static>(&self, listener: &Arc<L>) -> bool {
        self.hub.attach(listener)
    }

    pub fn detach<L: SegmentListener + 'static>(&self, listener: &Arc<L>) -> bool {
        self.hub.detach(listener)
    }

    /// Subscribe to session events
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Error stopping playback on drop: {}", e);
        }
    }
}
