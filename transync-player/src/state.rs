//! Shared transcript state
//!
//! Thread-safe handle to the segment sequence. The session owns it and edits
//! it; the sync scheduler only reads segment timestamps through it.

use crate::error::{Error, Result};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use transync_common::transcript::{window_bounds, Segment};

/// Shared segment sequence
///
/// Cloning yields another handle to the same segments, never a copy.
#[derive(Debug, Clone)]
pub struct SharedTranscript {
    inner: Arc<RwLock<TranscriptInner>>,
}

#[derive(Debug)]
struct TranscriptInner {
    segments: Vec<Segment>,

    /// Edited since load or last save
    dirty: bool,
}

impl SharedTranscript {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TranscriptInner {
                segments,
                dirty: false,
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TranscriptInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TranscriptInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().segments.is_empty()
    }

    /// Start timestamp of segment `index`
    pub fn start_time(&self, index: usize) -> Option<Duration> {
        self.read().segments.get(index).map(|s| s.start_time)
    }

    /// End timestamp of segment `index`
    pub fn end_time(&self, index: usize) -> Option<Duration> {
        self.read().segments.get(index).map(|s| s.end_time)
    }

    /// Copy of one segment
    pub fn get(&self, index: usize) -> Option<Segment> {
        self.read().segments.get(index).cloned()
    }

    /// Replace the text of segment `index` and mark it modified
    pub fn edit(&self, index: usize, text: &str) -> Result<()> {
        let mut inner = self.write();
        let len = inner.segments.len();
        let segment = inner
            .segments
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        segment.edit(text);
        inner.dirty = true;
        Ok(())
    }

    /// Copy of the full sequence (handed to the storage layer)
    pub fn snapshot(&self) -> Vec<Segment> {
        self.read().segments.clone()
    }

    /// Segments of the display window around `current`, with their indices
    pub fn window(&self, current: usize, size: usize) -> Vec<(usize, Segment)> {
        let inner = self.read();
        window_bounds(inner.segments.len(), current, size)
            .map(|idx| (idx, inner.segments[idx].clone()))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.read().dirty
    }

    pub(crate) fn mark_saved(&self) {
        self.write().dirty = false;
    }
}
