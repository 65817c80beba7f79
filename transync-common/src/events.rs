//! Session event types
//!
//! Events emitted by a running session for consumers outside the
//! synchronous listener path (console renderer, JSON output).

use serde::{Deserialize, Serialize};

/// Event published by a transcript session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Current segment changed (natural advance, seek or jump)
    SegmentChanged { index: usize },

    /// Segment text was edited or cleared
    SegmentEdited { index: usize },

    /// Playback was paused or resumed
    PlaybackToggled { playing: bool },

    /// Transcript written to storage
    TranscriptSaved { path: String },
}

impl SessionEvent {
    /// Serialize to a single JSON line
    pub fn to_json(&self) -> String {
        // Every variant is plain data; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
