//! # Transync Player Library (transync-player)
//!
//! Keeps a segmented transcript synchronized with an independently advancing
//! playback clock.
//!
//! **Components:**
//! - [`playback`]: media engine trait and the mutex-guarded playback port
//! - [`sync`]: current segment index and the background sync scheduler
//! - [`notify`]: notification hub fanning out segment changes
//! - [`session`]: control facade (pause/resume, seek, jump, edit, save, shutdown)
//! - [`console`]: stdin command parser used by the `transync` binary

pub mod config;
pub mod console;
pub mod error;
pub mod notify;
pub mod playback;
pub mod session;
pub mod state;
pub mod sync;

pub use error::{Error, Result};
pub use notify::SegmentListener;
pub use session::Session;
pub use state::SharedTranscript;
