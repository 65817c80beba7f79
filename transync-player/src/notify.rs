//! Notification hub
//!
//! Fans out segment-changed events to attached listeners, synchronously and
//! in attachment order, on the notifying thread.
//!
//! The hub never owns a listener: it keeps weak references, so a listener
//! dropped by its owner simply stops receiving events. Listeners run on the
//! sync scheduler's thread for natural advances and must return quickly.

use std::ptr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::broadcast;
use tracing::trace;
use transync_common::events::SessionEvent;

/// Receiver of current-segment changes
///
/// `segment_changed` runs while the session's sync lock is held, on the
/// thread that changed the index. It must not call back into the session
/// (`current_segment`, `seek`, `jump_to`, `pause_resume`, ...): the lock is
/// not reentrant and the calling thread would deadlock. Use the `index`
/// argument, or hand the event to another thread (see [`ChannelListener`]).
/// Attaching or detaching listeners on the hub itself is allowed.
pub trait SegmentListener: Send + Sync {
    fn segment_changed(&self, index: usize);
}

/// Observer registry for segment changes
#[derive(Default)]
pub struct NotificationHub {
    listeners: Mutex<Vec<Weak<dyn SegmentListener>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<Weak<dyn SegmentListener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a listener (no-op if already attached)
    ///
    /// Identity is the listener's allocation. Returns false when the listener
    /// was already present.
    pub fn attach<L: SegmentListener + 'static>(&self, listener: &Arc<L>) -> bool {
        let mut listeners = self.listeners();
        listeners.retain(|weak| weak.strong_count() > 0);

        if listeners.iter().any(|weak| same_listener(weak, listener)) {
            return false;
        }

        let weak: Weak<L> = Arc::downgrade(listener);
        listeners.push(weak);
        true
    }

    /// Detach a listener (silent no-op if absent)
    ///
    /// Returns true when something was removed.
    pub fn detach<L: SegmentListener + 'static>(&self, listener: &Arc<L>) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|weak| !same_listener(weak, listener));
        listeners.len() != before
    }

    /// Deliver `index` to every live listener, in attachment order
    ///
    /// The registry lock is released before delivery, so listeners may attach
    /// or detach from inside the callback.
    pub fn notify(&self, index: usize) {
        let live: Vec<Arc<dyn SegmentListener>> = {
            let mut listeners = self.listeners();
            listeners.retain(|weak| weak.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        trace!("Notifying {} listeners of segment {}", live.len(), index);
        for listener in live {
            listener.segment_changed(index);
        }
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.listeners()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn same_listener<L>(weak: &Weak<dyn SegmentListener>, listener: &Arc<L>) -> bool {
    ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(listener))
}

/// Listener forwarding segment changes onto a broadcast channel
///
/// Decouples slow consumers (rendering, JSON output) from the notifying
/// thread. Sending never blocks; a send with no receivers is dropped.
pub struct ChannelListener {
    tx: broadcast::Sender<SessionEvent>,
}

impl ChannelListener {
    pub fn new(tx: broadcast::Sender<SessionEvent>) -> Self {
        Self { tx }
    }
}

impl SegmentListener for ChannelListener {
    fn segment_changed(&self, index: usize) {
        // No receivers is OK
        let _ = self.tx.send(SessionEvent::SegmentChanged { index });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<usize>>,
    }

    impl Recorder {
        fn seen(&self) -> Vec<usize> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl SegmentListener for Recorder {
        fn segment_changed(&self, index: usize) {
            self.seen.lock().unwrap().push(index);
        }
    }

    /// Appends its tag to a shared log, to observe delivery order
    struct Tagged {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SegmentListener for Tagged {
        fn segment_changed(&self, _index: usize) {
            self.log.lock().unwrap().push(self.tag);
        }
    }

    #[test]
    fn test_attach_is_idempotent() {
        let hub = NotificationHub::new();
        let recorder = Arc::new(Recorder::default());

        assert!(hub.attach(&recorder));
        assert!(!hub.attach(&recorder));
        hub.notify(4);

        assert_eq!(recorder.seen(), vec![4]);
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn test_delivery_in_attachment_order() {
        let hub = NotificationHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::new(Tagged { tag: "first", log: Arc::clone(&log) });
        let second = Arc::new(Tagged { tag: "second", log: Arc::clone(&log) });
        let third = Arc::new(Tagged { tag: "third", log: Arc::clone(&log) });

        hub.attach(&second);
        hub.attach(&first);
        hub.attach(&third);
        hub.notify(0);

        assert_eq!(*log.lock().unwrap(), vec!["second", "first", "third"]);
    }

    #[test]
    fn test_detach_absent_is_silent() {
        let hub = NotificationHub::new();
        let recorder = Arc::new(Recorder::default());

        assert!(!hub.detach(&recorder));
        hub.attach(&recorder);
        assert!(hub.detach(&recorder));
        assert!(!hub.detach(&recorder));

        hub.notify(1);
        assert!(recorder.seen().is_empty());
    }

    #[test]
    fn test_dropped_listener_is_skipped() {
        let hub = NotificationHub::new();
        let kept = Arc::new(Recorder::default());
        let dropped = Arc::new(Recorder::default());

        hub.attach(&dropped);
        hub.attach(&kept);
        drop(dropped);

        hub.notify(7);
        assert_eq!(kept.seen(), vec![7]);
        assert_eq!(hub.len(), 1);
    }

    /// Reads the hub from inside its own callback
    struct HubReader {
        hub: Arc<NotificationHub>,
        counts: Mutex<Vec<usize>>,
    }

    impl SegmentListener for HubReader {
        fn segment_changed(&self, _index: usize) {
            self.counts.lock().unwrap().push(self.hub.len());
        }
    }

    #[test]
    fn test_listener_may_use_hub_during_delivery() {
        let hub = Arc::new(NotificationHub::new());
        let reader = Arc::new(HubReader {
            hub: Arc::clone(&hub),
            counts: Mutex::new(Vec::new()),
        });
        let other = Arc::new(Recorder::default());
        hub.attach(&reader);
        hub.attach(&other);

        hub.notify(3);

        assert_eq!(*reader.counts.lock().unwrap(), vec![2]);
        assert_eq!(other.seen(), vec![3]);
    }

    #[test]
    fn test_channel_listener_forwards() {
        let (tx, mut rx) = broadcast::channel(8);
        let hub = NotificationHub::new();
        let forwarder = Arc::new(ChannelListener::new(tx));
        hub.attach(&forwarder);

        hub.notify(2);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::SegmentChanged { index: 2 });
    }
}
