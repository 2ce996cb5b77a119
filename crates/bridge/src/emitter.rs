//! Single-listener block event stream.
//!
//! The enforcement side never waits on the app: when the listener's buffer is
//! full the new event is dropped and counted.

use focusguard_events::BlockEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;

/// Default listener buffer, in events.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

struct Listener {
    id: u64,
    tx: mpsc::Sender<BlockEvent>,
}

#[derive(Default)]
struct Inner {
    listener: Mutex<Option<Listener>>,
    next_id: AtomicU64,
    dropped_events: AtomicU64,
}

impl Inner {
    fn listener(&self) -> MutexGuard<'_, Option<Listener>> {
        self.listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self, id: u64) {
        let mut listener = self.listener();
        if listener.as_ref().is_some_and(|l| l.id == id) {
            *listener = None;
            tracing::debug!(listener_id = id, "block event listener released");
        }
    }
}

/// Sending half of the event surface, shared by the probe and the bridge.
#[derive(Clone, Default)]
pub struct BlockEventEmitter {
    inner: Arc<Inner>,
}

impl BlockEventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener. Any previous listener is replaced and its
    /// stream ends.
    pub fn listen(&self, capacity: usize) -> BlockEventStream {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let previous = self.inner.listener().replace(Listener { id, tx });
        if let Some(previous) = previous {
            tracing::debug!(
                previous_id = previous.id,
                listener_id = id,
                "block event listener replaced"
            );
        }

        BlockEventStream {
            rx,
            id,
            emitter: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to the current listener.
    ///
    /// Returns false when there is no listener or the event was dropped.
    pub fn emit(&self, event: BlockEvent) -> bool {
        let mut listener = self.inner.listener();
        let Some(current) = listener.as_ref() else {
            tracing::debug!(platform = %event.platform, "no block event listener");
            return false;
        };

        match current.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                let dropped = self.inner.dropped_events.fetch_add(1, Ordering::Relaxed) + 1;
                // Rate-limit logging: only log every 10th drop
                if dropped % 10 == 1 {
                    tracing::warn!(dropped, platform = %event.platform, "block event listener full, dropping events");
                }
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(listener_id = current.id, "block event listener closed");
                *listener = None;
                false
            }
        }
    }

    pub fn has_listener(&self) -> bool {
        self.inner.listener().is_some()
    }

    pub fn dropped_events(&self) -> u64 {
        self.inner.dropped_events.load(Ordering::Relaxed)
    }
}

/// Receiving half held by the single registered listener.
///
/// Dropping the stream (or calling [`BlockEventStream::cancel`]) unregisters it.
pub struct BlockEventStream {
    rx: mpsc::Receiver<BlockEvent>,
    id: u64,
    emitter: Weak<Inner>,
}

impl BlockEventStream {
    /// A stream that never yields, for bridges without a capability.
    pub fn closed() -> Self {
        let (_tx, rx) = mpsc::channel(1);
        Self {
            rx,
            id: u64::MAX,
            emitter: Weak::new(),
        }
    }

    /// Next event in arrival order, or `None` once replaced or cancelled.
    pub async fn recv(&mut self) -> Option<BlockEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<BlockEvent> {
        self.rx.try_recv().ok()
    }

    pub fn cancel(self) {}
}

impl Drop for BlockEventStream {
    fn drop(&mut self) {
        if let Some(inner) = self.emitter.upgrade() {
            inner.release(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_delivered_in_order() {
        let emitter = BlockEventEmitter::new();
        let mut stream = emitter.listen(8);

        assert!(emitter.emit(BlockEvent::new("TikTok", 1)));
        assert!(emitter.emit(BlockEvent::new("YouTube Shorts", 2)));

        assert_eq!(stream.recv().await.unwrap().timestamp, 1);
        assert_eq!(stream.recv().await.unwrap().timestamp, 2);
    }

    #[tokio::test]
    async fn test_new_listener_replaces_previous() {
        let emitter = BlockEventEmitter::new();
        let mut first = emitter.listen(8);
        let mut second = emitter.listen(8);

        assert!(emitter.emit(BlockEvent::new("TikTok", 1)));

        assert!(first.recv().await.is_none(), "replaced stream should end");
        assert_eq!(second.recv().await.unwrap().platform, "TikTok");
    }

    #[test]
    fn test_dropping_old_stream_keeps_new_listener() {
        let emitter = BlockEventEmitter::new();
        let first = emitter.listen(8);
        let _second = emitter.listen(8);

        drop(first);
        assert!(emitter.has_listener());
    }

    #[test]
    fn test_cancel_unregisters() {
        let emitter = BlockEventEmitter::new();
        let stream = emitter.listen(8);
        assert!(emitter.has_listener());

        stream.cancel();
        assert!(!emitter.has_listener());
        assert!(!emitter.emit(BlockEvent::new("TikTok", 1)));
    }

    #[test]
    fn test_full_buffer_drops_newest() {
        let emitter = BlockEventEmitter::new();
        let mut stream = emitter.listen(1);

        assert!(emitter.emit(BlockEvent::new("TikTok", 1)));
        assert!(!emitter.emit(BlockEvent::new("TikTok", 2)));
        assert_eq!(emitter.dropped_events(), 1);

        assert_eq!(stream.try_recv().unwrap().timestamp, 1);
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_closed_stream_ends_immediately() {
        let mut stream = BlockEventStream::closed();
        assert!(stream.recv().await.is_none());
    }
}
