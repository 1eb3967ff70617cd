//! Reference-counted subscription manager.
//!
//! The server must be told exactly once when an input starts being observed
//! and exactly once when it stops, no matter how many independent consumers
//! watch the same id. The id → count table is the single source of truth;
//! it is owned here and never exposed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use patchwire_core::request::{RequestMessage, input_path};

use crate::transport::Transport;

/// Outbound seam for subscription requests.
///
/// [`Transport`] is the production implementation; tests substitute a
/// recording sink.
pub trait MessageSink: Send + Sync {
    /// Send a request towards the server (best effort, no delivery guarantee).
    fn send_message(&self, message: &RequestMessage);
}

impl MessageSink for Transport {
    fn send_message(&self, message: &RequestMessage) {
        Transport::send_message(self, message);
    }
}

impl<S: MessageSink + ?Sized> MessageSink for Arc<S> {
    fn send_message(&self, message: &RequestMessage) {
        (**self).send_message(message);
    }
}

/// Per-input subscription reference counter.
///
/// The count-check and the wire send happen under one lock, so concurrent
/// mount/unmount interleavings on the same id preserve the exactly-once
/// transition property.
pub struct Subscriptions<S> {
    sink: S,
    counts: Mutex<HashMap<u64, u32>>,
}

impl<S: MessageSink> Subscriptions<S> {
    /// Create an empty subscription table over `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Register one more observer for `id`.
    ///
    /// Sends a `subscribe` request on the 0→1 transition only.
    pub fn subscribe(&self, id: u64) {
        let mut counts = self.counts.lock();
        let count = counts.entry(id).or_insert(0);
        if *count == 0 {
            self.sink
                .send_message(&RequestMessage::subscribe(input_path(id)));
        }
        *count += 1;
    }

    /// Drop one observer for `id`.
    ///
    /// Sends an `unsubscribe` request on the 1→0 transition only; calling
    /// without a matching [`Subscriptions::subscribe`] is a no-op and never
    /// produces a spurious wire message.
    pub fn unsubscribe(&self, id: u64) {
        let mut counts = self.counts.lock();
        let Some(count) = counts.get_mut(&id) else {
            return;
        };
        if *count == 1 {
            self.sink
                .send_message(&RequestMessage::unsubscribe(input_path(id)));
            let _ = counts.remove(&id);
        } else {
            *count -= 1;
        }
    }

    /// Current observer count for `id` (diagnostics only).
    #[must_use]
    pub fn count(&self, id: u64) -> u32 {
        self.counts.lock().get(&id).copied().unwrap_or(0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
