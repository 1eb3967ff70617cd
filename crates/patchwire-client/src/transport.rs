//! Transport — thin client over `tokio-tungstenite`.
//!
//! Owns exactly one physical connection at a time and never buffers or
//! interprets payloads beyond parsing each text frame as one JSON
//! [`ResponseMessage`]. Meaning is assigned by listeners registered through
//! the two registries: message listeners and connection-state listeners.
//!
//! All callbacks run on the connection task with run-to-completion
//! semantics: no handler preempts another, and messages are delivered in
//! the exact order the socket produced them. Callbacks must not add or
//! remove listeners on the same transport, as the registries are locked
//! during fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use patchwire_core::request::RequestMessage;
use patchwire_core::response::ResponseMessage;

/// Callback invoked for every inbound message.
pub type MessageCallback = Box<dyn Fn(&ResponseMessage) + Send + Sync>;

/// Callback invoked when the connection state changes.
pub type ConnectionCallback = Box<dyn Fn(bool) + Send + Sync>;

/// Token identifying a registered listener, used for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Transport that maintains the connection to the server.
pub struct Transport {
    inner: Arc<Inner>,
}

struct Inner {
    endpoint: RwLock<(String, u16)>,
    message_listeners: RwLock<Vec<(ListenerId, MessageCallback)>>,
    state_listeners: RwLock<Vec<(ListenerId, ConnectionCallback)>>,
    next_listener_id: AtomicU64,
    connected: AtomicBool,
    connection: Mutex<Option<Connection>>,
    // Bumped on every `connect`; a task whose generation is stale must not
    // touch `connected` or notify listeners, because a replacement task owns
    // the state now. `disconnect` does not bump, so a task cancelled that
    // way still reports the close.
    generation: AtomicU64,
}

struct Connection {
    outbound: mpsc::UnboundedSender<Message>,
    cancel: CancellationToken,
}

impl Transport {
    /// Create a transport with no connection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                endpoint: RwLock::new(("127.0.0.1".to_string(), 8080)),
                message_listeners: RwLock::new(Vec::new()),
                state_listeners: RwLock::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                connected: AtomicBool::new(false),
                connection: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// The last host and port passed to [`Transport::connect`].
    #[must_use]
    pub fn endpoint(&self) -> (String, u16) {
        self.inner.endpoint.read().clone()
    }

    /// Whether the connection is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Open a connection to `ws://{host}:{port}/api/v1`.
    ///
    /// Tears down any existing connection first. On open, connection-state
    /// listeners are notified with `true`; on close or error (collapsed to
    /// one signal) with `false`. Must be called from within a tokio runtime.
    pub fn connect(&self, host: &str, port: u16) {
        let _ = self.disconnect();

        *self.inner.endpoint.write() = (host.to_string(), port);
        let url = format!("ws://{host}:{port}/api/v1");

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        // Bump the generation and install the connection under one lock so
        // a superseded task can never observe itself as current.
        let generation = {
            let mut connection = self.inner.connection.lock();
            let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
            *connection = Some(Connection {
                outbound: outbound_tx,
                cancel: cancel.clone(),
            });
            generation
        };

        let _ = tokio::spawn(run_connection(
            Arc::clone(&self.inner),
            url,
            outbound_rx,
            cancel,
            generation,
        ));
    }

    /// Re-connect to the last used host and port.
    pub fn reconnect(&self) {
        let (host, port) = self.endpoint();
        self.connect(&host, port);
    }

    /// Close the connection with a normal-closure code, if one is open.
    ///
    /// Returns whether a connection existed. Idempotent.
    pub fn disconnect(&self) -> bool {
        let Some(connection) = self.inner.connection.lock().take() else {
            return false;
        };
        connection.cancel.cancel();
        true
    }

    /// Serialize and write `message` if and only if the connection is open.
    ///
    /// Silently drops the message otherwise: no queueing, no error. Callers
    /// must not assume delivery while disconnected.
    pub fn send_message(&self, message: &RequestMessage) {
        let guard = self.inner.connection.lock();
        let Some(connection) = guard.as_ref() else {
            trace!(path = %message.path, "dropping message, no connection");
            return;
        };
        if !self.inner.connected.load(Ordering::Acquire) {
            trace!(path = %message.path, "dropping message, not connected");
            return;
        }
        match serde_json::to_string(message) {
            Ok(text) => {
                debug!(%text, "send");
                let _ = connection.outbound.send(Message::Text(text.into()));
            }
            Err(error) => warn!(%error, "failed to serialize request"),
        }
    }

    /// Register a message listener; fan-out preserves registration order.
    pub fn add_message_listener(&self, callback: MessageCallback) -> ListenerId {
        let id = self.next_id();
        self.inner.message_listeners.write().push((id, callback));
        id
    }

    /// Remove a message listener. No-op if the id is not registered.
    pub fn remove_message_listener(&self, id: ListenerId) {
        self.inner
            .message_listeners
            .write()
            .retain(|(listener, _)| *listener != id);
    }

    /// Register a connection-state listener.
    pub fn add_connection_state_listener(&self, callback: ConnectionCallback) -> ListenerId {
        let id = self.next_id();
        self.inner.state_listeners.write().push((id, callback));
        id
    }

    /// Remove a connection-state listener. No-op if the id is not registered.
    pub fn remove_connection_state_listener(&self, id: ListenerId) {
        self.inner
            .state_listeners
            .write()
            .retain(|(listener, _)| *listener != id);
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// True while no later `connect` has superseded `generation`.
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Store the connected flag on behalf of the task owning `generation`.
    ///
    /// Returns `false` without storing when the task has been superseded;
    /// the caller must then also skip its state notification. Serialized
    /// with [`Transport::connect`] through the connection lock.
    fn set_connected(&self, generation: u64, connected: bool) -> bool {
        let _guard = self.connection.lock();
        if !self.is_current(generation) {
            return false;
        }
        self.connected.store(connected, Ordering::Release);
        true
    }

    fn notify_state(&self, connected: bool) {
        for (_, callback) in self.state_listeners.read().iter() {
            callback(connected);
        }
    }

    fn dispatch_text(&self, text: &str) {
        debug!(%text, "receive");
        match serde_json::from_str::<ResponseMessage>(text) {
            Ok(message) => {
                for (_, callback) in self.message_listeners.read().iter() {
                    callback(&message);
                }
            }
            // Unrecognized types and malformed payloads must never take
            // down the dispatch loop.
            Err(error) => warn!(%error, "ignoring unparseable message"),
        }
    }
}

/// Connection task: opens the socket, then pumps outbound and inbound
/// frames until cancelled or the peer goes away.
async fn run_connection(
    inner: Arc<Inner>,
    url: String,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    cancel: CancellationToken,
    generation: u64,
) {
    let ws = tokio::select! {
        () = cancel.cancelled() => return,
        result = connect_async(&url) => match result {
            Ok((ws, _)) => ws,
            Err(error) => {
                warn!(%url, %error, "connection failed");
                if inner.is_current(generation) {
                    inner.notify_state(false);
                }
                return;
            }
        },
    };

    if !inner.set_connected(generation, true) {
        // superseded during the handshake; the socket is abandoned
        return;
    }
    inner.notify_state(true);

    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                // 1000 is the value for normal closure
                let close = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "".into(),
                };
                let _ = sink.send(Message::Close(Some(close))).await;
                break;
            }
            outgoing = outbound.recv() => {
                let Some(outgoing) = outgoing else { break };
                if sink.send(outgoing).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => inner.dispatch_text(&text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    warn!(%error, "connection error");
                    break;
                }
            },
        }
    }

    // A task superseded mid-pump must not clear the flag: it belongs to
    // the replacement connection by now.
    if inner.set_connected(generation, false) {
        inner.notify_state(false);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn disconnect_without_connection_returns_false() {
        let transport = Transport::new();
        assert!(!transport.disconnect());
        assert!(!transport.disconnect());
    }

    #[test]
    fn send_message_without_connection_is_dropped() {
        let transport = Transport::new();
        transport.send_message(&RequestMessage::get("/input/1"));
    }

    #[test]
    fn dispatch_fans_out_in_registration_order() {
        let transport = Transport::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            let _ = transport.add_message_listener(Box::new(move |_| {
                order.lock().push(tag);
            }));
        }

        transport.inner.dispatch_text(
            r#"{"type":"input_removed","request_id":null,"request_path":null,"response":1}"#,
        );
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn removed_listener_is_not_invoked() {
        let transport = Transport::new();
        let calls = Arc::new(Mutex::new(0u32));

        let counted = {
            let calls = Arc::clone(&calls);
            transport.add_message_listener(Box::new(move |_| *calls.lock() += 1))
        };
        transport.remove_message_listener(counted);
        // removing again is a no-op
        transport.remove_message_listener(counted);

        transport.inner.dispatch_text(
            r#"{"type":"input_removed","request_id":null,"request_path":null,"response":1}"#,
        );
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn malformed_and_unknown_messages_are_ignored() {
        let transport = Transport::new();
        let calls = Arc::new(Mutex::new(0u32));
        {
            let calls = Arc::clone(&calls);
            let _ = transport.add_message_listener(Box::new(move |_| *calls.lock() += 1));
        }

        transport.inner.dispatch_text("this is not json");
        transport.inner.dispatch_text(r#"{"type":"celestial_alignment","response":{}}"#);
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn superseded_task_cannot_flip_connection_state() {
        let transport = Transport::new();
        let inner = &transport.inner;

        let first = inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let second = inner.generation.fetch_add(1, Ordering::AcqRel) + 1;

        // the replacement connection opens
        assert!(inner.set_connected(second, true));
        assert!(transport.is_connected());

        // the older task winds down late; its store must be skipped
        assert!(!inner.set_connected(first, false));
        assert!(transport.is_connected());
        assert!(!inner.is_current(first));

        // the current task still owns the flag
        assert!(inner.set_connected(second, false));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn failed_connect_notifies_disconnected() {
        let transport = Transport::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _ = transport.add_connection_state_listener(Box::new(move |connected| {
            let _ = tx.send(connected);
        }));

        // nothing listens on port 1
        transport.connect("127.0.0.1", 1);

        let state = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for state change");
        assert_eq!(state, Some(false));
        assert!(!transport.is_connected());
    }
}
