//! Engine — owner of the canonical mirror.
//!
//! The engine registers itself on the transport and is the mirror's only
//! writer. Inbound messages mutate the mirror through
//! [`tokio::sync::watch::Sender::send_modify`], so readers observe each
//! message fully applied or not at all, never a partial merge. Error
//! responses never touch the mirror; they fan out on a broadcast channel
//! instead.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::warn;

use patchwire_core::product::Product;
use patchwire_core::request::RequestMessage;
use patchwire_core::response::ResponseMessage;
use serde_json::Value;

use crate::http::fetch_product;
use crate::mirror::Mirror;
use crate::subscriptions::Subscriptions;
use crate::transport::{ListenerId, Transport};

/// Capacity of the error broadcast channel. Slow consumers lag and lose
/// the oldest events rather than blocking the dispatch path.
const ERROR_CHANNEL_CAPACITY: usize = 64;

/// A server-reported request failure, correlated to the offending request
/// where the server echoed it back.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorEvent {
    /// Id of the failed request, if the server echoed one.
    pub request_id: Option<i64>,
    /// Path of the failed request, if the server echoed one.
    pub request_path: Option<String>,
    /// Human-readable description from the server.
    pub message: String,
}

/// The state-synchronization engine.
///
/// Composes a [`Transport`] and a [`Subscriptions`] table around the
/// single writable [`Mirror`]. Consumers read through
/// [`Engine::mirror`] and are woken on every applied change.
pub struct Engine {
    transport: Arc<Transport>,
    subscriptions: Subscriptions<Arc<Transport>>,
    mirror: Arc<watch::Sender<Mirror>>,
    errors: broadcast::Sender<ErrorEvent>,
    message_listener: ListenerId,
    state_listener: ListenerId,
}

impl Engine {
    /// Create an engine with an empty mirror and no connection.
    #[must_use]
    pub fn new() -> Self {
        let transport = Arc::new(Transport::new());
        let subscriptions = Subscriptions::new(Arc::clone(&transport));
        let (mirror_tx, _mirror_rx) = watch::channel(Mirror::default());
        let mirror = Arc::new(mirror_tx);
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);

        let message_listener = {
            let mirror = Arc::clone(&mirror);
            let errors = errors.clone();
            transport.add_message_listener(Box::new(move |message| {
                if let ResponseMessage::Error {
                    correlation,
                    response,
                } = message
                {
                    let event = ErrorEvent {
                        request_id: correlation.request_id,
                        request_path: correlation.request_path.clone(),
                        message: describe_error(response),
                    };
                    warn!(
                        request_id = ?event.request_id,
                        request_path = ?event.request_path,
                        message = %event.message,
                        "server reported an error"
                    );
                    let _ = errors.send(event);
                    return;
                }
                mirror.send_modify(|state| state.apply(message));
            }))
        };

        let state_listener = {
            let mirror = Arc::clone(&mirror);
            let endpoint_source = Arc::clone(&transport);
            transport.add_connection_state_listener(Box::new(move |connected| {
                if connected {
                    mirror.send_modify(|state| state.connected = true);
                    let (host, port) = endpoint_source.endpoint();
                    let mirror = Arc::clone(&mirror);
                    let _ = tokio::spawn(async move {
                        match fetch_product(&host, port).await {
                            Ok(product) => store_product(&mirror, product),
                            Err(error) => warn!(%error, "product fetch failed"),
                        }
                    });
                } else {
                    mirror.send_modify(|state| {
                        state.connected = false;
                        state.invalidate();
                    });
                }
            }))
        };

        Self {
            transport,
            subscriptions,
            mirror,
            errors,
            message_listener,
            state_listener,
        }
    }

    /// Open a connection to `host:port`, replacing any existing one.
    pub fn connect(&self, host: &str, port: u16) {
        self.transport.connect(host, port);
    }

    /// Re-connect to the last used host and port. The server re-pushes the
    /// full state on a fresh connection, so the mirror converges without a
    /// client-driven fetch.
    pub fn reconnect(&self) {
        self.transport.reconnect();
    }

    /// Close the connection, if one is open. Returns whether one existed.
    pub fn disconnect(&self) -> bool {
        self.transport.disconnect()
    }

    /// Whether the connection is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// A receiver over the mirror. Each receiver observes the latest
    /// fully-applied state; intermediate states may be skipped under load.
    #[must_use]
    pub fn mirror(&self) -> watch::Receiver<Mirror> {
        self.mirror.subscribe()
    }

    /// A receiver for server-reported request failures.
    #[must_use]
    pub fn errors(&self) -> broadcast::Receiver<ErrorEvent> {
        self.errors.subscribe()
    }

    /// Register one more observer for input `id`.
    pub fn subscribe(&self, id: u64) {
        self.subscriptions.subscribe(id);
    }

    /// Drop one observer for input `id`.
    pub fn unsubscribe(&self, id: u64) {
        self.subscriptions.unsubscribe(id);
    }

    /// Current observer count for input `id`.
    #[must_use]
    pub fn subscriber_count(&self, id: u64) -> u32 {
        self.subscriptions.count(id)
    }

    /// Send a raw request towards the server (best effort).
    pub fn send_message(&self, message: &RequestMessage) {
        self.transport.send_message(message);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // The listeners hold an Arc back to the transport; unregistering
        // them breaks the cycle so everything can be freed.
        self.transport.remove_message_listener(self.message_listener);
        self.transport
            .remove_connection_state_listener(self.state_listener);
        let _ = self.transport.disconnect();
    }
}

/// Deposit a fetched product into the mirror.
///
/// The fetch runs concurrently with the connection; if the connection went
/// away while it was in flight, the result is stale and the invalidated
/// mirror must stay at defaults.
fn store_product(mirror: &watch::Sender<Mirror>, product: Product) {
    mirror.send_modify(|state| {
        if state.connected {
            state.product = product;
        }
    });
}

/// Render a server error payload as display text. Plain strings pass
/// through verbatim; structured payloads are rendered as JSON.
fn describe_error(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
