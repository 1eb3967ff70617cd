//! # patchwire-client
//!
//! The client-side state-synchronization engine for a remote audio/visual
//! engine's parameter surface.
//!
//! Three components, composed leaf to root:
//!
//! - **[`Transport`]**: owns the single persistent duplex connection; knows
//!   nothing about message meaning. Exposes connect/disconnect/send and two
//!   listener registries (messages, connection state).
//! - **[`Subscriptions`]**: per-input reference counter above the transport;
//!   turns "N observers want input X" into exactly one subscribe/unsubscribe
//!   wire transition at 0→1 / 1→0.
//! - **[`Engine`]**: owner of the canonical [`Mirror`] (product, patch, the
//!   ordered input collection). Applies every inbound event under the
//!   protocol's merge rules and exposes the mirror as a watch channel —
//!   one writer, many readers, readers always see the latest fully-applied
//!   state.
//!
//! Data flows inward (transport → engine → mirror) and outward (consumer →
//! [`Engine::send_message`] → transport → wire); subscriptions are a side
//! channel driven by observer mount/unmount, not by data flow.

#![deny(unsafe_code)]

pub mod engine;
pub mod errors;
pub mod http;
pub mod mirror;
pub mod subscriptions;
pub mod transport;

pub use engine::{Engine, ErrorEvent};
pub use errors::ClientError;
pub use mirror::Mirror;
pub use subscriptions::{MessageSink, Subscriptions};
pub use transport::{ListenerId, Transport};
