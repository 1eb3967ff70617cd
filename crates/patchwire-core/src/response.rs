//! Responses and events pushed by the server.
//!
//! Every message from the server is a JSON object tagged by `type`. Some
//! types answer an earlier request (and echo its id/path in the correlation
//! fields), others are pushed spontaneously when server-side state changes.
//!
//! Unknown tags fail to parse; the transport logs and drops them so an
//! unrecognized message never takes down the dispatch loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::input::{Input, InputGroup, InputNode};
use crate::patch::Patch;

/// Correlation fields echoed from the originating request.
///
/// Both fields are `null` for spontaneous pushes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    /// Id of the originating request, if any.
    #[serde(default)]
    pub request_id: Option<i64>,
    /// Path of the originating request, if any.
    #[serde(default)]
    pub request_path: Option<String>,
}

/// A message received from the server.
///
/// The `type` tag determines the shape of `response`. The mirror effects of
/// each variant are applied by the client's reconciler; the variants with a
/// `Value` payload are informational and never mutate the mirror.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseMessage {
    /// Full patch metadata (initial push or after a program change).
    GetPatch {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The new patch, replacing the mirrored one wholesale.
        response: Patch,
    },

    /// The ids of all top-level inputs, without their data.
    GetInputIds {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// Top-level ids in display order.
        response: Vec<u64>,
    },

    /// Full snapshot of the input collection (initial sync or resync).
    GetInputs {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The complete ordered collection.
        response: Vec<InputNode>,
    },

    /// A single input, answering a `get` request.
    GetInput {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The input, replacing the element with the same id.
        response: Input,
    },

    /// A subscribed input changed on the server.
    UpdateInput {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The input, replacing the element with the same id.
        response: Input,
    },

    /// Subscription confirmed; carries the input's current state.
    InputSubscribed {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The input, replacing the element with the same id.
        response: Input,
    },

    /// Unsubscription confirmed.
    InputUnsubscribed {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// Informational payload.
        #[serde(default)]
        response: Value,
    },

    /// A trigger instance fired.
    InputTriggered {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// Informational payload.
        #[serde(default)]
        response: Value,
    },

    /// A new input appeared at the end of the collection.
    InputAdded {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The appended input.
        response: Input,
    },

    /// An input disappeared from the collection.
    InputRemoved {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// Id of the removed input.
        response: u64,
    },

    /// The collection was restructured or reordered.
    ///
    /// The server never sends a delta: any structural or order change
    /// arrives as a complete re-snapshot.
    InputsReordered {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The complete ordered collection.
        response: Vec<InputNode>,
    },

    /// A new group appeared at the end of the collection.
    InputGroupAdded {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The appended group.
        response: InputGroup,
    },

    /// A group disappeared from the collection.
    InputGroupRemoved {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// Id of the removed group.
        response: u64,
    },

    /// A group was renamed (position preserved).
    InputGroupRenamed {
        /// Correlation fields.
        #[serde(flatten)]
        correlation: Correlation,
        /// The group, replacing the element with the same id.
        response: InputGroup,
    },

    /// A request failed on the server.
    Error {
        /// Correlation fields identifying the failed request.
        #[serde(flatten)]
        correlation: Correlation,
        /// Error details.
        #[serde(default)]
        response: Value,
    },
}

impl ResponseMessage {
    /// The wire `type` tag (for logging and diagnostics).
    #[must_use]
    pub fn response_type(&self) -> &'static str {
        match self {
            Self::GetPatch { .. } => "get_patch",
            Self::GetInputIds { .. } => "get_input_ids",
            Self::GetInputs { .. } => "get_inputs",
            Self::GetInput { .. } => "get_input",
            Self::UpdateInput { .. } => "update_input",
            Self::InputSubscribed { .. } => "input_subscribed",
            Self::InputUnsubscribed { .. } => "input_unsubscribed",
            Self::InputTriggered { .. } => "input_triggered",
            Self::InputAdded { .. } => "input_added",
            Self::InputRemoved { .. } => "input_removed",
            Self::InputsReordered { .. } => "inputs_reordered",
            Self::InputGroupAdded { .. } => "input_group_added",
            Self::InputGroupRemoved { .. } => "input_group_removed",
            Self::InputGroupRenamed { .. } => "input_group_renamed",
            Self::Error { .. } => "error",
        }
    }

    /// The correlation fields.
    #[must_use]
    pub fn correlation(&self) -> &Correlation {
        match self {
            Self::GetPatch { correlation, .. }
            | Self::GetInputIds { correlation, .. }
            | Self::GetInputs { correlation, .. }
            | Self::GetInput { correlation, .. }
            | Self::UpdateInput { correlation, .. }
            | Self::InputSubscribed { correlation, .. }
            | Self::InputUnsubscribed { correlation, .. }
            | Self::InputTriggered { correlation, .. }
            | Self::InputAdded { correlation, .. }
            | Self::InputRemoved { correlation, .. }
            | Self::InputsReordered { correlation, .. }
            | Self::InputGroupAdded { correlation, .. }
            | Self::InputGroupRemoved { correlation, .. }
            | Self::InputGroupRenamed { correlation, .. }
            | Self::Error { correlation, .. } => correlation,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
