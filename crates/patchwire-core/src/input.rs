//! Inputs and input groups — the server-owned parameter collection.
//!
//! An [`Input`] is a single controllable parameter. An [`InputGroup`] is a
//! named ordered container of inputs and/or nested groups. The server's
//! top-level collection mixes both, modeled here as [`InputNode`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commit timing semantics of an input.
///
/// Governs when a value change takes effect on the server:
/// immediately (`signal`), on explicit trigger (`event`), or when an
/// editing session ends (`attribute`, e.g. slider mouse-up).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// Value changes commit immediately.
    Signal,
    /// Value changes commit only on explicit trigger.
    Event,
    /// Value changes commit when the editing session ends.
    Attribute,
}

/// The data type carried by an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// No value, only triggerable instances.
    Trigger,
    /// Floating point value.
    Float,
    /// Integer value.
    Int,
    /// Boolean value.
    Bool,
    /// Text value.
    String,
    /// Color value.
    Color,
}

/// A single controllable parameter exposed by the remote engine.
///
/// `values` holds one entry per instance and is empty for pure triggers.
/// `min`/`max`/`choices` are optional constraints the presentation layer may
/// use; the engine itself never validates values against them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// Stable identity, unique within the current mirror.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Semantic hint for presentation.
    #[serde(default)]
    pub semantic: String,
    /// Commit timing semantics.
    pub flow: Flow,
    /// Value data type.
    pub datatype: DataType,
    /// Number of independently triggerable sub-instances.
    #[serde(default)]
    pub instance_count: u32,
    /// Optional lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    /// Optional upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    /// Ordered label → value mapping for enumerated inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<IndexMap<String, Value>>,
    /// One value per instance; empty for pure triggers.
    #[serde(default)]
    pub values: Vec<Value>,
}

/// A named ordered container of inputs and/or nested groups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputGroup {
    /// Stable identity, shares the id space with inputs.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Contained inputs and nested groups, in display order.
    pub inputs: Vec<InputNode>,
}

/// A top-level element of the mirrored collection.
///
/// Discriminated structurally: a group carries `inputs`, an input carries
/// `datatype`. The wire sends no explicit tag for this union.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputNode {
    /// A group of inputs.
    Group(InputGroup),
    /// A single input.
    Input(Input),
}

impl InputNode {
    /// The element's stable id.
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            Self::Group(group) => group.id,
            Self::Input(input) => input.id,
        }
    }

    /// The element's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Group(group) => &group.name,
            Self::Input(input) => &input.name,
        }
    }

    /// Whether this element is a group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
