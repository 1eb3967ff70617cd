//! Requests sent to the server.
//!
//! Requests address resources by path (`/input/{id}`,
//! `/input/{id}/trigger/{instance}`) and carry an action plus optional
//! values. The optional `id` lets the server correlate `error` responses
//! back to the request that caused them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The actions that can be performed on a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    /// Read the resource.
    Get,
    /// Write new values to the resource.
    Put,
    /// Fire a trigger instance.
    Trigger,
    /// Start receiving push updates for the resource.
    Subscribe,
    /// Stop receiving push updates for the resource.
    Unsubscribe,
}

/// A request message sent over the duplex connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Correlation id echoed back in responses; omitted when not needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// The action to perform.
    pub action: RequestAction,
    /// Resource path, e.g. `/input/3`.
    pub path: String,
    /// New values for `put` requests; omitted otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl RequestMessage {
    fn new(action: RequestAction, path: impl Into<String>) -> Self {
        Self {
            id: None,
            action,
            path: path.into(),
            values: None,
        }
    }

    /// Build a `get` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(RequestAction::Get, path)
    }

    /// Build a `put` request carrying new values.
    #[must_use]
    pub fn put(path: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            values: Some(values),
            ..Self::new(RequestAction::Put, path)
        }
    }

    /// Build a `trigger` request.
    #[must_use]
    pub fn trigger(path: impl Into<String>) -> Self {
        Self::new(RequestAction::Trigger, path)
    }

    /// Build a `subscribe` request.
    #[must_use]
    pub fn subscribe(path: impl Into<String>) -> Self {
        Self::new(RequestAction::Subscribe, path)
    }

    /// Build an `unsubscribe` request.
    #[must_use]
    pub fn unsubscribe(path: impl Into<String>) -> Self {
        Self::new(RequestAction::Unsubscribe, path)
    }

    /// Attach a correlation id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Path of an input resource.
#[must_use]
pub fn input_path(id: u64) -> String {
    format!("/input/{id}")
}

/// Path of a single trigger instance on an input.
#[must_use]
pub fn trigger_path(id: u64, instance: u32) -> String {
    format!("/input/{id}/trigger/{instance}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscribe_omits_optional_fields() {
        let msg = RequestMessage::subscribe(input_path(5));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({ "action": "subscribe", "path": "/input/5" })
        );
    }

    #[test]
    fn put_carries_values() {
        let msg = RequestMessage::put(input_path(2), vec![json!(0.5), json!(1.0)]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["action"], "put");
        assert_eq!(json["path"], "/input/2");
        assert_eq!(json["values"], json!([0.5, 1.0]));
        assert!(json.get("id").is_none());
    }

    #[test]
    fn with_id_serializes_correlation_id() {
        let msg = RequestMessage::get(input_path(1)).with_id(42);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["id"], 42);
    }

    #[test]
    fn trigger_path_addresses_instance() {
        assert_eq!(trigger_path(9, 3), "/input/9/trigger/3");
        let msg = RequestMessage::trigger(trigger_path(9, 3));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["action"], "trigger");
        assert_eq!(json["path"], "/input/9/trigger/3");
    }

    #[test]
    fn action_wire_names() {
        let pairs = [
            (RequestAction::Get, "get"),
            (RequestAction::Put, "put"),
            (RequestAction::Trigger, "trigger"),
            (RequestAction::Subscribe, "subscribe"),
            (RequestAction::Unsubscribe, "unsubscribe"),
        ];
        for (action, name) in pairs {
            assert_eq!(serde_json::to_value(action).unwrap(), json!(name));
        }
    }
}
