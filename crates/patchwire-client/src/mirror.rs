//! The mirror — the client's reconciled local copy of server state.
//!
//! Merge rules, applied in arrival order (last write wins per id):
//!
//! - `get_patch` / `get_inputs` / `inputs_reordered` replace wholesale —
//!   the protocol sends full re-snapshots for structural changes, never
//!   deltas, and the client must not try to merge them incrementally
//! - `get_input` / `update_input` / `input_subscribed` /
//!   `input_group_renamed` replace the matching top-level element in
//!   place; unknown ids leave the mirror unchanged (no insertion)
//! - `input_added` / `input_group_added` append
//! - `input_removed` / `input_group_removed` drop by id (no-op if absent)
//! - everything else leaves the mirror untouched

use serde::Serialize;

use patchwire_core::input::InputNode;
use patchwire_core::patch::Patch;
use patchwire_core::product::Product;
use patchwire_core::response::ResponseMessage;

/// The reconciled local copy of server state.
///
/// Invariants: top-level ids in `inputs` are unique, and element order
/// matches the server's last-declared order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Mirror {
    /// Static server identity, fetched once per connection.
    pub product: Product,
    /// Metadata of the currently loaded program.
    pub patch: Patch,
    /// The ordered collection of inputs and groups.
    pub inputs: Vec<InputNode>,
    /// Whether the duplex connection is currently open.
    pub connected: bool,
}

impl Mirror {
    /// Apply one inbound message under the merge rules above.
    pub fn apply(&mut self, message: &ResponseMessage) {
        match message {
            ResponseMessage::GetPatch { response, .. } => {
                self.patch = response.clone();
            }
            ResponseMessage::GetInputs { response, .. }
            | ResponseMessage::InputsReordered { response, .. } => {
                self.inputs = response.clone();
            }
            ResponseMessage::GetInput { response, .. }
            | ResponseMessage::UpdateInput { response, .. }
            | ResponseMessage::InputSubscribed { response, .. } => {
                self.replace(InputNode::Input(response.clone()));
            }
            ResponseMessage::InputAdded { response, .. } => {
                self.inputs.push(InputNode::Input(response.clone()));
            }
            ResponseMessage::InputGroupAdded { response, .. } => {
                self.inputs.push(InputNode::Group(response.clone()));
            }
            ResponseMessage::InputGroupRenamed { response, .. } => {
                self.replace(InputNode::Group(response.clone()));
            }
            ResponseMessage::InputRemoved { response, .. }
            | ResponseMessage::InputGroupRemoved { response, .. } => {
                self.inputs.retain(|node| node.id() != *response);
            }
            ResponseMessage::GetInputIds { .. }
            | ResponseMessage::InputUnsubscribed { .. }
            | ResponseMessage::InputTriggered { .. }
            | ResponseMessage::Error { .. } => {}
        }
    }

    /// Replace the top-level element with the same id, preserving position.
    /// Unknown ids are left unchanged — never an insertion.
    fn replace(&mut self, node: InputNode) {
        if let Some(existing) = self
            .inputs
            .iter_mut()
            .find(|existing| existing.id() == node.id())
        {
            *existing = node;
        }
    }

    /// Hard invalidation on disconnect: product, patch and inputs revert to
    /// defaults. The mirror carries no state across a connection loss.
    pub fn invalidate(&mut self) {
        self.product = Product::default();
        self.patch = Patch::default();
        self.inputs.clear();
    }

    /// Look up a top-level element by id.
    #[must_use]
    pub fn input(&self, id: u64) -> Option<&InputNode> {
        self.inputs.iter().find(|node| node.id() == id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use patchwire_core::input::{DataType, Flow, Input, InputGroup};
    use patchwire_core::response::Correlation;
    use serde_json::{Value, json};

    fn input(id: u64, name: &str, values: Vec<Value>) -> Input {
        Input {
            id,
            name: name.to_string(),
            semantic: String::new(),
            flow: Flow::Signal,
            datatype: DataType::Bool,
            instance_count: 0,
            min: None,
            max: None,
            choices: None,
            values,
        }
    }

    fn snapshot(inputs: Vec<InputNode>) -> ResponseMessage {
        ResponseMessage::GetInputs {
            correlation: Correlation::default(),
            response: inputs,
        }
    }

    fn ids(mirror: &Mirror) -> Vec<u64> {
        mirror.inputs.iter().map(InputNode::id).collect()
    }

    #[test]
    fn get_inputs_replaces_wholesale() {
        let mut mirror = Mirror {
            inputs: vec![InputNode::Input(input(99, "stale", vec![]))],
            ..Mirror::default()
        };
        mirror.apply(&snapshot(vec![
            InputNode::Input(input(1, "a", vec![])),
            InputNode::Input(input(2, "b", vec![])),
        ]));
        assert_eq!(ids(&mirror), vec![1, 2]);
    }

    #[test]
    fn get_patch_replaces_wholesale() {
        let mut mirror = Mirror::default();
        let patch: Patch = serde_json::from_value(json!({
            "display_name": "Kaleidoscope",
            "category": "effect"
        }))
        .unwrap();
        mirror.apply(&ResponseMessage::GetPatch {
            correlation: Correlation::default(),
            response: patch,
        });
        assert_eq!(mirror.patch.display_name, "Kaleidoscope");
    }

    #[test]
    fn update_replaces_only_matching_element_preserving_order() {
        let mut mirror = Mirror::default();
        mirror.apply(&snapshot(vec![
            InputNode::Input(input(1, "a", vec![json!(false)])),
            InputNode::Input(input(2, "b", vec![json!(false)])),
            InputNode::Input(input(3, "c", vec![json!(false)])),
        ]));

        mirror.apply(&ResponseMessage::UpdateInput {
            correlation: Correlation::default(),
            response: input(2, "b", vec![json!(true)]),
        });

        assert_eq!(ids(&mirror), vec![1, 2, 3]);
        let InputNode::Input(updated) = mirror.input(2).unwrap() else {
            panic!("expected input");
        };
        assert_eq!(updated.values, vec![json!(true)]);
        let InputNode::Input(untouched) = mirror.input(1).unwrap() else {
            panic!("expected input");
        };
        assert_eq!(untouched.values, vec![json!(false)]);
    }

    #[test]
    fn update_for_unknown_id_is_a_noop() {
        let mut mirror = Mirror::default();
        mirror.apply(&snapshot(vec![InputNode::Input(input(1, "a", vec![]))]));
        mirror.apply(&ResponseMessage::UpdateInput {
            correlation: Correlation::default(),
            response: input(42, "ghost", vec![]),
        });
        assert_eq!(ids(&mirror), vec![1]);
    }

    #[test]
    fn remove_is_idempotent_for_unknown_ids() {
        let mut mirror = Mirror::default();
        mirror.apply(&snapshot(vec![InputNode::Input(input(1, "a", vec![]))]));

        let remove = ResponseMessage::InputRemoved {
            correlation: Correlation::default(),
            response: 42,
        };
        mirror.apply(&remove);
        mirror.apply(&remove);
        assert_eq!(ids(&mirror), vec![1]);
    }

    #[test]
    fn added_inputs_and_groups_append_at_the_end() {
        let mut mirror = Mirror::default();
        mirror.apply(&snapshot(vec![InputNode::Input(input(1, "a", vec![]))]));
        mirror.apply(&ResponseMessage::InputAdded {
            correlation: Correlation::default(),
            response: input(2, "b", vec![]),
        });
        mirror.apply(&ResponseMessage::InputGroupAdded {
            correlation: Correlation::default(),
            response: InputGroup {
                id: 3,
                name: "fx".to_string(),
                inputs: vec![],
            },
        });
        assert_eq!(ids(&mirror), vec![1, 2, 3]);
        assert!(mirror.inputs[2].is_group());
    }

    #[test]
    fn group_rename_preserves_position() {
        let mut mirror = Mirror::default();
        mirror.apply(&snapshot(vec![
            InputNode::Input(input(1, "a", vec![])),
            InputNode::Group(InputGroup {
                id: 2,
                name: "old".to_string(),
                inputs: vec![],
            }),
            InputNode::Input(input(3, "c", vec![])),
        ]));

        mirror.apply(&ResponseMessage::InputGroupRenamed {
            correlation: Correlation::default(),
            response: InputGroup {
                id: 2,
                name: "new".to_string(),
                inputs: vec![],
            },
        });

        assert_eq!(ids(&mirror), vec![1, 2, 3]);
        assert_eq!(mirror.inputs[1].name(), "new");
    }

    #[test]
    fn reorder_is_a_full_resnapshot_and_later_updates_win() {
        let mut mirror = Mirror::default();
        mirror.apply(&snapshot(vec![
            InputNode::Input(input(1, "a", vec![json!(false)])),
            InputNode::Input(input(2, "b", vec![json!(false)])),
        ]));

        mirror.apply(&ResponseMessage::InputsReordered {
            correlation: Correlation::default(),
            response: vec![
                InputNode::Input(input(2, "b", vec![json!(false)])),
                InputNode::Input(input(1, "a", vec![json!(false)])),
            ],
        });
        assert_eq!(ids(&mirror), vec![2, 1]);

        // last write wins for the same id by arrival order
        mirror.apply(&ResponseMessage::UpdateInput {
            correlation: Correlation::default(),
            response: input(1, "a", vec![json!(true)]),
        });
        let InputNode::Input(updated) = mirror.input(1).unwrap() else {
            panic!("expected input");
        };
        assert_eq!(updated.values, vec![json!(true)]);
        assert_eq!(ids(&mirror), vec![2, 1]);
    }

    #[test]
    fn error_and_informational_messages_do_not_mutate() {
        let mut mirror = Mirror::default();
        mirror.apply(&snapshot(vec![InputNode::Input(input(1, "a", vec![]))]));
        let before = mirror.clone();

        mirror.apply(&ResponseMessage::Error {
            correlation: Correlation {
                request_id: Some(9),
                request_path: Some("/input/1".to_string()),
            },
            response: json!("boom"),
        });
        mirror.apply(&ResponseMessage::GetInputIds {
            correlation: Correlation::default(),
            response: vec![1],
        });
        mirror.apply(&ResponseMessage::InputTriggered {
            correlation: Correlation::default(),
            response: json!({ "instance": 0 }),
        });
        mirror.apply(&ResponseMessage::InputUnsubscribed {
            correlation: Correlation::default(),
            response: Value::Null,
        });

        assert_eq!(mirror, before);
    }

    #[test]
    fn invalidate_resets_everything_but_keeps_connected_flag() {
        let mut mirror = Mirror {
            connected: true,
            ..Mirror::default()
        };
        mirror.apply(&snapshot(vec![InputNode::Input(input(1, "a", vec![]))]));
        mirror.product.name = "Wire".to_string();
        mirror.patch.display_name = "Blur".to_string();

        mirror.invalidate();

        assert_eq!(mirror.product, Product::default());
        assert_eq!(mirror.patch, Patch::default());
        assert!(mirror.inputs.is_empty());
        assert!(mirror.connected);
    }

    #[test]
    fn full_session_scenario() {
        // empty → snapshot → update → disconnect
        let mut mirror = Mirror::default();
        assert!(mirror.inputs.is_empty());

        mirror.connected = true;
        mirror.apply(&snapshot(vec![InputNode::Input(input(
            1,
            "bypass",
            vec![json!(false)],
        ))]));
        assert_eq!(ids(&mirror), vec![1]);

        mirror.apply(&ResponseMessage::UpdateInput {
            correlation: Correlation::default(),
            response: input(1, "bypass", vec![json!(true)]),
        });
        let InputNode::Input(updated) = &mirror.inputs[0] else {
            panic!("expected input");
        };
        assert_eq!(updated.values, vec![json!(true)]);

        mirror.connected = false;
        mirror.invalidate();
        assert!(mirror.inputs.is_empty());
        assert_eq!(mirror.patch, Patch::default());
        assert_eq!(mirror.product, Product::default());
    }
}
