use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::Vars;

/// Per-invocation message received by a node.
///
/// `payload` carries caller overrides; any other top-level properties
/// (`topic`, `_msgid`, ...) are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub payload: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InboundMessage {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            extra: Map::new(),
        }
    }

    /// Named overrides from the payload; empty when the payload is not an object.
    pub fn overrides(&self) -> Vars {
        Vars::from(self.payload.clone())
    }

    /// Forward this message with `payload` replaced by the response body.
    pub fn into_outcome(
        self,
        body: Value,
    ) -> OutcomeMessage {
        OutcomeMessage {
            payload: body,
            extra: self.extra,
        }
    }
}

/// Message forwarded downstream after a successful send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeMessage {
    pub payload: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_outcome_keeps_extra_properties() {
        let msg: InboundMessage = serde_json::from_value(json!({
            "payload": {"to": "A"},
            "topic": "alerts",
            "_msgid": "m-1"
        }))
        .unwrap();
        assert_eq!(msg.overrides().get_text("to").as_deref(), Some("A"));

        let outcome = msg.into_outcome(json!({"message_uuid": "u-1"}));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({"payload": {"message_uuid": "u-1"}, "topic": "alerts", "_msgid": "m-1"})
        );
    }

    #[test]
    fn test_missing_payload_has_no_overrides() {
        let msg: InboundMessage = serde_json::from_value(json!({"topic": "x"})).unwrap();
        assert_eq!(msg.payload, Value::Null);
        assert_eq!(msg.overrides(), Vars::new());
    }
}
