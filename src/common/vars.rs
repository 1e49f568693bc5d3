use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object of named values.
///
/// Used as the override view of an inbound message payload and as the raw
/// field set of a node definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vars {
    inner: Map<String, Value>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_value(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Get a scalar value as text. Numbers and booleans are stringified;
    /// empty strings, null and structured values are treated as absent.
    pub fn get_text(
        &self,
        key: &str,
    ) -> Option<String> {
        match self.inner.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Vars {
    fn from(inner: Map<String, Value>) -> Self {
        Self {
            inner,
        }
    }
}

/// Non-object values carry no named fields and convert to empty vars.
impl From<Value> for Vars {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(inner) => Self {
                inner,
            },
            _ => Self::new(),
        }
    }
}

impl From<Vars> for Value {
    fn from(vars: Vars) -> Self {
        Value::Object(vars.inner)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_get_text_stringifies_scalars() {
        let vars = Vars::from(json!({"to": "A", "text": "", "phone": 5511999990000u64, "flag": true, "list": [1], "none": null}));
        assert_eq!(vars.get_text("to").as_deref(), Some("A"));
        assert_eq!(vars.get_text("text"), None);
        assert_eq!(vars.get_text("phone").as_deref(), Some("5511999990000"));
        assert_eq!(vars.get_text("flag").as_deref(), Some("true"));
        assert_eq!(vars.get_text("list"), None);
        assert_eq!(vars.get_text("none"), None);
        assert_eq!(vars.get_value("phone"), Some(&json!(5511999990000u64)));
    }

    #[test]
    fn test_non_object_value_is_empty() {
        assert_eq!(Vars::from(json!("plain string")), Vars::new());
        assert_eq!(Value::from(Vars::from(json!([1, 2]))), json!({}));
    }
}
