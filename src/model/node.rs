use serde::{Deserialize, Serialize};

use crate::{NotiflowError, Result, common::Vars};

/// Node definition as exported by the flow editor.
///
/// Every field other than `id`, `type` and `name` is node configuration and is
/// kept in `fields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeModel {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: Vars,
}

impl NodeModel {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<NodeModel>(s).map_err(|e| NotiflowError::Node(format!("{}", e)))
    }
}
