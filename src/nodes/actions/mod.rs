pub mod mobilex;
pub mod whatsapp;

use async_trait::async_trait;
use serde_json::Value;

use crate::{Result, common::Vars, nodes::NodeType, runtime::Context};

pub use mobilex::MobilexPushAction;
pub use whatsapp::WhatsappAction;

#[async_trait]
pub trait Action: Send + Sync {
    /// Creates a new instance of the action from the node fields.
    ///
    /// # Arguments
    ///
    /// * `node_type` - The [`NodeType`] the action is created for.
    /// * `fields` - The raw node configuration as exported by the editor.
    ///
    /// # Returns
    ///
    /// Returns a [`Result`] containing the created action instance.
    fn create(
        node_type: NodeType,
        fields: &Vars,
    ) -> Result<Self>
    where
        Self: Sized;

    /// Returns the JSON schema the node fields are validated against.
    fn schema(node_type: NodeType) -> Value
    where
        Self: Sized;

    /// Returns the type of node this action implements.
    fn node_type(&self) -> NodeType;

    /// Status label shown after a successful send.
    fn sent_label(&self) -> &'static str {
        "sent"
    }

    /// Runs one invocation.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The per-invocation [`Context`].
    ///
    /// # Returns
    ///
    /// The response body of the send call, parsed when it is JSON and raw
    /// otherwise.
    async fn run(
        &self,
        ctx: &mut Context,
    ) -> Result<Value>;
}

/// Validate `fields` against `schema`, then decode them.
pub(crate) fn decode_fields<T: serde::de::DeserializeOwned>(
    schema: &Value,
    fields: &Vars,
) -> Result<T> {
    let instance: Value = fields.clone().into();
    jsonschema::validate(schema, &instance)?;
    Ok(serde_json::from_value::<T>(instance)?)
}

/// Schema shared by every node: known fields are strings, structured fields
/// may be a JSON string or a list. Unknown editor properties are allowed.
pub(crate) fn base_schema(required: &[&str]) -> Value {
    let text = serde_json::json!({ "type": ["string", "null"] });
    let list = serde_json::json!({ "type": ["string", "array", "null"] });
    serde_json::json!({
        "type": "object",
        "required": required,
        "properties": {
            "clientSecret": text, "apiKey": text, "token": text,
            "from": text, "author": text, "appCompanyId": text,
            "to": text, "text": text, "caption": text,
            "imageUrl": text, "videoUrl": text, "audioUrl": text, "fileUrl": text, "mediaUrl": text,
            "buttonTitle": text, "url": text, "messageId": text,
            "templateName": text, "language": text,
            "subjectPush": text, "contentPush": text,
            "components": list, "buttons": list, "actionPush": list, "userids": list,
            "apiUrl": text, "apiAuthUrl": text, "apiPushUrl": text
        }
    })
}
