use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Static node configuration captured when the node is deployed.
///
/// Immutable for the lifetime of the node and shared by every invocation.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    // credentials
    pub client_secret: Option<String>,
    pub api_key: Option<String>,
    pub token: Option<String>,

    // sender identity
    pub from: Option<String>,
    pub author: Option<String>,
    pub app_company_id: Option<String>,

    // default message fields
    pub to: Option<String>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub file_url: Option<String>,
    pub media_url: Option<String>,
    pub button_title: Option<String>,
    pub url: Option<String>,
    pub message_id: Option<String>,
    pub template_name: Option<String>,
    pub language: Option<String>,
    pub subject_push: Option<String>,
    pub content_push: Option<String>,

    // structured fields, a JSON string or an already decoded list
    pub components: Option<Value>,
    pub buttons: Option<Value>,
    pub action_push: Option<Value>,
    pub userids: Option<Value>,

    // endpoint overrides
    pub api_url: Option<String>,
    pub api_auth_url: Option<String>,
    pub api_push_url: Option<String>,
}

impl fmt::Debug for NodeConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("NodeConfig")
            .field("client_secret", &redact(&self.client_secret))
            .field("api_key", &redact(&self.api_key))
            .field("token", &redact(&self.token))
            .field("from", &self.from)
            .field("author", &self.author)
            .field("app_company_id", &self.app_company_id)
            .field("to", &self.to)
            .field("api_url", &self.api_url)
            .field("api_auth_url", &self.api_auth_url)
            .field("api_push_url", &self.api_push_url)
            .finish_non_exhaustive()
    }
}
