use std::str::FromStr;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde_json::Value;

use crate::{
    NotiflowError, Result,
    common::Vars,
    events::{LogLevel, NodeStatus},
    http::{AuthScheme, CONTENT_TYPE_JSON, HttpRequest, RequestBody, insert_header},
    nodes::{
        NodeConfig, NodeType,
        actions::{Action, base_schema, decode_fields},
        resolver::{EffectiveRequest, Field},
    },
    runtime::Context,
};

use super::{models::MessageKind, payload::build_payload};

/// One send to the whatsapp-style messaging endpoint. Covers every shape of
/// the family; the shape comes from the node type.
#[derive(Debug, Clone)]
pub struct WhatsappAction {
    node_type: NodeType,
    kind: MessageKind,
}

impl WhatsappAction {
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    fn headers(
        &self,
        request: &EffectiveRequest,
    ) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "content-type", CONTENT_TYPE_JSON)?;
        insert_header(&mut headers, "accept", "application/json")?;

        let token = request.require(Field::Token)?;
        let auth = self.kind.auth_scheme().header_value(request.get(Field::ApiKey), token)?;
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    fn endpoint<'a>(
        &self,
        ctx: &'a Context,
    ) -> &'a str {
        ctx.node_config()
            .api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(ctx.settings().whatsapp.messages_url.as_str())
    }
}

fn message_kind(node_type: NodeType) -> Result<MessageKind> {
    node_type
        .message_kind()
        .ok_or_else(|| NotiflowError::Node(format!("'{}' is not a whatsapp node", node_type.as_ref())))
}

#[async_trait]
impl Action for WhatsappAction {
    fn create(
        node_type: NodeType,
        fields: &Vars,
    ) -> Result<Self> {
        let kind = message_kind(node_type)?;
        let _: NodeConfig = decode_fields(&Self::schema(node_type), fields)?;
        Ok(Self {
            node_type,
            kind,
        })
    }

    fn schema(node_type: NodeType) -> Value {
        let basic = node_type.message_kind().map(|kind| kind.auth_scheme()) == Some(AuthScheme::Basic);
        if basic {
            base_schema(&["token", "apiKey"])
        } else {
            base_schema(&["token"])
        }
    }

    fn node_type(&self) -> NodeType {
        self.node_type
    }

    fn sent_label(&self) -> &'static str {
        match self.kind {
            MessageKind::MarkAsRead => "marked as read",
            _ => "sent",
        }
    }

    async fn run(
        &self,
        ctx: &mut Context,
    ) -> Result<Value> {
        ctx.resolve(&self.kind.fields())?;

        let request = ctx.request()?;
        let body = build_payload(self.kind, request)?;
        let headers = self.headers(request)?;
        let url = self.endpoint(ctx).to_string();

        ctx.status(NodeStatus::progress("sending"));
        ctx.log(LogLevel::Debug, format!("sending {} message to {}", self.kind.as_ref(), url));

        let response = ctx.dispatcher().send(HttpRequest::post(&url, headers, RequestBody::Json(body))).await?;
        if response.body.is_raw() {
            ctx.log(LogLevel::Warn, "response was a non-JSON string, forwarding it raw");
        }
        ctx.log(LogLevel::Info, format!("{} message sent, status {}", self.kind.as_ref(), response.status));

        Ok(response.body.into_value())
    }
}

impl FromStr for WhatsappAction {
    type Err = NotiflowError;

    /// Build an action from a node type string with no field validation.
    fn from_str(s: &str) -> Result<Self> {
        let node_type = NodeType::from_str(s).map_err(|_| NotiflowError::Node(format!("invalid node type: '{}'", s)))?;
        Ok(Self {
            node_type,
            kind: message_kind(node_type)?,
        })
    }
}
