use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    NotiflowError, Result,
    common::Vars,
    events::{LogLevel, NodeStatus},
    http::{AuthScheme, CONTENT_TYPE_JSON, HttpRequest, RequestBody, insert_header},
    nodes::{
        NodeConfig, NodeType,
        actions::{Action, base_schema, decode_fields},
        resolver::Field,
    },
    runtime::Context,
};

use super::models::{PushPayload, push_fields};

const PUSH_ACCEPT: &str = "application/json, text/plain, */*";

/// Push notification: a client-credentials exchange followed by one send.
#[derive(Debug, Clone)]
pub struct MobilexPushAction;

impl MobilexPushAction {
    fn auth_url(ctx: &Context) -> String {
        non_empty(&ctx.node_config().api_auth_url).unwrap_or(ctx.settings().mobilex.auth_url.as_str()).to_string()
    }

    fn push_url(ctx: &Context) -> String {
        non_empty(&ctx.node_config().api_push_url).unwrap_or(ctx.settings().mobilex.push_url.as_str()).to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[async_trait]
impl Action for MobilexPushAction {
    fn create(
        node_type: NodeType,
        fields: &Vars,
    ) -> Result<Self> {
        if node_type != NodeType::MobilexPushNotification {
            return Err(NotiflowError::Node(format!("'{}' is not a push node", node_type.as_ref())));
        }
        let _: NodeConfig = decode_fields(&Self::schema(node_type), fields)?;
        Ok(Self)
    }

    fn schema(_node_type: NodeType) -> Value {
        base_schema(&["clientSecret", "appCompanyId"])
    }

    fn node_type(&self) -> NodeType {
        NodeType::MobilexPushNotification
    }

    fn sent_label(&self) -> &'static str {
        "push sent"
    }

    async fn run(
        &self,
        ctx: &mut Context,
    ) -> Result<Value> {
        ctx.resolve(&push_fields())?;

        let request = ctx.request()?;
        let author = request.require(Field::Author)?;
        if Uuid::parse_str(author).is_err() {
            ctx.log(LogLevel::Warn, format!("author '{}' is not a UUID", author));
        }
        let client_secret = request.require(Field::ClientSecret)?.to_string();

        ctx.status(NodeStatus::progress("authenticating"));
        let token = ctx.authenticator().authenticate(&Self::auth_url(ctx), &client_secret).await?;
        ctx.set_token(token);

        ctx.status(NodeStatus::progress("sending push"));
        let request = ctx.request()?;
        let payload = PushPayload::build(request, ctx.settings().mobilex.address_state)?;

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "accept", PUSH_ACCEPT)?;
        insert_header(&mut headers, "appcompanyid", request.require(Field::AppCompanyId)?)?;
        headers.insert(AUTHORIZATION, AuthScheme::Bearer.header_value(None, ctx.token()?.secret())?);
        insert_header(&mut headers, "content-type", CONTENT_TYPE_JSON)?;

        let body = serde_json::to_value(&payload)?;
        ctx.log(LogLevel::Debug, format!("push payload: {}", body));

        let url = Self::push_url(ctx);
        let response = ctx.dispatcher().send(HttpRequest::post(&url, headers, RequestBody::Json(body))).await?;
        if response.body.is_raw() {
            ctx.log(LogLevel::Warn, "push response was a non-JSON string, forwarding it raw");
        }
        ctx.log(LogLevel::Info, format!("push sent to {} users", payload.targets.userids.len()));

        Ok(response.body.into_value())
    }
}
