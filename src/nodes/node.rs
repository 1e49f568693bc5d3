use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    NotiflowError, Result,
    common::Vars,
    model::{InboundMessage, NodeModel, OutcomeMessage},
    nodes::{
        NodeConfig, NodeId,
        actions::{Action, MobilexPushAction, WhatsappAction, whatsapp::MessageKind},
    },
    runtime::{Context, NodeEnv},
};

/// Node type strings registered with the flow editor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NodeType {
    MobilexPushNotification,
    WhatsappSendText,
    WhatsappSendImage,
    WhatsappSendVideo,
    WhatsappSendAudio,
    WhatsappSendFile,
    WhatsappSendMediaMtm,
    WhatsappSendButtonLink,
    WhatsappSendButtonQuickReply,
    WhatsappSendAuthenticationTemplate,
    WhatsappMarkAsRead,
}

impl NodeType {
    /// Message shape of the whatsapp family, `None` for the push node.
    pub fn message_kind(&self) -> Option<MessageKind> {
        match self {
            NodeType::MobilexPushNotification => None,
            NodeType::WhatsappSendText => Some(MessageKind::Text),
            NodeType::WhatsappSendImage => Some(MessageKind::Image),
            NodeType::WhatsappSendVideo => Some(MessageKind::Video),
            NodeType::WhatsappSendAudio => Some(MessageKind::Audio),
            NodeType::WhatsappSendFile => Some(MessageKind::File),
            NodeType::WhatsappSendMediaMtm => Some(MessageKind::Media),
            NodeType::WhatsappSendButtonLink => Some(MessageKind::ButtonLink),
            NodeType::WhatsappSendButtonQuickReply => Some(MessageKind::ButtonQuickReply),
            NodeType::WhatsappSendAuthenticationTemplate => Some(MessageKind::AuthenticationTemplate),
            NodeType::WhatsappMarkAsRead => Some(MessageKind::MarkAsRead),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A deployed node. Immutable; every invocation gets its own [`Context`].
pub struct Node {
    /// node id
    pub id: NodeId,
    /// node display name
    pub name: Option<String>,
    /// node type
    pub node_type: NodeType,
    /// static node configuration
    pub config: Arc<NodeConfig>,
    /// node action
    pub action: Box<dyn Action>,
}

impl fmt::Debug for Node {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("node_type", &self.node_type)
            .field("config", &self.config)
            .finish()
    }
}

impl Node {
    pub fn new(model: &NodeModel) -> Result<Self> {
        let node_type = NodeType::from_str(&model.node_type).map_err(|_| NotiflowError::Node(format!("invalid node type: '{}'", model.node_type)))?;
        // validates the fields against the action schema
        let action = Self::create_action(node_type, &model.fields)?;
        let config: NodeConfig = serde_json::from_value(model.fields.clone().into())?;

        Ok(Self {
            id: model.id.clone(),
            name: model.name.clone(),
            node_type,
            config: Arc::new(config),
            action,
        })
    }

    fn create_action(
        node_type: NodeType,
        fields: &Vars,
    ) -> Result<Box<dyn Action>> {
        match node_type {
            NodeType::MobilexPushNotification => Ok(Box::new(MobilexPushAction::create(node_type, fields)?)),
            _ => Ok(Box::new(WhatsappAction::create(node_type, fields)?)),
        }
    }

    /// Run one invocation.
    ///
    /// On success the inbound message is forwarded with the response body as
    /// its payload. On failure an error signal carrying the inbound message
    /// is raised and the error is returned; nothing is forwarded.
    pub async fn invoke(
        &self,
        env: &NodeEnv,
        msg: InboundMessage,
    ) -> Result<OutcomeMessage> {
        let mut ctx = Context::new(env, self.id.clone(), self.config.clone(), msg);

        let result = self.action.run(&mut ctx).await;
        match result {
            Ok(body) => Ok(ctx.succeed(body, self.action.sent_label())),
            Err(err) => {
                ctx.fail(format!("{} failed: {}", self.node_type, err), err.status_label());
                Err(err)
            }
        }
    }
}
