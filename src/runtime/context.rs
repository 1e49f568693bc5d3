use std::{sync::Arc, time::Duration};

use crate::{
    Config, NotiflowError, Result,
    events::{LogLevel, NodeStatus},
    http::{AuthToken, Authenticator, Dispatcher},
    model::{InboundMessage, OutcomeMessage},
    nodes::{
        Emitter, NodeConfig, NodeId,
        resolver::{self, EffectiveRequest, FieldSet},
    },
    runtime::Channel,
    utils,
};

pub type InvocationId = String;

/// Resources shared by every invocation of every node. Read-only once built.
#[derive(Clone)]
pub struct NodeEnv {
    config: Arc<Config>,
    dispatcher: Arc<Dispatcher>,
    channel: Arc<Channel>,
}

impl NodeEnv {
    pub fn new(
        config: Config,
        channel: Arc<Channel>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(Dispatcher::new()),
            channel,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn channel(&self) -> Arc<Channel> {
        self.channel.clone()
    }
}

/// Per-invocation context.
///
/// Carries the node configuration, the inbound message, the resolved
/// request and the auth token of exactly one invocation. Nothing in it is
/// shared with concurrent invocations besides the read-only `NodeEnv`.
pub struct Context {
    iid: InvocationId,
    nid: NodeId,
    env: NodeEnv,
    node_config: Arc<NodeConfig>,
    msg: InboundMessage,
    emitter: Emitter,

    request: Option<EffectiveRequest>,
    token: Option<AuthToken>,
}

impl Context {
    pub fn new(
        env: &NodeEnv,
        nid: NodeId,
        node_config: Arc<NodeConfig>,
        msg: InboundMessage,
    ) -> Self {
        let iid = utils::longid();
        let emitter = Emitter::new(
            env.channel.clone(),
            nid.clone(),
            iid.clone(),
            Duration::from_millis(env.config.status_clear_delay_ms),
        );

        Self {
            iid,
            nid,
            env: env.clone(),
            node_config,
            msg,
            emitter,
            request: None,
            token: None,
        }
    }

    pub fn iid(&self) -> &str {
        &self.iid
    }

    pub fn nid(&self) -> &str {
        &self.nid
    }

    pub fn settings(&self) -> &Config {
        &self.env.config
    }

    pub fn node_config(&self) -> &NodeConfig {
        &self.node_config
    }

    pub fn msg(&self) -> &InboundMessage {
        &self.msg
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.env.dispatcher
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.env.dispatcher.clone())
    }

    /// Resolve the effective request for `fields` and keep it for the rest of
    /// the invocation. Degraded structured fields are logged as warnings.
    pub fn resolve(
        &mut self,
        fields: &FieldSet,
    ) -> Result<()> {
        let request = resolver::resolve(&self.node_config, &self.msg.overrides(), fields)?;
        for degraded in request.degraded() {
            self.emitter.log(LogLevel::Warn, degraded.to_string());
        }
        self.request = Some(request);
        Ok(())
    }

    pub fn request(&self) -> Result<&EffectiveRequest> {
        self.request.as_ref().ok_or_else(|| NotiflowError::Configuration("request has not been resolved".to_string()))
    }

    pub fn set_token(
        &mut self,
        token: AuthToken,
    ) {
        self.token = Some(token);
    }

    pub fn token(&self) -> Result<&AuthToken> {
        self.token.as_ref().ok_or_else(|| NotiflowError::AuthFailure("no token for this invocation".to_string()))
    }

    pub fn status(
        &self,
        status: NodeStatus,
    ) {
        self.emitter.status(status);
    }

    pub fn log(
        &self,
        level: LogLevel,
        content: impl Into<String>,
    ) {
        self.emitter.log(level, content);
    }

    /// Forward the inbound message with `body` as its payload.
    pub(crate) fn succeed(
        self,
        body: serde_json::Value,
        label: &str,
    ) -> OutcomeMessage {
        let outcome = self.msg.into_outcome(body);
        self.emitter.forward(&outcome, label);
        outcome
    }

    pub(crate) fn fail(
        &self,
        message: String,
        label: &str,
    ) {
        self.emitter.raise(message, &self.msg, label);
    }
}
