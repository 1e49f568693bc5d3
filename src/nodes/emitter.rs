//! Result emitter: publishes status, output, error and log events of one
//! invocation on the host channel.

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    events::{ErrorSignal, Event, Log, LogLevel, Message, NodeEvent, NodeStatus},
    model::{InboundMessage, OutcomeMessage},
    nodes::NodeId,
    runtime::{Channel, InvocationId},
    utils,
};

#[derive(Clone)]
pub struct Emitter {
    channel: Arc<Channel>,
    nid: NodeId,
    iid: InvocationId,
    clear_delay: Duration,
}

impl Emitter {
    pub fn new(
        channel: Arc<Channel>,
        nid: NodeId,
        iid: InvocationId,
        clear_delay: Duration,
    ) -> Self {
        Self {
            channel,
            nid,
            iid,
            clear_delay,
        }
    }

    pub fn status(
        &self,
        status: NodeStatus,
    ) {
        self.publish(NodeEvent::Status(status));
    }

    pub fn log(
        &self,
        level: LogLevel,
        content: impl Into<String>,
    ) {
        let content = content.into();
        match level {
            LogLevel::Debug => debug!(nid = %self.nid, iid = %self.iid, "{}", content),
            LogLevel::Info => info!(nid = %self.nid, iid = %self.iid, "{}", content),
            LogLevel::Warn => warn!(nid = %self.nid, iid = %self.iid, "{}", content),
            LogLevel::Error => error!(nid = %self.nid, iid = %self.iid, "{}", content),
        }

        let log = Log {
            iid: self.iid.clone(),
            nid: self.nid.clone(),
            level,
            content,
            timestamp: utils::time::time_millis(),
        };
        let _ = self.channel.log_queue().send(Event::new(&log));
    }

    /// Success path: show the success status, then forward the message downstream.
    pub fn forward(
        &self,
        outcome: &OutcomeMessage,
        label: &str,
    ) {
        self.status(NodeStatus::success(label));
        self.publish(NodeEvent::Output(outcome.clone()));
        self.schedule_clear();
    }

    /// Failure path: raise an error signal carrying the inbound message. Nothing
    /// is forwarded.
    pub fn raise(
        &self,
        message: String,
        msg: &InboundMessage,
        label: &str,
    ) {
        self.log(LogLevel::Error, message.clone());
        self.status(NodeStatus::failure(label));
        self.publish(NodeEvent::Error(ErrorSignal {
            message,
            msg: msg.clone(),
        }));
        self.schedule_clear();
    }

    fn publish(
        &self,
        event: NodeEvent,
    ) {
        let message = Message {
            iid: self.iid.clone(),
            nid: self.nid.clone(),
            event,
        };
        let _ = self.channel.event_queue().send(Event::new(&message));
    }

    /// Detached timer that clears the status indicator. Never awaited by the invocation.
    fn schedule_clear(&self) {
        let queue = self.channel.event_queue();
        let message = Message {
            iid: self.iid.clone(),
            nid: self.nid.clone(),
            event: NodeEvent::Status(NodeStatus::clear()),
        };
        let delay = self.clear_delay;

        self.channel.handle().spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = queue.send(Event::new(&message));
        });
    }
}
