//! Event types emitted by node invocations.
//!
//! Events notify the host about status changes, forwarded outputs, errors
//! and node-scoped logs.

mod node;

pub use node::*;

use crate::{nodes::NodeId, runtime::InvocationId};

/// Generic event wrapper.
#[derive(Debug, Clone)]
pub struct Event<T> {
    inner: T,
}

/// Event message containing invocation and node context.
#[derive(Debug, Clone)]
pub struct Message {
    /// Invocation that generated this event, including its delayed status clear.
    pub iid: InvocationId,
    /// Node that generated this event.
    pub nid: NodeId,
    /// The actual event data.
    pub event: NodeEvent,
}

/// Log entry emitted during an invocation.
#[derive(Debug, Clone)]
pub struct Log {
    pub iid: InvocationId,
    pub nid: NodeId,
    pub level: LogLevel,
    pub content: String,
    /// Timestamp in milliseconds of the log entry.
    pub timestamp: i64,
}

impl<T> std::ops::Deref for Event<T>
where
    T: std::fmt::Debug + Clone,
{
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Event<T>
where
    T: std::fmt::Debug + Clone,
{
    pub fn new(inner: &T) -> Self {
        Self {
            inner: inner.clone(),
        }
    }
}
