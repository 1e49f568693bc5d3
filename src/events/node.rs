use std::fmt;

use serde::Serialize;

use crate::model::{InboundMessage, OutcomeMessage};

#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// The node status indicator changed.
    Status(NodeStatus),
    /// A message is forwarded downstream.
    Output(OutcomeMessage),
    /// The invocation failed; routed apart from the forward path.
    Error(ErrorSignal),
}

impl NodeEvent {
    pub fn is_output(&self) -> bool {
        matches!(self, NodeEvent::Output(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NodeEvent::Error(_))
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusFill {
    /// in progress
    Blue,
    /// success
    Green,
    /// failure
    Red,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusShape {
    Dot,
    Ring,
}

/// Node status indicator. `None` clears the indicator.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus(pub Option<StatusIndicator>);

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusIndicator {
    pub fill: StatusFill,
    pub shape: StatusShape,
    pub text: String,
}

impl NodeStatus {
    pub fn progress(text: &str) -> Self {
        Self::indicator(StatusFill::Blue, StatusShape::Dot, text)
    }

    pub fn success(text: &str) -> Self {
        Self::indicator(StatusFill::Green, StatusShape::Dot, text)
    }

    pub fn failure(text: &str) -> Self {
        Self::indicator(StatusFill::Red, StatusShape::Ring, text)
    }

    pub fn clear() -> Self {
        Self(None)
    }

    pub fn is_clear(&self) -> bool {
        self.0.is_none()
    }

    pub fn fill(&self) -> Option<StatusFill> {
        self.0.as_ref().map(|s| s.fill)
    }

    fn indicator(
        fill: StatusFill,
        shape: StatusShape,
        text: &str,
    ) -> Self {
        Self(Some(StatusIndicator {
            fill,
            shape,
            text: text.to_string(),
        }))
    }
}

/// Failure report: a human readable message plus the inbound message for context.
#[derive(Debug, Clone)]
pub struct ErrorSignal {
    pub message: String,
    pub msg: InboundMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
