//! Error types for Notiflow.
//!
//! Every failure of a node invocation is represented by a `NotiflowError`
//! variant. The variant decides which status label the node shows and how
//! the failure is reported on the error channel.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Unified error type for all Notiflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum NotiflowError {
    /// A required field is missing or malformed. Raised before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The authentication exchange failed (no response, HTTP error or unparsable body).
    #[error("authentication error: {0}")]
    Auth(String),

    /// The authentication exchange succeeded but returned no usable token.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// No response was received from the remote service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status.
    #[error("http error (status {status}): {body}")]
    Http {
        status: u16,
        body: Value,
    },

    /// Engine-level errors (startup, shutdown, registry).
    #[error("{0}")]
    Engine(String),

    /// Configuration file parsing errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Node definition errors.
    #[error("{0}")]
    Node(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),

    /// Message queue errors.
    #[error("{0}")]
    Queue(String),
}

impl NotiflowError {
    /// Short label shown on the node status when the invocation ends with this error.
    pub fn status_label(&self) -> &'static str {
        match self {
            NotiflowError::Configuration(_) => "configuration error",
            NotiflowError::Auth(_) => "auth error",
            NotiflowError::AuthFailure(_) => "auth failed",
            NotiflowError::Transport(_) => "no response",
            NotiflowError::Http {
                ..
            } => "send error",
            _ => "error",
        }
    }
}

impl From<NotiflowError> for String {
    fn from(val: NotiflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for NotiflowError {
    fn from(error: std::io::Error) -> Self {
        NotiflowError::IoError(error.to_string())
    }
}

impl From<NotiflowError> for std::io::Error {
    fn from(val: NotiflowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for NotiflowError {
    fn from(error: serde_json::Error) -> Self {
        NotiflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for NotiflowError {
    fn from(error: toml::de::Error) -> Self {
        NotiflowError::Config(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for NotiflowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        NotiflowError::Node(error.to_string())
    }
}
