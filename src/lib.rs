//! # Notiflow
//!
//! Notiflow is a set of flow-editor nodes for outbound notifications, written
//! in Rust. Each node turns one inbound message into one outbound HTTP call:
//! a whatsapp-style message send or a MobileX push notification.
//!
//! ## Core Features
//!
//! - **One engine, eleven node types**: text, media, button, template and read-receipt sends, plus push notifications
//! - **Payload over node config**: every overridable field of the inbound payload wins over the node configuration
//! - **Isolated invocations**: each message runs as its own task with its own context and auth token
//! - **Event channel**: node status, output, error signals and logs are published to subscribers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use notiflow::{ChannelEvent, ChannelOptions, EngineBuilder, InboundMessage, NodeModel};
//!
//! let engine = EngineBuilder::new().build()?;
//! engine.launch()?;
//!
//! let node = engine.deploy(&NodeModel::from_json(json_str)?)?;
//! ChannelEvent::channel(engine.channel(), ChannelOptions::with_nid(node.id.clone()))
//!     .on_error(|nid, signal| eprintln!("{}: {}", nid, signal.message));
//!
//! engine.input(&node.id, InboundMessage::new(json!({"to": "5511999990000", "text": "hi"})))?;
//! ```

mod builder;
mod common;
mod config;
mod engine;
mod error;
mod events;
mod http;
mod model;
mod nodes;
mod runtime;
mod utils;

use std::sync::{Arc, RwLock};

pub use builder::EngineBuilder;
pub use config::{AddressStateShape, Config, MobilexConfig, WhatsappConfig};
pub use engine::Engine;
pub use error::NotiflowError;
pub use events::{ErrorSignal, Event, Log, LogLevel, Message, NodeEvent, NodeStatus, StatusFill, StatusIndicator, StatusShape};
pub use http::{AuthScheme, AuthToken, Authenticator, Dispatcher};
pub use model::*;
pub use nodes::{Node, NodeConfig, NodeId, NodeType};
pub use runtime::{Channel, ChannelEvent, ChannelOptions, Context, InvocationId, NodeEnv};

/// Result type alias for Notiflow operations.
pub type Result<T> = std::result::Result<T, NotiflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
