pub mod actions;
mod emitter;
mod node;
mod node_config;
pub mod resolver;

pub use emitter::Emitter;
pub use node::{Node, NodeType};
pub use node_config::NodeConfig;

pub type NodeId = String;
