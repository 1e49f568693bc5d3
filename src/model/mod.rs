mod message;
mod node;

pub use message::{InboundMessage, OutcomeMessage};
pub use node::NodeModel;
