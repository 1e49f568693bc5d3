mod channel;
mod context;

pub use channel::{Channel, ChannelEvent, ChannelOptions};
pub use context::{Context, InvocationId, NodeEnv};
