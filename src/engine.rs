//! Node engine - the main entry point for Notiflow.
//!
//! The engine owns the tokio runtime, the registry of deployed nodes, the
//! input queue and the event channel. Every queued message becomes one
//! invocation running as its own task.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

use crate::{
    Config, NotiflowError, Result,
    common::{MemCache, Queue, Shutdown},
    model::{InboundMessage, NodeModel},
    nodes::{Node, NodeId},
    runtime::{Channel, NodeEnv},
};

/// Maximum number of deployed nodes.
const NODE_CACHE_SIZE: usize = 4096;
/// Size of the queue of pending invocations.
const INPUT_QUEUE_SIZE: usize = 1024;

/// The node engine.
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new().build()?;
/// engine.launch()?;
///
/// let node = engine.deploy(&NodeModel::from_json(json_str)?)?;
/// ChannelEvent::channel(engine.channel(), ChannelOptions::with_nid(node.id.clone()))
///     .on_output(|nid, out| println!("{}: {:?}", nid, out.payload));
///
/// engine.input(&node.id, InboundMessage::new(json!({"to": "5511999990000"})))?;
///
/// engine.shutdown();
/// ```
pub struct Engine {
    /// Resources shared by every invocation.
    env: NodeEnv,
    /// Deployed nodes by id.
    nodes: Arc<MemCache<NodeId, Arc<Node>>>,
    /// Invocations waiting for the input loop.
    input_queue: Arc<Queue<(NodeId, InboundMessage)>>,

    /// Flag indicating if the engine is running.
    running: Arc<AtomicBool>,
    /// Tokio runtime for async task execution.
    runtime: Arc<Runtime>,
    /// Shutdown coordinator for graceful termination.
    shutdown: Arc<Shutdown>,
}

impl Engine {
    /// Creates a new engine with its own runtime sized by
    /// `config.async_worker_thread_number`.
    pub fn new_with_config(config: Config) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.async_worker_thread_number.max(1).into())
            .enable_all()
            .build()
            .map_err(|e| NotiflowError::Engine(format!("failed to build runtime: {}", e)))?;

        Ok(Self::new(Arc::new(runtime), config))
    }

    /// Creates a new engine on an existing runtime.
    pub fn new(
        runtime: Arc<Runtime>,
        config: Config,
    ) -> Self {
        let channel = Arc::new(Channel::new(runtime.handle().clone()));

        Self {
            env: NodeEnv::new(config, channel),
            nodes: Arc::new(MemCache::new(NODE_CACHE_SIZE)),
            input_queue: Queue::new(INPUT_QUEUE_SIZE),
            running: Arc::new(AtomicBool::new(false)),
            runtime,
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    /// Starts the event channel and the input loop. Launching a running
    /// engine is a no-op; an engine that was shut down cannot be relaunched.
    pub fn launch(&self) -> Result<()> {
        if self.shutdown.is_shutdown() {
            return Err(NotiflowError::Engine("Engine has been shut down".to_string()));
        }
        if self.running.swap(true, Ordering::Relaxed) {
            return Ok(());
        }

        self.env.channel().listen();

        let input_queue = self.input_queue.clone();
        let nodes = self.nodes.clone();
        let env = self.env.clone();
        let shutdown = self.shutdown.clone();
        self.runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    Some((nid, msg)) = input_queue.next_async() => {
                        let Some(node) = nodes.get(&nid) else {
                            warn!("dropping message for unknown node {}", nid);
                            continue;
                        };
                        let env = env.clone();
                        tokio::spawn(async move {
                            if let Err(err) = node.invoke(&env, msg).await {
                                debug!(nid = %node.id, "invocation ended with {}", err.status_label());
                            }
                        });
                    }
                }
            }
        });
        info!("engine launched");
        Ok(())
    }

    /// Stops the input loop and the event channel. In-flight invocations
    /// run to completion.
    pub fn shutdown(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }

        self.shutdown.shutdown();
        self.env.channel().shutdown();
        info!("engine shut down");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Creates a node from its editor definition and registers it,
    /// replacing any node with the same id.
    pub fn deploy(
        &self,
        model: &NodeModel,
    ) -> Result<Arc<Node>> {
        let node = Arc::new(Node::new(model)?);
        self.nodes.set(node.id.clone(), node.clone());
        debug!(nid = %node.id, "deployed {} node", node.node_type);
        Ok(node)
    }

    /// Removes a deployed node. Invocations already queued for it are dropped.
    pub fn undeploy(
        &self,
        nid: &str,
    ) {
        self.nodes.remove(&nid.to_string());
    }

    /// Gets a deployed node by its id.
    pub fn node(
        &self,
        nid: &str,
    ) -> Option<Arc<Node>> {
        self.nodes.get(&nid.to_string())
    }

    /// Queues one invocation of node `nid`.
    pub fn input(
        &self,
        nid: &str,
        msg: InboundMessage,
    ) -> Result<()> {
        if !self.is_running() {
            return Err(NotiflowError::Engine("Engine is not running".to_string()));
        }
        if !self.nodes.contains(&nid.to_string()) {
            return Err(NotiflowError::Engine(format!("node {} not found", nid)));
        }
        self.input_queue.send((nid.to_string(), msg))
    }

    /// Returns a reference to the event channel.
    pub fn channel(&self) -> Arc<Channel> {
        self.env.channel()
    }

    pub fn config(&self) -> &Config {
        self.env.config()
    }
}
