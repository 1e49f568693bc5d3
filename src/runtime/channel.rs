use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tokio::runtime::Handle;

use crate::{
    ShareLock,
    common::{BroadcastQueue, Shutdown},
    events::{ErrorSignal, Event, Log, Message, NodeEvent, NodeStatus},
    model::OutcomeMessage,
    nodes::NodeId,
};

macro_rules! dispatch_event {
    ($handles:expr, $(&$item:ident), +) => {
        let handlers = $handles.read().map(|h| h.clone()).unwrap_or_default();
        for handle in handlers.iter() {
            (handle)($(&$item),+);
        }
    };
}

macro_rules! dispatch_event_async {
    ($handles:expr, $(&$item:ident), +) => {
        let handles = $handles.clone();

        tokio::spawn(async move {
            let handlers = handles.read().map(|h| h.clone()).unwrap_or_default();
            for handle in handlers.iter() {
                (handle)($(&$item),+).await;
            }
        });
    };
}

const EVENT_QUEUE_SIZE: usize = 2048;
const LOG_QUEUE_SIZE: usize = 4096;

pub type NodeEventHandle = Arc<dyn Fn(&Event<Message>) + Send + Sync>;
pub type NodeLogHandle = Arc<dyn Fn(&Event<Log>) + Send + Sync>;
pub type NodeEventHandleAsync = Arc<dyn Fn(&Event<Message>) -> BoxFuture<'static, ()> + Send + Sync>;
pub type NodeLogHandleAsync = Arc<dyn Fn(&Event<Log>) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// use the glob pattern to match the node id
    /// eg. nid1*
    pub nid: String,

    /// use the glob pattern to match the invocation id
    pub iid: String,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            nid: "*".to_string(),
            iid: "*".to_string(),
        }
    }
}

impl ChannelOptions {
    pub fn with_nid(nid: String) -> Self {
        Self {
            nid,
            iid: "*".to_string(),
        }
    }
}

/// Host-facing event bus. Nodes publish status, output, error and log
/// events; subscribers registered through [`ChannelEvent`] receive them.
#[derive(Clone)]
pub struct Channel {
    event_queue: Arc<BroadcastQueue<Event<Message>>>,
    log_queue: Arc<BroadcastQueue<Event<Log>>>,

    events: ShareLock<Vec<NodeEventHandle>>,
    logs: ShareLock<Vec<NodeLogHandle>>,
    events_async: ShareLock<Vec<NodeEventHandleAsync>>,
    logs_async: ShareLock<Vec<NodeLogHandleAsync>>,

    handle: Handle,
    shutdown: Arc<Shutdown>,
}

impl Channel {
    pub fn new(handle: Handle) -> Self {
        Self {
            event_queue: BroadcastQueue::new(EVENT_QUEUE_SIZE),
            log_queue: BroadcastQueue::new(LOG_QUEUE_SIZE),
            events: Arc::new(RwLock::new(Vec::new())),
            logs: Arc::new(RwLock::new(Vec::new())),
            events_async: Arc::new(RwLock::new(Vec::new())),
            logs_async: Arc::new(RwLock::new(Vec::new())),
            handle,
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    pub(crate) fn log_queue(&self) -> Arc<BroadcastQueue<Event<Log>>> {
        self.log_queue.clone()
    }

    pub(crate) fn event_queue(&self) -> Arc<BroadcastQueue<Event<Message>>> {
        self.event_queue.clone()
    }

    /// Runtime handle used for listener and timer tasks.
    pub(crate) fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn listen(&self) {
        let mut event_queue = self.event_queue.subscribe();
        let mut log_queue = self.log_queue.subscribe();
        let events = self.events.clone();
        let logs = self.logs.clone();
        let events_async = self.events_async.clone();
        let logs_async = self.logs_async.clone();

        let shutdown = self.shutdown.clone();
        self.handle.spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    Ok(e) = event_queue.recv() => {
                        let evt = e.clone();
                        dispatch_event!(events, &evt);
                        dispatch_event_async!(events_async, &e);
                    }
                    Ok(log) = log_queue.recv() => {
                        let l = log.clone();
                        dispatch_event!(logs, &l);
                        dispatch_event_async!(logs_async, &log);
                    }
                }
            }
        });
    }

    pub(crate) fn shutdown(&self) {
        self.shutdown.shutdown();
    }
}

#[derive(Clone)]
pub struct ChannelEvent {
    channel: Arc<Channel>,

    glob: (Option<globset::GlobMatcher>, Option<globset::GlobMatcher>),
}

impl ChannelEvent {
    /// Subscribe to events of the nodes and invocations matching `options`.
    /// Invalid glob patterns match nothing.
    pub fn channel(
        channel: Arc<Channel>,
        options: ChannelOptions,
    ) -> Self {
        Self {
            channel,
            glob: (matcher(&options.nid), matcher(&options.iid)),
        }
    }

    pub fn on_status(
        &self,
        f: impl Fn(&NodeId, &NodeStatus) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        let handle: NodeEventHandle = Arc::new(move |e: &Event<Message>| {
            if let NodeEvent::Status(status) = &e.event {
                if is_match(&glob, &e.nid, &e.iid) {
                    f(&e.nid, status);
                }
            }
        });
        push_handle(&self.channel.events, handle);
    }

    pub fn on_output(
        &self,
        f: impl Fn(&NodeId, &OutcomeMessage) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        let handle: NodeEventHandle = Arc::new(move |e: &Event<Message>| {
            if let NodeEvent::Output(msg) = &e.event {
                if is_match(&glob, &e.nid, &e.iid) {
                    f(&e.nid, msg);
                }
            }
        });
        push_handle(&self.channel.events, handle);
    }

    pub fn on_error(
        &self,
        f: impl Fn(&NodeId, &ErrorSignal) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        let handle: NodeEventHandle = Arc::new(move |e: &Event<Message>| {
            if let NodeEvent::Error(signal) = &e.event {
                if is_match(&glob, &e.nid, &e.iid) {
                    f(&e.nid, signal);
                }
            }
        });
        push_handle(&self.channel.events, handle);
    }

    pub fn on_event(
        &self,
        f: impl Fn(&Event<Message>) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        let handle: NodeEventHandle = Arc::new(move |e: &Event<Message>| {
            if is_match(&glob, &e.nid, &e.iid) {
                f(e);
            }
        });
        push_handle(&self.channel.events, handle);
    }

    pub fn on_log(
        &self,
        f: impl Fn(&Event<Log>) + Send + Sync + 'static,
    ) {
        let glob = self.glob.clone();

        let handle: NodeLogHandle = Arc::new(move |e: &Event<Log>| {
            if is_match(&glob, &e.nid, &e.iid) {
                f(e);
            }
        });
        push_handle(&self.channel.logs, handle);
    }

    pub fn on_event_async<F>(
        &self,
        f: F,
    ) where
        F: Fn(&Event<Message>) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let glob = self.glob.clone();

        let handle: NodeEventHandleAsync = Arc::new(move |e: &Event<Message>| {
            if is_match(&glob, &e.nid, &e.iid) {
                f(e)
            } else {
                Box::pin(async {})
            }
        });
        push_handle(&self.channel.events_async, handle);
    }

    pub fn on_log_async<F>(
        &self,
        f: F,
    ) where
        F: Fn(&Event<Log>) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let glob = self.glob.clone();

        let handle: NodeLogHandleAsync = Arc::new(move |e: &Event<Log>| {
            if is_match(&glob, &e.nid, &e.iid) {
                f(e)
            } else {
                Box::pin(async {})
            }
        });
        push_handle(&self.channel.logs_async, handle);
    }
}

fn push_handle<H>(
    handles: &ShareLock<Vec<H>>,
    handle: H,
) {
    match handles.write() {
        Ok(mut handles) => handles.push(handle),
        Err(poisoned) => poisoned.into_inner().push(handle),
    }
}

fn matcher(pattern: &str) -> Option<globset::GlobMatcher> {
    match globset::Glob::new(pattern) {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(err) => {
            tracing::warn!("invalid channel glob '{}': {}", pattern, err);
            None
        }
    }
}

fn is_match(
    glob: &(Option<globset::GlobMatcher>, Option<globset::GlobMatcher>),
    nid: &str,
    iid: &str,
) -> bool {
    let (pat_nid, pat_iid) = glob;
    let nid_match = pat_nid.as_ref().is_some_and(|m| m.is_match(nid));
    let iid_match = pat_iid.as_ref().is_some_and(|m| m.is_match(iid));
    nid_match && iid_match
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use super::*;
    use crate::events::NodeStatus;

    fn status_event(
        nid: &str,
        status: NodeStatus,
    ) -> Event<Message> {
        Event::new(&Message {
            iid: "i-1".to_string(),
            nid: nid.to_string(),
            event: NodeEvent::Status(status),
        })
    }

    #[tokio::test]
    async fn test_listen_dispatches_to_matching_handlers() {
        let channel = Arc::new(Channel::new(Handle::current()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        ChannelEvent::channel(channel.clone(), ChannelOptions::with_nid("push-*".to_string())).on_status(move |nid, status| {
            sink.lock().unwrap().push((nid.clone(), status.clone()));
        });
        channel.listen();

        channel.event_queue().send(status_event("push-1", NodeStatus::progress("sending"))).unwrap();
        channel.event_queue().send(status_event("text-1", NodeStatus::progress("sending"))).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        channel.shutdown();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "push-1");
    }

    #[test]
    fn test_invalid_glob_matches_nothing() {
        let glob = (matcher("[unclosed"), matcher("*"));
        assert!(!is_match(&glob, "push-1", "i-1"));
    }
}
