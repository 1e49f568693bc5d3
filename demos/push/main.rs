use std::{sync::mpsc, time::Duration};

use notiflow::{ChannelEvent, ChannelOptions, EngineBuilder, InboundMessage, NodeModel};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let engine = EngineBuilder::new().build().unwrap();
    engine.launch().unwrap();

    let model = NodeModel::from_json(include_str!("./node.json")).unwrap();
    let node = engine.deploy(&model).unwrap();

    let (tx, rx) = mpsc::channel();
    let events = ChannelEvent::channel(engine.channel(), ChannelOptions::with_nid(node.id.clone()));

    let done = tx.clone();
    events.on_output(move |nid, out| {
        println!("{} sent: {}", nid, out.payload);
        let _ = done.send(());
    });
    events.on_error(move |nid, signal| {
        println!("{} failed: {}", nid, signal.message);
        let _ = tx.send(());
    });
    events.on_log(|log| println!("[{}] {}", log.level, log.content));

    engine.input(&node.id, InboundMessage::new(json!({"userids": ["00000000-0000-0000-0000-000000000001"]}))).unwrap();

    let _ = rx.recv_timeout(Duration::from_secs(30));
    engine.shutdown();
}
