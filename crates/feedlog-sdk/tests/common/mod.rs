use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feedlog_protocol::{ProtocolResult, Transport};
use feedlog_sdk::FeedClient;
use feedlog_server::{MemoryDaemon, ServerConfig};
use serde_json::Value;

/// Forwards to a [`MemoryDaemon`] and records every path requested.
pub struct RecordingTransport {
    pub daemon: MemoryDaemon,
    calls: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new(daemon: MemoryDaemon) -> Arc<Self> {
        Arc::new(Self {
            daemon,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == path).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_json(&self, path: &str, body: &Value) -> ProtocolResult<Value> {
        self.calls.lock().unwrap().push(path.to_string());
        self.daemon.post_json(path, body).await
    }

    async fn get_json(&self, path: &str) -> ProtocolResult<Value> {
        self.calls.lock().unwrap().push(path.to_string());
        self.daemon.get_json(path).await
    }
}

pub fn setup() -> (FeedClient, Arc<RecordingTransport>) {
    let transport = RecordingTransport::new(MemoryDaemon::new(ServerConfig::default()));
    let client = FeedClient::with_transport(transport.clone());
    (client, transport)
}
