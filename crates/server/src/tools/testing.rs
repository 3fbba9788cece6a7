//! Worker wiring for tool tests: in-memory cache, offline network.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::CallToolResult;

use foliocache_client::{FetchResponse, Network, SessionHost, Worker, WorkerConfig};
use foliocache_core::{AppConfig, CacheDb, Error, RequestDescriptor};

pub(crate) struct Offline;

#[async_trait]
impl Network for Offline {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<FetchResponse, Error> {
        Err(Error::Network(format!("offline: {}", request.url)))
    }
}

pub(crate) async fn worker() -> (Worker, SessionHost) {
    let storage = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let session = SessionHost::new();
    let config = WorkerConfig::from_app(&AppConfig::default()).unwrap();
    let worker = Worker::register(config, storage, Arc::new(Offline), Arc::new(session.clone()));
    (worker, session)
}

/// A worker that went through install and activate while offline.
pub(crate) async fn active_worker() -> (Worker, SessionHost) {
    let (worker, session) = worker().await;
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    (worker, session)
}

/// Parse the JSON text content of a tool result.
pub(crate) fn output(result: &CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
