//! cache_keys tool implementation.
//!
//! Lists every store with its entry count, marking the current one.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;

use foliocache_client::{Worker, WorkerState};
use foliocache_core::CacheStorage;

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub name: String,
    pub entries: u64,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheKeysOutput {
    pub state: WorkerState,
    pub stores: Vec<StoreSummary>,
}

pub async fn keys_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let storage = worker.storage();
    let current = &worker.config().cache_name;

    let mut stores = Vec::new();
    for name in storage.keys().await? {
        let entries = storage.entry_count(&name).await?;
        stores.push(StoreSummary { current: &name == current, name, entries });
    }

    json_result(&CacheKeysOutput { state: worker.state().await, stores })
}
