//! cache_get tool implementation.
//!
//! Looks a URL up in the current store without touching the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use foliocache_client::{Worker, fetch::canonicalize};
use foliocache_core::{CacheStorage, Error, RequestDescriptor};

use crate::tools::fetch::ResponseView;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL to look up, absolute or relative to the site origin.
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheGetOutput {
    pub cache_name: String,
    pub key: String,
    pub response: ResponseView,
}

pub async fn get_impl(worker: &Worker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let config = worker.config();
    let url = canonicalize(&params.url, &config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = RequestDescriptor::get(url.as_str());

    let response = worker
        .storage()
        .match_request(&config.cache_name, &request)
        .await?
        .ok_or_else(|| Error::CacheMiss(request.url.clone()))?;

    json_result(&CacheGetOutput {
        cache_name: config.cache_name.clone(),
        key: request.cache_key(),
        response: ResponseView::from_stored(&response),
    })
}
