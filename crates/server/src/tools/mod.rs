//! MCP tool implementations.
//!
//! Each `sw_*` tool delivers one lifecycle event to the worker; the rest
//! inspect the cache and the session's pages.

pub mod cache;
pub mod clients;
pub mod events;
pub mod fetch;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use foliocache_core::Error;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
