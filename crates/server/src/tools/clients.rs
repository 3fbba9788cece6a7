//! clients_open and clients_list tool implementations.
//!
//! Stand in for the user opening pages in the host session.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use foliocache_client::{SessionHost, Worker, fetch::canonicalize};
use foliocache_core::{Error, WindowClient};

use super::json_result;

/// Input parameters for the clients_open tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientsOpenParams {
    /// Page URL, absolute or relative to the site origin.
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientsListOutput {
    pub clients: Vec<WindowClient>,
}

pub async fn open_impl(
    worker: &Worker, session: &SessionHost, params: ClientsOpenParams,
) -> Result<CallToolResult, McpError> {
    let url = canonicalize(&params.url, &worker.config().origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let client = session.attach_client(url.as_str()).await;
    tracing::debug!(id = %client.id, url = %client.url, "page opened");
    json_result(&client)
}

pub async fn list_impl(session: &SessionHost) -> Result<CallToolResult, McpError> {
    json_result(&ClientsListOutput { clients: session.clients().await })
}
