//! sw_fetch tool implementation.
//!
//! Delivers a page request to the worker and reports how it was answered.
//! The tool call stays open until the background cache write settles.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use foliocache_client::{InterceptOutcome, Interception, Worker};
use foliocache_core::{Error, RequestDescriptor, RequestMode, ResponseType, StoredResponse};

use super::json_result;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Request URL, absolute or relative to the site origin.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are intercepted.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin", "no-cors" or "cors" (default).
    #[serde(default)]
    pub mode: RequestMode,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize)]
pub struct SwFetchOutput {
    /// False when the host must perform the request itself.
    pub intercepted: bool,
    pub outcome: Option<InterceptOutcome>,
    pub response: Option<ResponseView>,
}

/// A served response with its body as text.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseView {
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ResponseView {
    pub fn from_stored(response: &StoredResponse) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            response_type: response.response_type,
            url: response.url.clone(),
            headers: response.headers.clone(),
            body: response.body_text(),
        }
    }
}

pub async fn fetch_impl(worker: &Worker, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url must not be empty".to_string()).into());
    }
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method must not be empty".to_string()).into());
    }

    let request = RequestDescriptor::new(params.method.trim(), params.url.trim(), params.mode);

    let output = match worker.fetch(&request).await {
        Interception::NotIntercepted => SwFetchOutput { intercepted: false, outcome: None, response: None },
        Interception::Intercepted(mut intercepted) => {
            intercepted.wait_until().await;
            SwFetchOutput {
                intercepted: true,
                outcome: Some(intercepted.outcome),
                response: Some(ResponseView::from_stored(&intercepted.response)),
            }
        }
    };

    json_result(&output)
}
