//! MCP server handler implementation.
//!
//! Each tool call is a host event delivered to the worker, or an
//! inspection of the cache and session it runs in.
use crate::tools::{
    cache::{self, CacheGetParams},
    clients::{self, ClientsOpenParams},
    events::{self, SwNotificationClickParams, SwPushParams, SwSyncParams},
    fetch::{self, SwFetchParams},
    lifecycle,
};

use foliocache_client::{SessionHost, Worker};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// Host runtime for one registered worker.
#[derive(Clone)]
pub struct FolioCacheServer {
    tool_router: ToolRouter<Self>,
    worker: Worker,
    session: SessionHost,
}

#[tool_router]
impl FolioCacheServer {
    /// `session` must be the host the worker was registered with.
    pub fn new(worker: Worker, session: SessionHost) -> Self {
        Self { tool_router: Self::tool_router(), worker, session }
    }

    #[tool(description = "Deliver the install event: open the current cache and seed the shell and assets. Reports cached and failed URLs.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.worker).await
    }

    #[tool(description = "Deliver the activate event: delete every cache except the current one and take control of open pages.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.worker).await
    }

    /// Route a page request through the worker.
    ///
    /// Returns the served response and which path produced it (cache hit,
    /// network, navigation fallback or synthesized offline response).
    #[tool(description = "Deliver a fetch event. Cache first, network fallback, offline substitutes. Non-GET requests are not intercepted.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch::fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a background sync event for a tag (contact forms use \"sync-forms\").")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        events::sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message and show the resulting notification.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        events::push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a notification click: close it, then focus the page showing the site root or open one.")]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        events::notification_click_impl(&self.worker, params.0).await
    }

    #[tool(description = "List caches with entry counts and the worker's lifecycle state.")]
    async fn cache_keys(&self) -> Result<CallToolResult, McpError> {
        cache::keys_impl(&self.worker).await
    }

    #[tool(description = "Look up a URL in the current cache without using the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache::get_impl(&self.worker, params.0).await
    }

    #[tool(description = "Open a page in the session. It is controlled once the worker has activated.")]
    async fn clients_open(&self, params: Parameters<ClientsOpenParams>) -> Result<CallToolResult, McpError> {
        clients::open_impl(&self.worker, &self.session, params.0).await
    }

    #[tool(description = "List open pages with their focus and control state.")]
    async fn clients_list(&self) -> Result<CallToolResult, McpError> {
        clients::list_impl(&self.session).await
    }
}

impl ServerHandler for FolioCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "foliocache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;

    #[tokio::test]
    async fn test_router_lists_every_tool() {
        let (worker, session) = testing::worker().await;
        let server = FolioCacheServer::new(worker, session);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "cache_get",
                "cache_keys",
                "clients_list",
                "clients_open",
                "sw_activate",
                "sw_fetch",
                "sw_install",
                "sw_notification_click",
                "sw_push",
                "sw_sync",
            ]
        );
    }
}
