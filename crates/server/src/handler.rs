//! MCP server handler implementation.
//!
//! Routes tool calls to the cache worker. The worker is fully installed and
//! activated before the handler is constructed.
use crate::tools::{CacheFetchParams, PostMessageParams, fetch_impl, keys_impl, message_impl};

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
use swcache_client::ServiceWorker;

/// The MCP server handler for swcache.
#[derive(Clone)]
pub struct SwCacheServer {
    worker: ServiceWorker,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SwCacheServer {
    pub fn new(worker: ServiceWorker) -> Self {
        Self { worker, tool_router: Self::tool_router() }
    }

    /// Cache-first fetch through the worker.
    #[tool(
        description = "Fetch a URL through the cache. GET requests are served from the current cache when present, otherwise fetched and stored if the response is ok."
    )]
    async fn cache_fetch(&self, params: Parameters<CacheFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker.interceptor, params.0).await
    }

    #[tool(
        description = "Post a message to the cache worker. {\"action\": \"updateCache\"} re-fetches every cached entry except .vrm files; other payloads are ignored."
    )]
    async fn post_message(&self, params: Parameters<PostMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker.dispatcher, params.0).await
    }

    #[tool(description = "List the entries of the current cache in insertion order.")]
    async fn cache_keys(&self) -> Result<CallToolResult, McpError> {
        keys_impl(&self.worker.context).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
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
    use crate::tools::testing::worker_for;

    #[tokio::test]
    async fn test_lists_all_tools() {
        let server = SwCacheServer::new(worker_for("http://localhost:8080").await);

        let mut names: Vec<_> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["cache_fetch", "cache_keys", "post_message"]);
    }

    #[tokio::test]
    async fn test_server_info() {
        let server = SwCacheServer::new(worker_for("http://localhost:8080").await);
        assert_eq!(server.get_info().server_info.name, "swcache");
    }
}
