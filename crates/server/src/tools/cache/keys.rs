//! cache_keys tool implementation.
//!
//! Lists the entries of the current store in insertion order.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::CacheContext;
use swcache_core::Error;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeyEntry {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub stored_at: String,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    /// Name of the current store.
    pub cache: String,
    pub entries: Vec<CacheKeyEntry>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(ctx: &CacheContext) -> Result<CallToolResult, McpError> {
    let store = ctx.open_current().await?;
    let entries = store
        .entries()
        .await?
        .into_iter()
        .map(|meta| CacheKeyEntry {
            method: meta.key.method().to_string(),
            url: meta.key.url().to_string(),
            status: meta.status,
            stored_at: meta.stored_at,
        })
        .collect();

    let output = CacheKeysOutput { cache: store.name().to_string(), entries };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize keys: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
