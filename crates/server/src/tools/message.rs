//! post_message tool implementation.
//!
//! Delivers a message payload to the worker. `{ "action": "updateCache" }`
//! starts a refresh sweep; every other payload is accepted and ignored.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{MessageDispatcher, RefreshReport};
use swcache_core::Error;

use crate::error::ServerError;

/// Parameters for the post_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostMessageParams {
    /// Arbitrary JSON message payload.
    pub payload: serde_json::Value,

    /// Wait for a triggered refresh to finish and include its report.
    #[serde(default)]
    pub wait: bool,
}

/// Output from the post_message tool.
#[derive(Debug, Clone, Serialize)]
pub struct PostMessageOutput {
    /// Whether the payload triggered a refresh.
    pub triggered: bool,
    /// Refresh summary, present only when `wait` was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RefreshReport>,
}

/// Implementation of the post_message tool.
pub async fn message_impl(
    dispatcher: &MessageDispatcher, params: PostMessageParams,
) -> Result<CallToolResult, McpError> {
    let output = match dispatcher.dispatch(&params.payload) {
        None => PostMessageOutput { triggered: false, report: None },
        Some(_) if !params.wait => PostMessageOutput { triggered: true, report: None },
        Some(handle) => {
            let report = handle.await.map_err(|e| ServerError::TaskFailed(e.to_string()))??;
            PostMessageOutput { triggered: true, report: Some(report) }
        }
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
