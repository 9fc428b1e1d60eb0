//! Errors raised by the server layer itself.
//!
//! Cache and network failures come from `swcache_core::Error`; these cover
//! tool arguments and background task plumbing.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid tool arguments (e.g., empty url).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A spawned refresh task panicked or was cancelled.
    #[error("TASK_FAILED: {0}")]
    TaskFailed(String),
}

impl From<ServerError> for McpError {
    fn from(err: ServerError) -> Self {
        let code = match &err {
            ServerError::InvalidInput(_) => -32602,
            ServerError::TaskFailed(_) => -32000,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
