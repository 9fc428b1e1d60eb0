//! Cross-process message handling.
//!
//! The only recognized payload is `{ "action": "updateCache" }`. Anything
//! else is ignored.

use serde_json::Value;
use tokio::task::JoinHandle;

use swcache_core::Error;

use super::refresh::{BulkRefresh, RefreshReport};

const UPDATE_CACHE: &str = "updateCache";

/// A recognized message, or the fact that the payload meant nothing to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    UpdateCache,
    Ignored,
}

impl Message {
    pub fn parse(payload: &Value) -> Self {
        match payload.get("action").and_then(Value::as_str) {
            Some(UPDATE_CACHE) => Message::UpdateCache,
            _ => Message::Ignored,
        }
    }
}

/// Routes incoming messages to the bulk refresh.
#[derive(Clone)]
pub struct MessageDispatcher {
    refresh: BulkRefresh,
}

impl MessageDispatcher {
    pub fn new(refresh: BulkRefresh) -> Self {
        Self { refresh }
    }

    /// Handle one message payload.
    ///
    /// A refresh runs on its own task; the returned handle resolves to its
    /// report. Callers that only want fire-and-forget can drop it.
    pub fn dispatch(&self, payload: &Value) -> Option<JoinHandle<Result<RefreshReport, Error>>> {
        match Message::parse(payload) {
            Message::UpdateCache => {
                let refresh = self.refresh.clone();
                Some(tokio::spawn(async move {
                    let result = refresh.run().await;
                    if let Err(e) = &result {
                        tracing::error!(error = %e, "refresh sweep aborted");
                    }
                    result
                }))
            }
            Message::Ignored => {
                tracing::debug!("ignoring message {}", payload);
                None
            }
        }
    }
}
