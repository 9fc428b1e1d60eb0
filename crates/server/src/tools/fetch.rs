//! cache_fetch tool implementation.
//!
//! Hands one request to the fetch interceptor and reports the response it
//! produced, including whether it came from the cache.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{FetchInterceptor, FetchRequest, Intercepted};
use swcache_core::{Error, RequestKey};

use crate::error::ServerError;

/// Parameters for the cache_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheFetchParams {
    /// Absolute http(s) URL to request.
    pub url: String,

    /// HTTP method. Only GET requests are served from or written to the cache.
    #[serde(default = "default_method")]
    pub method: String,

    /// Extra request headers forwarded to the network on a miss.
    #[serde(default)]
    pub headers: Vec<HeaderPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheFetchOutput {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<HeaderPair>,
    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub body: String,
    pub body_bytes: usize,
    /// One of "cache", "network" or "passthrough".
    pub source: String,
}

/// Implementation of the cache_fetch tool.
pub async fn fetch_impl(interceptor: &FetchInterceptor, params: CacheFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ServerError::InvalidInput("url must not be empty".into()).into());
    }

    let key = RequestKey::new(&params.method, params.url.trim())?;
    let request = params
        .headers
        .into_iter()
        .fold(FetchRequest::new(key), |request, h| request.with_header(h.name, h.value));

    let Intercepted { response, source } = interceptor.handle(&request).await?;

    let output = CacheFetchOutput {
        status: response.status(),
        status_text: response.status_text().to_string(),
        headers: response
            .headers()
            .iter()
            .map(|(name, value)| HeaderPair { name: name.clone(), value: value.clone() })
            .collect(),
        body: String::from_utf8_lossy(response.body()).into_owned(),
        body_bytes: response.body().len(),
        source: source.as_str().to_string(),
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize response: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
