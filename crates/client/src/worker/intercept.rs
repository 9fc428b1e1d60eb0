//! Cache-first fetch interception.
//!
//! For each request: serve the stored response if there is one, otherwise go
//! to the network. Only ok responses to cacheable requests are written, after
//! the isolation rewrite for paths that need it. Network failures propagate
//! to the caller; no fallback response is synthesized.

use swcache_core::{Error, StoredResponse};

use super::CacheContext;
use crate::fetch::FetchRequest;

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Served from the current store, no network call.
    Cache,
    /// Fetched from the network and written to the store.
    Network,
    /// Fetched from the network and returned without being stored.
    Passthrough,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
            ResponseSource::Passthrough => "passthrough",
        }
    }
}

/// Response handed back to the caller of the interceptor.
#[derive(Debug, Clone)]
pub struct Intercepted {
    pub response: StoredResponse,
    pub source: ResponseSource,
}

/// Decides cache hit, cache miss or network error for every request.
#[derive(Clone)]
pub struct FetchInterceptor {
    ctx: CacheContext,
}

impl FetchInterceptor {
    pub fn new(ctx: CacheContext) -> Self {
        Self { ctx }
    }

    /// Produce a response for an intercepted request.
    ///
    /// # Errors
    ///
    /// Returns `Error::Network` when the network request fails on a miss, and
    /// storage errors from the lookup.
    pub async fn handle(&self, request: &FetchRequest) -> Result<Intercepted, Error> {
        let store = self.ctx.open_current().await?;

        if request.is_cacheable()
            && let Some(cached) = store.match_request(request.key()).await?
        {
            tracing::debug!("cache hit for {}", request.key());
            return Ok(Intercepted { response: cached, source: ResponseSource::Cache });
        }

        let response = self.ctx.fetcher().fetch(request).await.inspect_err(|e| {
            tracing::error!(request = %request.key(), error = %e, "fetch failed");
        })?;

        if !response.is_ok() || !request.is_cacheable() {
            tracing::debug!("passing through {} ({})", request.key(), response.status());
            return Ok(Intercepted { response, source: ResponseSource::Passthrough });
        }

        let response = self.ctx.policy().apply(request.url(), response);
        let (returned, stored) = response.tee();

        if let Err(e) = store.put(request.key(), &stored).await {
            tracing::warn!(request = %request.key(), error = %e, "failed to store response");
        } else {
            tracing::debug!("cached {}", request.key());
        }

        Ok(Intercepted { response: returned, source: ResponseSource::Network })
    }
}
