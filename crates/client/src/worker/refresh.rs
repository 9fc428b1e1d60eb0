//! Bulk refresh of the current store.
//!
//! Every cached entry is re-fetched independently and overwritten when the
//! network answers ok. Entries whose path has the exempt extension are never
//! touched. A failing entry is logged and counted; it does not stop the sweep.

use futures_util::future::join_all;
use serde::Serialize;

use swcache_core::{CacheStore, Error, RequestKey};

use super::CacheContext;
use crate::fetch::FetchRequest;

/// An entry that could not be refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshFailure {
    pub url: String,
    pub reason: String,
}

/// Summary of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Entries overwritten with fresh network content.
    pub refreshed: usize,
    /// Entries skipped because of the exempt extension.
    pub skipped: usize,
    /// Entries left alone because the network answered with a non-ok status.
    pub not_ok: usize,
    pub failed: Vec<RefreshFailure>,
}

enum EntryOutcome {
    Refreshed,
    Skipped,
    NotOk,
    Failed(RefreshFailure),
}

/// Re-fetches every non-exempt entry of the current store.
///
/// Only the request key is persisted, so each entry is re-fetched as a bare
/// request for its method and URL. Headers sent with the original miss are
/// not replayed.
#[derive(Clone)]
pub struct BulkRefresh {
    ctx: CacheContext,
}

impl BulkRefresh {
    pub fn new(ctx: CacheContext) -> Self {
        Self { ctx }
    }

    /// Run one sweep over the current store.
    ///
    /// # Errors
    ///
    /// Only opening the store or listing its keys can fail the sweep.
    pub async fn run(&self) -> Result<RefreshReport, Error> {
        let store = self.ctx.open_current().await?;
        let keys = store.keys().await?;
        tracing::info!(cache = %self.ctx.version(), entries = keys.len(), "refresh sweep started");

        let outcomes = join_all(keys.into_iter().map(|key| self.refresh_entry(&store, key))).await;

        let mut report = RefreshReport::default();
        for outcome in outcomes {
            match outcome {
                EntryOutcome::Refreshed => report.refreshed += 1,
                EntryOutcome::Skipped => report.skipped += 1,
                EntryOutcome::NotOk => report.not_ok += 1,
                EntryOutcome::Failed(failure) => report.failed.push(failure),
            }
        }

        tracing::info!(
            refreshed = report.refreshed,
            skipped = report.skipped,
            not_ok = report.not_ok,
            failed = report.failed.len(),
            "refresh sweep finished"
        );
        Ok(report)
    }

    async fn refresh_entry(&self, store: &CacheStore, key: RequestKey) -> EntryOutcome {
        if self.ctx.policy().classify(key.url()).refresh_exempt {
            tracing::debug!("skipping refresh of {}", key);
            return EntryOutcome::Skipped;
        }

        let request = FetchRequest::new(key);
        let response = match self.ctx.fetcher().fetch(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %request.url(), error = %e, "failed to update");
                return EntryOutcome::Failed(RefreshFailure { url: request.url().to_string(), reason: e.to_string() });
            }
        };

        if !response.is_ok() {
            tracing::debug!("keeping stored {} after status {}", request.key(), response.status());
            return EntryOutcome::NotOk;
        }

        let response = self.ctx.policy().apply(request.url(), response);
        match store.put(request.key(), &response).await {
            Ok(()) => EntryOutcome::Refreshed,
            Err(e) => {
                tracing::error!(url = %request.url(), error = %e, "failed to store refreshed entry");
                EntryOutcome::Failed(RefreshFailure { url: request.url().to_string(), reason: e.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::StubFetcher;
    use swcache_core::policy::COEP_HEADER;
    use swcache_core::{CacheStorage, CacheVersion, PathPolicy, StoredResponse};

    async fn refresh(fetcher: Arc<StubFetcher>) -> (BulkRefresh, CacheStore) {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let ctx = CacheContext::new(
            storage.clone(),
            CacheVersion::new("v1"),
            PathPolicy::new("/Digita", ".vrm"),
            fetcher,
        );
        let store = storage.open_cache("v1").await.unwrap();
        (BulkRefresh::new(ctx), store)
    }

    fn key(url: &str) -> RequestKey {
        RequestKey::new("GET", url).unwrap()
    }

    async fn body_of(store: &CacheStore, url: &str) -> Vec<u8> {
        store.match_request(&key(url)).await.unwrap().unwrap().body().to_vec()
    }

    #[tokio::test]
    async fn test_refresh_skips_exempt_and_updates_others() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher
            .respond("https://app.test/index", StoredResponse::new(200, "OK").with_body("index v2"))
            .respond("https://app.test/models/avatar.vrm", StoredResponse::new(200, "OK").with_body("model v2"));
        let (refresh, store) = refresh(fetcher.clone()).await;
        store
            .put(&key("https://app.test/index"), &StoredResponse::new(200, "OK").with_body("index v1"))
            .await
            .unwrap();
        store
            .put(&key("https://app.test/models/avatar.vrm"), &StoredResponse::new(200, "OK").with_body("model v1"))
            .await
            .unwrap();

        let report = refresh.run().await.unwrap();

        assert_eq!(report.refreshed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(body_of(&store, "https://app.test/index").await, b"index v2");
        assert_eq!(body_of(&store, "https://app.test/models/avatar.vrm").await, b"model v1");
        assert_eq!(fetcher.call_count("https://app.test/models/avatar.vrm"), 0);
    }

    #[tokio::test]
    async fn test_refresh_isolates_failures() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher
            .fail("https://app.test/a", "dns failure")
            .respond("https://app.test/b", StoredResponse::new(200, "OK").with_body("b v2"))
            .respond("https://app.test/c", StoredResponse::new(500, "Internal Server Error"));
        let (refresh, store) = refresh(fetcher).await;
        for url in ["https://app.test/a", "https://app.test/b", "https://app.test/c"] {
            store
                .put(&key(url), &StoredResponse::new(200, "OK").with_body("v1"))
                .await
                .unwrap();
        }

        let report = refresh.run().await.unwrap();

        assert_eq!(report.refreshed, 1);
        assert_eq!(report.not_ok, 1);
        assert_eq!(
            report.failed,
            vec![RefreshFailure { url: "https://app.test/a".into(), reason: "NETWORK_ERROR: dns failure".into() }]
        );
        assert_eq!(body_of(&store, "https://app.test/a").await, b"v1");
        assert_eq!(body_of(&store, "https://app.test/b").await, b"b v2");
        assert_eq!(body_of(&store, "https://app.test/c").await, b"v1");
    }

    #[tokio::test]
    async fn test_refresh_applies_isolation_headers() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/Digita/app.js", StoredResponse::new(200, "OK").with_body("js v2"));
        let (refresh, store) = refresh(fetcher).await;
        store
            .put(&key("https://app.test/Digita/app.js"), &StoredResponse::new(200, "OK").with_body("js v1"))
            .await
            .unwrap();

        refresh.run().await.unwrap();

        let updated = store
            .match_request(&key("https://app.test/Digita/app.js"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.header(COEP_HEADER), Some("require-corp"));
        assert_eq!(updated.body().as_ref(), b"js v2");
    }

    #[tokio::test]
    async fn test_refresh_sends_bare_request() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.respond("https://app.test/settings", StoredResponse::new(200, "OK"));
        let (refresh, store) = refresh(fetcher.clone()).await;
        store
            .put(&key("https://app.test/settings"), &StoredResponse::new(200, "OK"))
            .await
            .unwrap();

        refresh.run().await.unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method(), "GET");
        assert!(requests[0].headers().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_empty_store() {
        let (refresh, _store) = refresh(Arc::new(StubFetcher::new())).await;
        assert_eq!(refresh.run().await.unwrap(), RefreshReport::default());
    }
}
