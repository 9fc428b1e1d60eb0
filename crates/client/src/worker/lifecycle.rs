//! Install and activate handling.
//!
//! Install is all-or-nothing: every manifest entry must fetch with an ok
//! status before anything is written. Activation deletes stale stores
//! concurrently and waits for all of them; a failed deletion is reported and
//! does not stop the others.

use futures_util::future::{join_all, try_join_all};
use url::Url;

use swcache_core::url::resolve;
use swcache_core::{Error, RequestKey, StoredResponse};

use super::CacheContext;
use crate::fetch::FetchRequest;

/// Outcome of an activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ActivationReport {
    /// Stale stores that were deleted.
    pub deleted: Vec<String>,
    /// Stale stores whose deletion failed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl ActivationReport {
    fn record(&mut self, name: String, result: Result<bool, Error>) {
        match result {
            Ok(true) => {
                tracing::info!(cache = %name, "deleted stale cache");
                self.deleted.push(name);
            }
            Ok(false) => tracing::debug!(cache = %name, "stale cache already gone"),
            Err(e) => {
                tracing::warn!(cache = %name, error = %e, "failed to delete stale cache");
                self.failed.push((name, e.to_string()));
            }
        }
    }
}

/// Reacts to the install and activate lifecycle signals.
#[derive(Clone)]
pub struct LifecycleController {
    ctx: CacheContext,
    scope: Url,
    manifest: Vec<String>,
}

impl LifecycleController {
    pub fn new(ctx: CacheContext, scope: Url, manifest: Vec<String>) -> Self {
        Self { ctx, scope, manifest }
    }

    /// Pre-populate the current store with the manifest.
    ///
    /// Entries are stored verbatim. Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` if any manifest entry cannot be fetched
    /// or answers with a non-ok status; the store is left untouched.
    pub async fn install(&self) -> Result<usize, Error> {
        let store = self.ctx.open_current().await?;

        let urls = self
            .manifest
            .iter()
            .map(|entry| {
                resolve(&self.scope, entry).map_err(|e| Error::InstallFailed { url: entry.clone(), reason: e.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let entries = try_join_all(urls.into_iter().map(|url| self.fetch_manifest_entry(url))).await?;

        store.put_all(&entries).await?;

        tracing::info!(cache = %self.ctx.version(), entries = entries.len(), "install complete");
        Ok(entries.len())
    }

    async fn fetch_manifest_entry(&self, url: Url) -> Result<(RequestKey, StoredResponse), Error> {
        let key = RequestKey::get(url);
        let request = FetchRequest::new(key.clone());

        let response = self.ctx.fetcher().fetch(&request).await.map_err(|e| {
            tracing::error!(url = %key.url(), error = %e, "manifest fetch failed");
            Error::InstallFailed { url: key.url().to_string(), reason: e.to_string() }
        })?;

        if !response.is_ok() {
            tracing::error!(url = %key.url(), status = response.status(), "manifest entry not ok");
            return Err(Error::InstallFailed {
                url: key.url().to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        Ok((key, response))
    }

    /// Delete every store whose name is not the current version.
    ///
    /// # Errors
    ///
    /// Only enumeration of store names can fail the activation; individual
    /// deletion failures land in the report.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let names = self.ctx.storage().cache_names().await?;
        let stale = self.ctx.version().stale(&names);

        let results = join_all(stale.into_iter().map(|name| async move {
            let result = self.ctx.storage().delete_cache(name).await;
            (name.to_string(), result)
        }))
        .await;

        let mut report = ActivationReport::default();
        for (name, result) in results {
            report.record(name, result);
        }

        tracing::info!(
            cache = %self.ctx.version(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "activation complete"
        );
        Ok(report)
    }
}
