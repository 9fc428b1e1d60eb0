//! Worker components of the cache layer.
//!
//! - [`LifecycleController`]: install populates the current store from the
//!   manifest; activate purges every store whose name is not current.
//! - [`FetchInterceptor`]: cache-first handling of each outgoing request.
//! - [`BulkRefresh`]: best-effort re-fetch of every cached entry.
//! - [`MessageDispatcher`]: turns cross-process messages into refresh runs.
//!
//! All of them share one [`CacheContext`]. The current cache name and the
//! path policy are injected here at construction; nothing reads globals.

pub mod intercept;
pub mod lifecycle;
pub mod message;
pub mod refresh;

use std::sync::Arc;

use swcache_core::{AppConfig, CacheStorage, CacheStore, CacheVersion, Error, PathPolicy};

use crate::fetch::Fetcher;

pub use intercept::{FetchInterceptor, Intercepted, ResponseSource};
pub use lifecycle::{ActivationReport, LifecycleController};
pub use message::{Message, MessageDispatcher};
pub use refresh::{BulkRefresh, RefreshFailure, RefreshReport};

/// Shared state handed to every worker component.
#[derive(Clone)]
pub struct CacheContext {
    storage: CacheStorage,
    version: CacheVersion,
    policy: PathPolicy,
    fetcher: Arc<dyn Fetcher>,
}

impl CacheContext {
    pub fn new(storage: CacheStorage, version: CacheVersion, policy: PathPolicy, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { storage, version, policy, fetcher }
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    /// Open (creating if absent) the store named by the current version.
    pub async fn open_current(&self) -> Result<CacheStore, Error> {
        self.storage.open_cache(self.version.name()).await
    }
}

/// All worker components wired to one context.
#[derive(Clone)]
pub struct ServiceWorker {
    pub context: CacheContext,
    pub lifecycle: LifecycleController,
    pub interceptor: FetchInterceptor,
    pub refresh: BulkRefresh,
    pub dispatcher: MessageDispatcher,
}

impl ServiceWorker {
    /// Build every component from loaded configuration.
    pub fn from_config(config: &AppConfig, storage: CacheStorage, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let scope = config.scope().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let ctx = CacheContext::new(storage, config.version(), config.path_policy(), fetcher);

        let refresh = BulkRefresh::new(ctx.clone());
        Ok(Self {
            lifecycle: LifecycleController::new(ctx.clone(), scope, config.manifest.clone()),
            interceptor: FetchInterceptor::new(ctx.clone()),
            dispatcher: MessageDispatcher::new(refresh.clone()),
            refresh,
            context: ctx,
        })
    }
}
