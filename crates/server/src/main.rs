//! swcache entry point.
//!
//! Boots the cache worker, runs install then activate, and serves fetch and
//! message signals over MCP on stdio. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchConfig, HttpFetcher, ServiceWorker};
use swcache_core::{AppConfig, CacheStorage};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(cache = %config.cache_name, db = %config.db_path.display(), "starting swcache");

    let storage = CacheStorage::open(&config.db_path).await?;
    let fetcher = Arc::new(HttpFetcher::new(FetchConfig::from(&config))?);
    let worker = ServiceWorker::from_config(&config, storage, fetcher)?;

    // Without a successful install the worker never becomes ready.
    worker.lifecycle.install().await?;
    let report = worker.lifecycle.activate().await?;
    if !report.failed.is_empty() {
        tracing::warn!(failed = ?report.failed, "some stale caches could not be deleted");
    }

    tracing::info!("serving on stdio transport");
    let handler = handler::SwCacheServer::new(worker);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
