//! Client code for swcache.
//!
//! This crate provides the network fetcher and the worker components that
//! sit between the application and the network: lifecycle (install and
//! activate), fetch interception, bulk refresh and message dispatch.

pub mod fetch;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchConfig, FetchRequest, Fetcher, HttpFetcher};
pub use worker::{
    ActivationReport, BulkRefresh, CacheContext, FetchInterceptor, Intercepted, LifecycleController, Message,
    MessageDispatcher, RefreshReport, ResponseSource, ServiceWorker,
};
