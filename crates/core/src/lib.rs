//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend
//! - Path classification and header rewriting policy
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod policy;
pub mod url;

pub use cache::{CacheStorage, CacheStore, CacheVersion, RequestKey, StoredResponse};
pub use config::AppConfig;
pub use error::Error;
pub use policy::{PathClass, PathPolicy, rewrite_isolation_headers};
