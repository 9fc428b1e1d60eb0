//! MCP tool implementations.
//!
//! Each tool delivers one host signal to the cache worker:
//! - `cache_fetch`: a fetch signal for the interceptor
//! - `post_message`: a cross-process message
//! - `cache_keys`: a read-only view of the current store

pub mod cache;
pub mod fetch;
pub mod message;

pub use cache::{CacheKeysOutput, keys_impl};
pub use fetch::{CacheFetchOutput, CacheFetchParams, fetch_impl};
pub use message::{PostMessageOutput, PostMessageParams, message_impl};
