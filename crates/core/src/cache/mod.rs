//! SQLite-backed storage of named cache stores.
//!
//! Each store maps a request identity to a response snapshot. Stores are
//! created lazily when opened by name and removed as a whole; entries have no
//! expiry and live until overwritten or until their store is deleted.
//!
//! - Content-addressed request keys using SHA-256 hashing
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod key;
pub mod migrations;
pub mod response;
pub mod stores;
pub mod version;

pub use crate::Error;

pub use connection::CacheStorage;
pub use entries::{CacheStore, EntryMeta};
pub use key::RequestKey;
pub use response::StoredResponse;
pub use version::CacheVersion;
