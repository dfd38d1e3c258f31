//! Storage layer for flightcheck.
//!
//! Checklist state lives in a string-to-string key-value store. The
//! [`KeyValueStore`] trait is the seam between the record store and the
//! storage engine; [`SqliteStore`] is the durable engine and [`MemoryStore`]
//! keeps everything in process.

pub mod keys;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StorageStats};

/// An asynchronous, durable string-to-string mapping.
///
/// Implementations report every failure as
/// [`Error::StorageUnavailable`](crate::Error::StorageUnavailable). A single
/// `set` is atomic; there is no atomicity across keys except for
/// `remove_many`, which removes its keys as one batch.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key in `keys` in one batch.
    async fn remove_many(&self, keys: &[String]) -> Result<()>;

    /// List every stored key.
    async fn all_keys(&self) -> Result<Vec<String>>;
}
