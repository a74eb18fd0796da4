//! Storage Module
//!
//! Durable record storage behind the [`RecordStore`] trait.
//!
//! # Backends
//! - [`MemoryStore`]: process-local map, used by tests and when no database is configured
//! - [`SqliteStore`]: single-file SQLite database

mod memory;
mod sqlite;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreResult;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

// == Stored Record ==
/// A key and the payload persisted under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub key: String,
    pub payload: Bytes,
}

impl StoredRecord {
    pub fn new(key: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }
}

// == Record Store ==
/// Durable key→payload storage consulted by ingestion, lookup and warmup.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts the record, or fully replaces it if the key exists.
    async fn upsert(&self, key: &str, payload: Bytes) -> StoreResult<()>;

    /// Point lookup. `Ok(None)` means the key is not stored.
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>>;

    /// Returns at most `limit` records, most recently written first.
    async fn enumerate(&self, limit: usize) -> StoreResult<Vec<StoredRecord>>;
}
