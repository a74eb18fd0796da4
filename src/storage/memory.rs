//! In-memory record store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{RecordStore, StoredRecord};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
struct MemoryRecord {
    payload: Bytes,
    sequence: u64,
}

/// Map-backed [`RecordStore`].
///
/// Can be switched offline to simulate an unreachable database, and counts
/// calls per operation so callers can observe which path touched the store.
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, MemoryRecord>>,
    sequence: AtomicU64,
    available: AtomicBool,
    get_calls: AtomicU64,
    upsert_calls: AtomicU64,
    enumerate_calls: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            available: AtomicBool::new(true),
            get_calls: AtomicU64::new(0),
            upsert_calls: AtomicU64::new(0),
            enumerate_calls: AtomicU64::new(0),
        }
    }

    /// Builds a store pre-loaded with records, oldest first.
    pub fn with_records<I, K, P>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Bytes>,
    {
        let store = Self::new();
        {
            let mut map = store.records.write();
            for (key, payload) in records {
                map.insert(key.into(), store.next_record(payload.into()));
            }
        }
        store
    }

    /// Marks the store reachable or unreachable. While offline every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_calls(&self) -> u64 {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> u64 {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn enumerate_calls(&self) -> u64 {
        self.enumerate_calls.load(Ordering::SeqCst)
    }

    fn next_record(&self, payload: Bytes) -> MemoryRecord {
        MemoryRecord {
            payload,
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
        }
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(&self, key: &str, payload: Bytes) -> StoreResult<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let record = self.next_record(payload);
        self.records.write().insert(key.to_string(), record);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        Ok(self.records.read().get(key).map(|r| r.payload.clone()))
    }

    async fn enumerate(&self, limit: usize) -> StoreResult<Vec<StoredRecord>> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let records = self.records.read();
        let mut newest: Vec<(&String, &MemoryRecord)> = records.iter().collect();
        newest.sort_by(|a, b| b.1.sequence.cmp(&a.1.sequence));

        let selected = newest
            .into_iter()
            .take(limit)
            .map(|(key, record)| StoredRecord::new(key.clone(), record.payload.clone()))
            .collect();
        Ok(selected)
    }
}
