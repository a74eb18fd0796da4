//! Bounded Cache Module
//!
//! Fixed-capacity record cache combining HashMap storage with LRU tracking.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::error::CacheError;

// == Put Outcome ==
/// What a [`BoundedCache::put`] did to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new key was inserted with room to spare
    Inserted,
    /// A new key was inserted after evicting the least recently used key
    InsertedWithEviction { evicted: String },
    /// An existing key had its payload replaced
    Updated,
}

#[derive(Debug)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
}

// == Bounded Cache ==
/// Thread-safe LRU cache with a fixed capacity.
///
/// Every operation takes the single inner lock for its whole duration, so the
/// capacity and uniqueness invariants hold for any observer at all times.
/// The cache is content-agnostic: payloads go in and come out unchanged.
#[derive(Debug)]
pub struct BoundedCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

impl BoundedCache {
    // == Constructor ==
    /// Creates a new cache holding at most `capacity` records.
    ///
    /// # Errors
    /// Returns [`CacheError::ZeroCapacity`] when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::ZeroCapacity);
        }

        Ok(Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(capacity),
                lru: LruTracker::with_capacity(capacity),
                stats: CacheStats::new(capacity),
            }),
            capacity,
        })
    }

    // == Get ==
    /// Retrieves a payload by key, marking it most recently used on a hit.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut inner = self.inner.lock();
        let CacheInner {
            entries, lru, stats, ..
        } = &mut *inner;

        match entries.get(key) {
            Some(entry) => {
                lru.touch(entry.slot);
                stats.record_hit();
                Some(entry.payload.clone())
            }
            None => {
                stats.record_miss();
                None
            }
        }
    }

    // == Put ==
    /// Stores a payload under `key`.
    ///
    /// Replacing an existing key refreshes its recency and never evicts.
    /// Inserting a new key into a full cache first evicts exactly one entry,
    /// the least recently used.
    pub fn put(&self, key: impl Into<String>, payload: impl Into<Bytes>) -> PutOutcome {
        let key = key.into();
        let payload = payload.into();

        let mut inner = self.inner.lock();
        let CacheInner {
            entries, lru, stats, ..
        } = &mut *inner;

        if let Some(entry) = entries.get_mut(&key) {
            entry.replace(payload);
            lru.touch(entry.slot);
            stats.record_update();
            return PutOutcome::Updated;
        }

        self.insert_new(&mut *inner, key, payload)
    }

    // == Put If Absent ==
    /// Stores a payload under `key` only if the key is not cached yet.
    ///
    /// An existing entry keeps its payload and only has its recency refreshed;
    /// that payload is returned. Returns `None` when the new payload was
    /// inserted, evicting the least recently used entry if the cache was full.
    pub fn put_if_absent(
        &self,
        key: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Option<Bytes> {
        let key = key.into();

        let mut inner = self.inner.lock();
        let CacheInner { entries, lru, .. } = &mut *inner;

        if let Some(entry) = entries.get(&key) {
            lru.touch(entry.slot);
            return Some(entry.payload.clone());
        }

        self.insert_new(&mut *inner, key, payload.into());
        None
    }

    /// Inserts a key known to be absent, evicting first when at capacity.
    fn insert_new(&self, inner: &mut CacheInner, key: String, payload: Bytes) -> PutOutcome {
        let CacheInner {
            entries, lru, stats, ..
        } = inner;

        let mut outcome = PutOutcome::Inserted;
        if entries.len() >= self.capacity {
            if let Some(evicted) = lru.evict_oldest() {
                entries.remove(&evicted);
                stats.record_eviction();
                outcome = PutOutcome::InsertedWithEviction { evicted };
            }
        }

        let slot = lru.push_front(key.clone());
        entries.insert(key, CacheEntry::new(payload, slot));
        stats.record_insert();
        stats.set_total_entries(entries.len());

        debug_assert_eq!(entries.len(), lru.len());
        debug_assert!(entries.len() <= self.capacity);
        outcome
    }

    // == Contains ==
    /// Checks for a key without touching its recency or the stats.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    // == Keys By Recency ==
    /// Snapshot of cached keys ordered from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.inner.lock().lru.iter().map(str::to_owned).collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed capacity given at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
