//! Cache Entry Module
//!
//! Defines the structure for individual cache entries.

use bytes::Bytes;

// == Cache Entry ==
/// Represents a single cached record: its payload and its place in the
/// recency list.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload, returned unchanged on hits
    pub payload: Bytes,
    /// Slot of this entry's key in the LRU tracker
    pub(crate) slot: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry bound to an LRU slot.
    pub(crate) fn new(payload: Bytes, slot: usize) -> Self {
        Self { payload, slot }
    }

    // == Replace ==
    /// Swaps in a new payload, returning the previous one.
    pub fn replace(&mut self, payload: Bytes) -> Bytes {
        std::mem::replace(&mut self.payload, payload)
    }
}
