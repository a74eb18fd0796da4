//! Cache Module
//!
//! Provides the bounded in-memory record cache with LRU eviction.

mod bounded;
mod entry;
mod lru;
mod stats;


// Re-export public types
pub use bounded::{BoundedCache, PutOutcome};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
