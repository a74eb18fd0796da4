//! Service Module
//!
//! The cache-coherent read/write path:
//! - Ingestion: validate, upsert into the store, then write through to the cache
//! - Lookup: serve from the cache, fall back to the store and backfill on a miss
//! - Warmup: prime the cache from the store before lookups are served
//!
//! The store is authoritative. A crash between a successful upsert and the
//! cache write leaves the cache stale but safe; the next miss repairs it.

mod context;
mod ingest;
mod lookup;
mod warmup;

pub use context::ServiceContext;
pub use ingest::{IngestSnapshot, Ingestor};
pub use lookup::{LookupOutcome, ReadPath};
pub use warmup::{warm_cache, warmup, WarmupReport};
