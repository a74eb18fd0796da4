//! Shared handles for the read and write paths.

use std::sync::Arc;

use crate::cache::BoundedCache;
use crate::error::CacheError;
use crate::storage::RecordStore;

/// The cache and the durable store, shared by ingestion, lookup and warmup.
#[derive(Clone)]
pub struct ServiceContext {
    cache: Arc<BoundedCache>,
    store: Arc<dyn RecordStore>,
}

impl ServiceContext {
    pub fn new(cache: Arc<BoundedCache>, store: Arc<dyn RecordStore>) -> Self {
        Self { cache, store }
    }

    /// Builds a fresh cache of `capacity` entries in front of `store`.
    pub fn with_capacity(
        capacity: usize,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, CacheError> {
        Ok(Self::new(Arc::new(BoundedCache::new(capacity)?), store))
    }

    pub fn cache(&self) -> &Arc<BoundedCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
