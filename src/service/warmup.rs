//! Warmup
//!
//! Primes the cache from the store once, before lookups are served.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::service::ServiceContext;

/// What warmup loaded into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    /// Records put into the cache
    pub loaded: usize,
    /// Cache capacity, the upper bound on `loaded`
    pub capacity: usize,
}

/// Loads the `capacity` most recently written records.
///
/// Records are put oldest first so the newest one ends up most recently
/// used. Never issues more puts than the cache can hold, even if the store
/// hands back more rows than asked for.
pub async fn warmup(ctx: &ServiceContext) -> Result<WarmupReport, StoreError> {
    let capacity = ctx.cache().capacity();
    let records = ctx.store().enumerate(capacity).await?;

    let mut loaded = 0;
    for record in records.into_iter().take(capacity).rev() {
        ctx.cache().put(record.key, record.payload);
        loaded += 1;
    }

    Ok(WarmupReport { loaded, capacity })
}

/// Runs [`warmup`], treating failure as an empty cache.
///
/// The read path backfills on demand, so a store that cannot be enumerated
/// only costs cold-start latency.
pub async fn warm_cache(ctx: &ServiceContext) -> WarmupReport {
    match warmup(ctx).await {
        Ok(report) => {
            info!(
                "Cache warmup complete: {} records loaded (capacity {})",
                report.loaded, report.capacity
            );
            report
        }
        Err(err) => {
            warn!("Cache warmup failed, starting with an empty cache: {}", err);
            WarmupReport {
                loaded: 0,
                capacity: ctx.cache().capacity(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreResult;
    use crate::storage::{MemoryStore, RecordStore, StoredRecord};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Arc;

    fn records(n: usize) -> Vec<(String, String)> {
        (0..n)
            .map(|i| (format!("order-{}", i), format!(r#"{{"n":{}}}"#, i)))
            .collect()
    }

    #[tokio::test]
    async fn test_warmup_fills_to_capacity() {
        let store = Arc::new(MemoryStore::with_records(records(10)));
        let ctx = ServiceContext::with_capacity(4, store.clone()).unwrap();

        let report = warmup(&ctx).await.unwrap();

        assert_eq!(report, WarmupReport { loaded: 4, capacity: 4 });
        assert_eq!(store.enumerate_calls(), 1);
        assert_eq!(ctx.cache().len(), 4);
        assert_eq!(ctx.cache().stats().evictions, 0);
        // Newest records win
        assert!(ctx.cache().contains("order-9"));
        assert!(!ctx.cache().contains("order-0"));
    }

    #[tokio::test]
    async fn test_warmup_leaves_newest_most_recently_used() {
        let store = Arc::new(MemoryStore::with_records([
            ("old", "1"),
            ("mid", "2"),
            ("new", "3"),
        ]));
        let ctx = ServiceContext::with_capacity(3, store).unwrap();

        warmup(&ctx).await.unwrap();
        assert_eq!(ctx.cache().keys_by_recency(), vec!["new", "mid", "old"]);

        ctx.cache().put("fresh", "4");
        assert_eq!(ctx.cache().keys_by_recency(), vec!["fresh", "new", "mid"]);
    }

    #[tokio::test]
    async fn test_warmup_small_store_loads_everything() {
        let store = Arc::new(MemoryStore::with_records(records(2)));
        let ctx = ServiceContext::with_capacity(8, store).unwrap();

        let report = warm_cache(&ctx).await;

        assert_eq!(report.loaded, 2);
        assert_eq!(
            ctx.cache().get("order-1"),
            Some(Bytes::from_static(br#"{"n":1}"#))
        );
    }

    #[tokio::test]
    async fn test_warmup_failure_is_not_fatal() {
        let store = Arc::new(MemoryStore::with_records(records(3)));
        store.set_available(false);
        let ctx = ServiceContext::with_capacity(2, store.clone()).unwrap();

        assert!(warmup(&ctx).await.is_err());
        let report = warm_cache(&ctx).await;

        assert_eq!(report.loaded, 0);
        assert!(ctx.cache().is_empty());
    }

    /// Store that ignores the limit and returns every record.
    struct Oversharing(Vec<StoredRecord>);

    #[async_trait]
    impl RecordStore for Oversharing {
        async fn upsert(&self, _key: &str, _payload: Bytes) -> StoreResult<()> {
            Ok(())
        }

        async fn get(&self, _key: &str) -> StoreResult<Option<Bytes>> {
            Ok(None)
        }

        async fn enumerate(&self, _limit: usize) -> StoreResult<Vec<StoredRecord>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_warmup_never_exceeds_capacity_puts() {
        let rows = records(6)
            .into_iter()
            .map(|(k, v)| StoredRecord::new(k, v))
            .collect();
        let ctx = ServiceContext::with_capacity(3, Arc::new(Oversharing(rows))).unwrap();

        let report = warmup(&ctx).await.unwrap();

        assert_eq!(report.loaded, 3);
        assert_eq!(ctx.cache().keys_by_recency(), vec!["order-0", "order-1", "order-2"]);
        assert_eq!(ctx.cache().stats().inserts, 3);
        assert_eq!(ctx.cache().stats().evictions, 0);
    }
}
