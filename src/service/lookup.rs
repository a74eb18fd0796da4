//! Read Path
//!
//! Cache first, store on a miss, backfill the cache from the store.

use bytes::Bytes;
use tracing::{debug, error};

use crate::service::ServiceContext;

/// Result of a single lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Payload from the cache or, after backfill, from the store
    Found(Bytes),
    /// Neither the cache nor the store holds the key
    NotFound,
    /// The key was empty; nothing was looked up
    InvalidKey,
    /// The cache missed and the store failed
    StoreError(String),
}

/// Read side of the service.
#[derive(Debug, Clone)]
pub struct ReadPath {
    ctx: ServiceContext,
}

impl ReadPath {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Looks up `key`.
    ///
    /// A cache hit never touches the store. A store hit is put into the cache
    /// before returning, unless ingestion cached the key while the store read
    /// was in flight; that entry is newer and is returned instead. Misses and
    /// store errors leave the cache as it was, so a key that is missing now is
    /// found as soon as it gets ingested.
    pub async fn lookup(&self, key: &str) -> LookupOutcome {
        if key.is_empty() {
            return LookupOutcome::InvalidKey;
        }

        if let Some(payload) = self.ctx.cache().get(key) {
            debug!("Cache hit for {}", key);
            return LookupOutcome::Found(payload);
        }

        match self.ctx.store().get(key).await {
            Ok(Some(payload)) => match self.ctx.cache().put_if_absent(key, payload.clone()) {
                None => {
                    debug!("Cache miss for {}, backfilled from store", key);
                    LookupOutcome::Found(payload)
                }
                Some(current) => {
                    debug!("Cache miss for {}, ingested during store read", key);
                    LookupOutcome::Found(current)
                }
            },
            Ok(None) => LookupOutcome::NotFound,
            Err(err) => {
                error!("Store lookup failed for {}: {}", key, err);
                LookupOutcome::StoreError(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreResult;
    use crate::service::Ingestor;
    use crate::storage::{MemoryStore, RecordStore, StoredRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn setup(
        store: MemoryStore,
        capacity: usize,
    ) -> (Arc<MemoryStore>, ServiceContext, ReadPath) {
        let store = Arc::new(store);
        let ctx = ServiceContext::with_capacity(capacity, store.clone()).unwrap();
        let reads = ReadPath::new(ctx.clone());
        (store, ctx, reads)
    }

    #[tokio::test]
    async fn test_empty_key_is_invalid() {
        let (store, _, reads) = setup(MemoryStore::new(), 4);

        assert_eq!(reads.lookup("").await, LookupOutcome::InvalidKey);
        assert_eq!(store.get_calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let (store, ctx, reads) = setup(MemoryStore::new(), 4);
        ctx.cache().put("k", "cached");

        assert_eq!(
            reads.lookup("k").await,
            LookupOutcome::Found(Bytes::from_static(b"cached"))
        );
        assert_eq!(store.get_calls(), 0);
    }

    #[tokio::test]
    async fn test_read_through_backfills_once() {
        let (store, ctx, reads) = setup(MemoryStore::with_records([("k", "stored")]), 4);

        let first = reads.lookup("k").await;
        let second = reads.lookup("k").await;

        assert_eq!(first, LookupOutcome::Found(Bytes::from_static(b"stored")));
        assert_eq!(first, second);
        assert_eq!(store.get_calls(), 1, "second lookup must be served from cache");
        assert!(ctx.cache().contains("k"));
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let (store, ctx, reads) = setup(MemoryStore::new(), 4);

        assert_eq!(reads.lookup("missing").await, LookupOutcome::NotFound);
        assert_eq!(reads.lookup("missing").await, LookupOutcome::NotFound);
        assert_eq!(store.get_calls(), 2);
        assert!(ctx.cache().is_empty());

        let ingestor = Ingestor::new(ctx.clone(), "order_uid");
        ingestor
            .process(Bytes::from_static(br#"{"order_uid":"missing"}"#))
            .await
            .unwrap();

        assert_eq!(
            reads.lookup("missing").await,
            LookupOutcome::Found(Bytes::from_static(br#"{"order_uid":"missing"}"#))
        );
    }

    #[tokio::test]
    async fn test_store_error_leaves_cache_untouched() {
        let (store, ctx, reads) = setup(MemoryStore::with_records([("k", "v")]), 4);
        store.set_available(false);

        assert!(matches!(reads.lookup("k").await, LookupOutcome::StoreError(_)));
        assert!(ctx.cache().is_empty());

        store.set_available(true);
        assert_eq!(
            reads.lookup("k").await,
            LookupOutcome::Found(Bytes::from_static(b"v"))
        );
    }

    #[tokio::test]
    async fn test_lookup_never_writes_store() {
        let records = MemoryStore::with_records([("a", "1"), ("b", "2")]);
        let (store, _, reads) = setup(records, 1);

        for _ in 0..3 {
            reads.lookup("a").await;
            reads.lookup("b").await;
        }

        assert_eq!(store.upsert_calls(), 0);
        assert_eq!(store.get("a").await.unwrap(), Some(Bytes::from_static(b"1")));
    }

    #[tokio::test]
    async fn test_write_through_consistency() {
        let (store, ctx, reads) = setup(MemoryStore::new(), 2);
        let ingestor = Ingestor::new(ctx, "order_uid");
        let payload = Bytes::from_static(br#"{"order_uid":"o-9","amount":1817}"#);

        ingestor.process(payload.clone()).await.unwrap();

        assert_eq!(reads.lookup("o-9").await, LookupOutcome::Found(payload.clone()));
        assert_eq!(store.get_calls(), 0, "lookup after ingest is a cache hit");
        assert_eq!(store.get("o-9").await.unwrap(), Some(payload));
    }

    /// Store whose first `get` reads the record, then waits to be released
    /// before returning it.
    struct PausingStore {
        inner: MemoryStore,
        paused: AtomicBool,
        reached: Notify,
        release: Notify,
    }

    impl PausingStore {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                paused: AtomicBool::new(false),
                reached: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl RecordStore for PausingStore {
        async fn upsert(&self, key: &str, payload: Bytes) -> StoreResult<()> {
            self.inner.upsert(key, payload).await
        }

        async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
            let payload = self.inner.get(key).await?;
            if !self.paused.swap(true, Ordering::SeqCst) {
                self.reached.notify_one();
                self.release.notified().await;
            }
            Ok(payload)
        }

        async fn enumerate(&self, limit: usize) -> StoreResult<Vec<StoredRecord>> {
            self.inner.enumerate(limit).await
        }
    }

    #[tokio::test]
    async fn test_backfill_never_replaces_newer_ingested_payload() {
        let v1 = Bytes::from_static(br#"{"order_uid":"k","v":1}"#);
        let v2 = Bytes::from_static(br#"{"order_uid":"k","v":2}"#);
        let store = Arc::new(PausingStore::new(MemoryStore::with_records([(
            "k",
            v1.clone(),
        )])));
        let ctx = ServiceContext::with_capacity(4, store.clone()).unwrap();
        let reads = ReadPath::new(ctx.clone());
        let ingestor = Ingestor::new(ctx.clone(), "order_uid");

        // The lookup misses the cache and reads v1 from the store
        let pending = tokio::spawn({
            let reads = reads.clone();
            async move { reads.lookup("k").await }
        });
        store.reached.notified().await;

        // v2 is persisted and written through before the read completes
        ingestor.process(v2.clone()).await.unwrap();
        store.release.notify_one();

        assert_eq!(pending.await.unwrap(), LookupOutcome::Found(v2.clone()));
        assert_eq!(store.get("k").await.unwrap(), Some(v2.clone()));
        assert_eq!(ctx.cache().get("k"), Some(v2.clone()));
        assert_eq!(reads.lookup("k").await, LookupOutcome::Found(v2));
    }
}
