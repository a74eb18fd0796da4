//! Ingestion Path
//!
//! Turns feed payloads into durable records and keeps the cache in step.
//!
//! Per message: parse, extract the key, upsert into the store, and only then
//! put the same raw bytes into the cache. Malformed messages are dropped for
//! good; store failures drop the message and leave the cache untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::IngestError;
use crate::feed::EventSource;
use crate::service::ServiceContext;

#[derive(Debug, Default)]
struct IngestCounters {
    received: AtomicU64,
    persisted: AtomicU64,
    malformed: AtomicU64,
    store_failures: AtomicU64,
}

/// Point-in-time view of the ingestion counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSnapshot {
    /// Messages taken off the feed
    pub received: u64,
    /// Messages upserted and written through to the cache
    pub persisted: u64,
    /// Messages dropped as unparsable or keyless
    pub malformed: u64,
    /// Messages dropped because the store rejected the upsert
    pub store_failures: u64,
}

// == Ingestor ==
/// Write side of the service. Clones share counters.
#[derive(Debug, Clone)]
pub struct Ingestor {
    ctx: ServiceContext,
    key_field: Arc<str>,
    counters: Arc<IngestCounters>,
}

impl Ingestor {
    /// Creates an ingestor that reads record keys from `key_field`.
    pub fn new(ctx: ServiceContext, key_field: impl Into<Arc<str>>) -> Self {
        Self {
            ctx,
            key_field: key_field.into(),
            counters: Arc::default(),
        }
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    // == Extract Key ==
    /// Parses `payload` as JSON and returns the non-empty string at the key field.
    pub fn extract_key(&self, payload: &[u8]) -> Result<String, IngestError> {
        let document: Value = serde_json::from_slice(payload)?;

        match document.get(&*self.key_field) {
            Some(Value::String(key)) if !key.is_empty() => Ok(key.clone()),
            _ => Err(IngestError::MissingKey(self.key_field.to_string())),
        }
    }

    // == Process ==
    /// Ingests one message, returning the key it was stored under.
    ///
    /// The cache is written only after the store accepted the upsert, and it
    /// receives exactly the bytes that were persisted.
    pub async fn process(&self, payload: Bytes) -> Result<String, IngestError> {
        let key = self.extract_key(&payload)?;

        self.ctx
            .store()
            .upsert(&key, payload.clone())
            .await
            .map_err(|source| IngestError::Store {
                key: key.clone(),
                source,
            })?;

        self.ctx.cache().put(key.clone(), payload);
        Ok(key)
    }

    // == Handle ==
    /// Ingests one message, logging and counting the result instead of
    /// returning it. Never fails.
    pub async fn handle(&self, payload: Bytes) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        debug!(bytes = payload.len(), "Received feed message");

        match self.process(payload).await {
            Ok(key) => {
                self.counters.persisted.fetch_add(1, Ordering::Relaxed);
                info!("Record {} saved to store and cache", key);
            }
            Err(err) if err.is_malformed() => {
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                warn!("Dropping malformed message: {}", err);
            }
            Err(err) => {
                self.counters.store_failures.fetch_add(1, Ordering::Relaxed);
                error!("Dropping message after store failure: {}", err);
            }
        }
    }

    // == Run ==
    /// Consumes `source` until it closes or `cancel` fires.
    ///
    /// Cancellation is checked before each receive; a message already being
    /// processed is always finished. Returns the number of messages handled.
    pub async fn run<S>(&self, source: &mut S, cancel: CancellationToken) -> u64
    where
        S: EventSource + ?Sized,
    {
        info!("Ingestion consumer listening for messages...");
        let mut handled = 0;

        loop {
            let payload = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Ingestion consumer shutting down...");
                    break;
                }
                next = source.recv() => match next {
                    Some(payload) => payload,
                    None => {
                        info!("Feed closed, ingestion consumer exiting");
                        break;
                    }
                },
            };

            self.handle(payload).await;
            handled += 1;
        }

        handled
    }

    /// Current ingestion counters.
    pub fn stats(&self) -> IngestSnapshot {
        IngestSnapshot {
            received: self.counters.received.load(Ordering::Relaxed),
            persisted: self.counters.persisted.load(Ordering::Relaxed),
            malformed: self.counters.malformed.load(Ordering::Relaxed),
            store_failures: self.counters.store_failures.load(Ordering::Relaxed),
        }
    }
}
