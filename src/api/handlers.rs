//! API Handlers
//!
//! HTTP request handlers for each order cache endpoint.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ApiError, Result};
use crate::feed::FeedPublisher;
use crate::models::{HealthResponse, PublishResponse, StatsResponse};
use crate::service::{Ingestor, LookupOutcome, ReadPath, ServiceContext};

/// Application state shared across all handlers.
///
/// Holds the read path, the ingestor (for its counters) and the publishing
/// half of the feed. All members are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Cache-first lookups with store fallback
    pub reads: ReadPath,
    /// Ingestion path, shared with the consumer task
    pub ingestor: Ingestor,
    /// Producer side of the in-process feed
    pub publisher: FeedPublisher,
    ctx: ServiceContext,
}

impl AppState {
    /// Creates a new AppState over a service context.
    pub fn new(ctx: ServiceContext, ingestor: Ingestor, publisher: FeedPublisher) -> Self {
        Self {
            reads: ReadPath::new(ctx.clone()),
            ingestor,
            publisher,
            ctx,
        }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }
}

/// Handler for GET /records/:key
///
/// Returns the stored payload as-is with a JSON content type.
pub async fn get_record_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    match state.reads.lookup(&key).await {
        LookupOutcome::Found(payload) => {
            Ok(([(header::CONTENT_TYPE, "application/json")], payload).into_response())
        }
        LookupOutcome::NotFound => Err(ApiError::NotFound(key)),
        LookupOutcome::InvalidKey => Err(ApiError::InvalidKey("record key is required".into())),
        LookupOutcome::StoreError(_) => Err(ApiError::Store("lookup failed".into())),
    }
}

/// Handler for GET /records/ (no key)
pub async fn missing_key_handler() -> ApiError {
    ApiError::InvalidKey("record key is required".into())
}

/// Handler for POST /records
///
/// Queues the raw body on the feed. Validation happens in the consumer, so a
/// malformed body is accepted here and dropped during ingestion.
pub async fn publish_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<PublishResponse>)> {
    let size = body.len();
    state
        .publisher
        .publish(body)
        .await
        .map_err(|err| ApiError::FeedClosed(err.to_string()))?;

    Ok((StatusCode::ACCEPTED, Json(PublishResponse::new(size))))
}

/// Handler for GET /stats
///
/// Returns cache and ingestion counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.ctx.cache().stats(),
        state.ingestor.stats(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
