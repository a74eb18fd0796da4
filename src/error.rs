//! Error types for the order cache service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error ==
/// Errors raised while building the bounded cache.
///
/// Cache operations themselves are infallible; only construction can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be at least one entry
    #[error("Cache capacity must be at least 1")]
    ZeroCapacity,
}

// == Store Error ==
/// Errors surfaced by a durable store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// SQLite backend failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Blocking worker panicked or was cancelled
    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// == Ingest Error ==
/// Reasons a single feed message was dropped by the ingestion path.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Payload is not well-formed JSON
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Payload has no usable record key
    #[error("Missing or empty key field '{0}'")]
    MissingKey(String),

    /// Upsert into the durable store failed
    #[error("Store write failed for key '{key}': {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl IngestError {
    /// Malformed input is permanent; store failures are transient.
    pub fn is_malformed(&self) -> bool {
        matches!(self, IngestError::Malformed(_) | IngestError::MissingKey(_))
    }
}

// == API Error ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Record key missing or empty
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// No record stored under the key
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Durable store failed while serving the request
    #[error("Store error: {0}")]
    Store(String),

    /// Feed is closed and cannot accept messages
    #[error("Feed unavailable: {0}")]
    FeedClosed(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::FeedClosed(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Convenience Result type for store backends.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
