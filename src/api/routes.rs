//! API Routes
//!
//! Configures the Axum router with all order cache endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_record_handler, health_handler, missing_key_handler, publish_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /records/:key` - Look up a record (cache, then store)
/// - `GET /records/` - Rejected as a missing key
/// - `POST /records` - Queue a raw payload for ingestion
/// - `GET /stats` - Cache and ingestion statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests with method, path, status and latency
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/records", post(publish_handler))
        .route("/records/", get(missing_key_handler))
        .route("/records/:key", get(get_record_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
