//! API Module
//!
//! HTTP handlers and routing for the order cache REST API.
//!
//! # Endpoints
//! - `GET /records/:key` - Look up a record by key
//! - `POST /records` - Queue a payload on the ingestion feed
//! - `GET /stats` - Cache and ingestion statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
