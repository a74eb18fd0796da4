//! Response models for the order cache API
//!
//! DTOs serialized into HTTP response bodies. Lookup responses are the stored
//! payload itself and have no wrapper type.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, PublishResponse, StatsResponse};
