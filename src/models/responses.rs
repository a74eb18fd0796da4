//! Response DTOs for the order cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::service::IngestSnapshot;

/// Response body for publishing onto the feed (POST /records)
#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    /// Acknowledgement message
    pub message: String,
    /// Size of the accepted payload in bytes
    pub bytes: usize,
}

impl PublishResponse {
    /// Creates a new PublishResponse
    pub fn new(bytes: usize) -> Self {
        Self {
            message: "Message queued for ingestion".to_string(),
            bytes,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Bounded cache counters
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Ingestion path counters
    pub ingest: IngestSnapshot,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache and ingestion statistics
    pub fn new(cache: CacheStats, ingest: IngestSnapshot) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
            ingest,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_response_serialize() {
        let resp = PublishResponse::new(42);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["bytes"], 42);
        assert!(json["message"].as_str().unwrap().contains("queued"));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let mut cache = CacheStats::new(10);
        for _ in 0..4 {
            cache.record_hit();
        }
        cache.record_miss();

        let resp = StatsResponse::new(cache, IngestSnapshot::default());
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_stats_response_serialize_nests_sections() {
        let resp = StatsResponse::new(CacheStats::new(3), IngestSnapshot::default());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["cache"]["capacity"], 3);
        assert_eq!(json["ingest"]["received"], 0);
        assert_eq!(json["hit_rate"], 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
