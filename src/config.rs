//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::feed::RetryPolicy;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of records the cache can hold
    pub cache_capacity: usize,
    /// HTTP server port
    pub server_port: u16,
    /// SQLite database file, None = in-memory store
    pub database_path: Option<String>,
    /// JSON field holding the record key in feed payloads
    pub key_field: String,
    /// Capacity of the in-process feed channel
    pub feed_buffer: usize,
    /// Attempts made when opening the durable store
    pub store_connect_attempts: u32,
    /// Delay between store open attempts in milliseconds
    pub store_connect_backoff_ms: u64,
    /// Drain period for in-flight work on shutdown, in seconds
    pub shutdown_grace_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cached records (default: 1000)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `DATABASE_PATH` - SQLite file path (default: unset, in-memory store)
    /// - `RECORD_KEY_FIELD` - Key field in payloads (default: order_uid)
    /// - `FEED_BUFFER` - Feed channel capacity (default: 1024)
    /// - `STORE_CONNECT_ATTEMPTS` - Store open attempts (default: 10)
    /// - `STORE_CONNECT_BACKOFF_MS` - Delay between attempts (default: 5000)
    /// - `SHUTDOWN_GRACE_SECS` - Shutdown drain period (default: 5)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_capacity: parse_var("CACHE_CAPACITY").unwrap_or(defaults.cache_capacity),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            database_path: env::var("DATABASE_PATH").ok().filter(|p| !p.is_empty()),
            key_field: env::var("RECORD_KEY_FIELD")
                .ok()
                .filter(|f| !f.is_empty())
                .unwrap_or(defaults.key_field),
            feed_buffer: parse_var("FEED_BUFFER")
                .filter(|b| *b > 0)
                .unwrap_or(defaults.feed_buffer),
            store_connect_attempts: parse_var("STORE_CONNECT_ATTEMPTS")
                .unwrap_or(defaults.store_connect_attempts),
            store_connect_backoff_ms: parse_var("STORE_CONNECT_BACKOFF_MS")
                .unwrap_or(defaults.store_connect_backoff_ms),
            shutdown_grace_secs: parse_var("SHUTDOWN_GRACE_SECS")
                .unwrap_or(defaults.shutdown_grace_secs),
        }
    }

    /// Retry policy used when opening the durable store.
    pub fn store_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.store_connect_attempts,
            Duration::from_millis(self.store_connect_backoff_ms),
        )
    }

    /// Shutdown drain period.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: 1000,
            server_port: 8080,
            database_path: None,
            key_field: "order_uid".to_string(),
            feed_buffer: 1024,
            store_connect_attempts: 10,
            store_connect_backoff_ms: 5000,
            shutdown_grace_secs: 5,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
