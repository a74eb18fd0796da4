//! Order Cache - Record lookup service with a bounded LRU cache
//!
//! Ingests records from an event feed, persists them to a durable store and
//! serves point lookups through a write-through, read-through LRU cache that
//! is warmed from the store at startup.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod service;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::{Ingestor, LookupOutcome, ReadPath, ServiceContext};
pub use tasks::spawn_consumer_task;
