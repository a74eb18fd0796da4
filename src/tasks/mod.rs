//! Background Tasks Module
//!
//! Contains the long-lived tasks that run alongside the HTTP server.
//!
//! # Tasks
//! - Ingestion consumer: drains the feed into the store and cache until cancelled

mod consumer;

pub use consumer::spawn_consumer_task;
