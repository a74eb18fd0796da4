//! Feed Module
//!
//! The event feed seen by the ingestion path: a source of opaque payloads,
//! an in-process channel implementation, and the retry policy used to reach
//! external collaborators at startup.

mod retry;
mod source;

pub use retry::{retry_with_policy, RetryPolicy};
pub use source::{channel, ChannelSource, EventSource, FeedClosed, FeedPublisher};
