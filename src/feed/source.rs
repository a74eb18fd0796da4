//! Event sources for the ingestion path.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

// == Event Source ==
/// A stream of opaque payloads delivered one at a time.
///
/// Delivery may be at-least-once or at-most-once; the ingestion path does not
/// rely on either.
#[async_trait]
pub trait EventSource: Send {
    /// Waits for the next payload. `None` means the feed is closed for good.
    async fn recv(&mut self) -> Option<Bytes>;
}

/// Returned when publishing into a feed whose consumer is gone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("feed is closed")]
pub struct FeedClosed;

/// Creates a bounded in-process feed.
pub fn channel(buffer: usize) -> (FeedPublisher, ChannelSource) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (FeedPublisher { tx }, ChannelSource { rx })
}

// == Feed Publisher ==
/// Producer half of the in-process feed. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FeedPublisher {
    tx: mpsc::Sender<Bytes>,
}

impl FeedPublisher {
    /// Enqueues a payload, waiting for room if the buffer is full.
    pub async fn publish(&self, payload: impl Into<Bytes>) -> Result<(), FeedClosed> {
        self.tx.send(payload.into()).await.map_err(|_| FeedClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// == Channel Source ==
/// Consumer half of the in-process feed.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Bytes>,
}

impl ChannelSource {
    /// Stops accepting new payloads; already-buffered ones can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }
}
