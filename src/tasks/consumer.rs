//! Ingestion Consumer Task
//!
//! Background task that feeds every message from an event source through the
//! ingestion path.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::feed::EventSource;
use crate::service::Ingestor;

/// Spawns the ingestion consumer.
///
/// The task runs until the source closes or `cancel` is triggered. A message
/// already being ingested when cancellation arrives is finished before the
/// task exits.
///
/// # Returns
/// A JoinHandle resolving to the number of messages handled, which can be
/// awaited during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cancel = CancellationToken::new();
/// let consumer = spawn_consumer_task(ingestor, source, cancel.clone());
/// // Later, during shutdown:
/// cancel.cancel();
/// consumer.await?;
/// ```
pub fn spawn_consumer_task<S>(
    ingestor: Ingestor,
    mut source: S,
    cancel: CancellationToken,
) -> JoinHandle<u64>
where
    S: EventSource + 'static,
{
    tokio::spawn(async move {
        info!("Ingestion consumer reading keys from {:?}", ingestor.key_field());
        let handled = ingestor.run(&mut source, cancel).await;
        info!("Ingestion consumer stopped after {} messages", handled);
        handled
    })
}
