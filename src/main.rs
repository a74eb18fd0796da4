//! Order Cache - Record lookup service with a bounded LRU cache
//!
//! Ingests records from an event feed, persists them and serves lookups
//! through a write-through, read-through LRU cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use order_cache::api::{create_router, AppState};
use order_cache::error::StoreError;
use order_cache::feed::{self, retry_with_policy};
use order_cache::service::{warm_cache, Ingestor, ServiceContext};
use order_cache::storage::{MemoryStore, RecordStore, SqliteStore};
use order_cache::{spawn_consumer_task, Config};

/// Main entry point for the order cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the durable store, retrying per the configured policy
/// 4. Build the bounded cache and warm it from the store
/// 5. Start the ingestion consumer on the in-process feed
/// 6. Start the HTTP server
/// 7. On SIGINT/SIGTERM, stop the consumer and drain requests within the grace period
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting order cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_capacity={}, port={}, database={}, key_field={}",
        config.cache_capacity,
        config.server_port,
        config.database_path.as_deref().unwrap_or("<memory>"),
        config.key_field
    );

    let store = open_store(&config).await?;
    let ctx = ServiceContext::with_capacity(config.cache_capacity, store)
        .context("invalid CACHE_CAPACITY")?;

    // Warmup runs to completion before the listener is bound
    warm_cache(&ctx).await;

    let (publisher, source) = feed::channel(config.feed_buffer);
    let ingestor = Ingestor::new(ctx.clone(), config.key_field.clone());
    let cancel = CancellationToken::new();
    let consumer = spawn_consumer_task(ingestor.clone(), source, cancel.clone());
    info!("Ingestion consumer started");

    let app = create_router(AppState::new(ctx, ingestor, publisher));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    let server_cancel = cancel.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
    });

    tokio::select! {
        _ = shutdown_signal() => {}
        result = &mut server => {
            error!("Server exited unexpectedly: {:?}", result);
            cancel.cancel();
            let _ = tokio::time::timeout(config.shutdown_grace(), consumer).await;
            anyhow::bail!("HTTP server stopped before shutdown was requested");
        }
    }

    // Stops the consumer loop and starts draining HTTP connections
    cancel.cancel();
    let grace = config.shutdown_grace();

    match tokio::time::timeout(grace, consumer).await {
        Ok(Ok(handled)) => info!("Ingestion consumer drained ({} messages)", handled),
        Ok(Err(e)) => warn!("Ingestion consumer panicked: {}", e),
        Err(_) => warn!("Ingestion consumer did not stop within {:?}", grace),
    }

    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => info!("Server shutdown complete"),
        Ok(Ok(Err(e))) => error!("Server error during shutdown: {}", e),
        Ok(Err(e)) => error!("Server task panicked: {}", e),
        Err(_) => warn!("In-flight requests still running after {:?}, exiting", grace),
    }

    Ok(())
}

/// Opens the configured durable store.
///
/// With `DATABASE_PATH` set, the SQLite file is opened under the retry
/// policy; otherwise records live in process memory.
async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    let Some(path) = config.database_path.clone() else {
        warn!("DATABASE_PATH not set, records will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let store = retry_with_policy(config.store_retry_policy(), "SQLite store", || {
        let path = path.clone();
        async move {
            tokio::task::spawn_blocking(move || SqliteStore::open(path))
                .await
                .map_err(StoreError::from)
                .and_then(|opened| opened)
        }
    })
    .await
    .with_context(|| format!("failed to open SQLite store at {}", path))?;

    info!("Durable store opened at {}", path);
    Ok(Arc::new(store))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
