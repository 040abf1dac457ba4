//! Regression server - fits and serves simple linear regression models
//!
//! Serves the same service over HTTP and gRPC, persisting trained models in
//! the configured store.

use anyhow::{Context, Result};
use slr_lib::{
    storage::{FileStore, MemoryStore, ModelCache, ModelRepository, ModelStore},
    HealthRegistry, RegressionService, StatsAggregator, StructuredLogger,
};
use slr_server::{
    api,
    config::{ServerConfig, StoreBackend},
    grpc,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting slr-server");

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        store = ?config.store,
        cache_capacity = config.cache_capacity,
        "Server configured"
    );

    let store: Arc<dyn ModelStore> = match config.store {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::open(&config.store_path).await?),
    };
    let repository = ModelRepository::new(store, ModelCache::new(config.cache_capacity))
        .with_store_timeout(config.store_timeout());

    let stats = StatsAggregator::spawn();
    let logger = StructuredLogger::new(&config.instance_name);
    let service = RegressionService::new(
        Arc::new(repository),
        stats.clone(),
        HealthRegistry::new(),
        logger.clone(),
    );

    let http_listener = TcpListener::bind(config.http_addr())
        .await
        .with_context(|| format!("cannot bind HTTP listener on {}", config.http_addr()))?;
    let grpc_listener = TcpListener::bind(config.grpc_addr())
        .await
        .with_context(|| format!("cannot bind gRPC listener on {}", config.grpc_addr()))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(());

    let app_state = Arc::new(api::AppState::new(service.clone()));
    let http_handle = tokio::spawn(api::serve(
        http_listener,
        app_state,
        wait_for_shutdown(shutdown_rx.clone()),
    ));
    let grpc_handle = tokio::spawn(grpc::serve(
        grpc_listener,
        service.clone(),
        wait_for_shutdown(shutdown_rx),
    ));

    service.mark_ready().await;
    logger.log_startup(SERVER_VERSION, &config.http_addr(), &config.grpc_addr());

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    service.health().set_ready(false).await;
    let _ = shutdown_tx.send(());

    http_handle.await??;
    grpc_handle.await??;

    stats.flush().await;
    let totals = stats.snapshot().await;
    logger.log_shutdown(
        "SIGINT received",
        totals.total_requests,
        totals.succeeded_requests,
    );

    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<()>) {
    let _ = shutdown.changed().await;
}
