// main.rs
mod auth;
mod config;
mod docs;
mod error;
mod handlers;
mod metrics;
mod models;
mod routes;
mod state;
mod storage;
mod utils;

use anyhow::Context;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Settings, StorageBackend};
use models::{AppState, BridgeState};
use state::BridgeStore;
use storage::{DocumentStore, FileStore, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log.level)),
        )
        .init();

    if settings.metrics.enabled {
        metrics::setup_metrics(settings.metrics.port)
            .map_err(|e| anyhow::anyhow!("Failed to setup metrics: {}", e))?;
    }

    let backend: Arc<dyn DocumentStore> = match settings.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(FileStore::new(&settings.storage.path)),
    };
    info!(backend = ?settings.storage.backend, "state storage opened");

    let store = Arc::new(BridgeStore::new(backend));
    let seed = load_seed(settings.bootstrap.seed_path.as_deref()).await?;

    if settings.bootstrap.seed_on_empty
        && store
            .seed_if_empty(&seed)
            .await
            .context("Failed to seed empty store")?
    {
        info!("empty store seeded");
    }
    match store.whitelist().refresh().await {
        Ok(()) => info!(users = store.whitelist().snapshot().len(), "whitelist cache initialized"),
        Err(e) => warn!(error = %e, "whitelist cache starts empty"),
    }

    let app = routes::router(Arc::new(AppState::new(store, seed)));

    let listener = tokio::net::TcpListener::bind(&settings.server.address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind address: {}", e))?;

    tracing::info!("Server started on {}", settings.server.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

/// The configured seed file, or the built-in seed document.
async fn load_seed(path: Option<&str>) -> anyhow::Result<Value> {
    match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read seed file {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("Invalid seed file {path}"))
        }
        None => Ok(serde_json::to_value(BridgeState::seed())?),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutting down");
}
