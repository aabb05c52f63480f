use std::sync::Arc;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::{error, info};

use super::{
    services::{health, upload_batch},
    state::AppState,
};
use crate::config::Config;
use crate::storage::StorageClient;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All routes, with request decompression applied
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/uploads", post(upload_batch))
        .route("/health", get(health))
        .with_state(state)
        // gzip/deflate/brotli request bodies are decoded before the handlers
        .layer(RequestDecompressionLayer::new())
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    let storage = StorageClient::from_config(&config.storage)
        .map_err(|e| format!("Failed to initialize storage: {}", e))?;

    let address = config.server.bind_addr;
    info!(
        concurrency = config.batch.concurrency,
        policy = ?config.batch.failure_policy,
        format = %config.compression.format,
        "Batch pipeline configured"
    );

    let state = AppState::new(config, Arc::new(storage));
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "imgbatch API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
