//! fg-server: HTTP API and the single-slot job supervisor.
//!
//! This crate ties the other fg-* crates into a running server. It provides:
//!
//! - Axum-based HTTP API (`/process`, `/progress`, `/open_output`)
//! - A job supervisor that runs one batch job at a time in the background
//! - Graceful shutdown via signal handling or a [`CancellationToken`]

pub mod context;
pub mod error;
pub mod jobs;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use fg_core::config::Config;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the fragforge server.
///
/// Discovers tools, builds the [`AppContext`] and serves HTTP until a
/// shutdown signal is received or `cancel` is triggered. A job still running
/// at shutdown is aborted; its fragment headers are restored on the way out.
pub async fn start(config: Config, cancel: CancellationToken) -> fg_core::Result<()> {
    // Validate configuration.
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    // Discover external tools.
    let tools = Arc::new(fg_av::ToolRegistry::discover(&config.tools));
    for info in tools.check_all() {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}; jobs will fail to merge", info.name);
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| fg_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext::new(config, tools);
    let app = router::build_router(ctx.clone(), static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| fg_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await
        .map_err(|e| fg_core::Error::Internal(format!("Server error: {e}")))?;

    ctx.jobs.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM) or cancellation.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
