//! Server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_server`] which binds the listener and launches the
//! HTTP + `WebSocket` server on a background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lifegrid_server::{AppState, spawn_server};
//! use std::sync::Arc;
//!
//! let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let state = Arc::new(AppState::new(&config));
//! let handle = spawn_server(&config.server, state, shutdown_rx).await?;
//! // The server is now running on handle.addr.
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use lifegrid_core::config::ServerConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::ServerError;
use crate::router::build_router;
use crate::server;
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A running server.
#[derive(Debug)]
pub struct ServerHandle {
    /// The address actually bound (resolves port `0`).
    pub addr: SocketAddr,
    /// The background serve task.
    pub task: JoinHandle<Result<(), ServerError>>,
}

/// Bind the listener and serve on a background Tokio task.
///
/// The bind happens before this function returns, so an unavailable
/// address is reported here rather than from inside the task. The server
/// shuts down gracefully once `shutdown` becomes `true` or its sender is
/// dropped.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<ServerHandle, StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let router = build_router(state, Path::new(&config.static_dir));
    let signal = async move {
        let _ = shutdown.wait_for(|stop| *stop).await;
    };

    let task = tokio::spawn(async move {
        let result = server::serve(listener, router, signal).await;
        if let Err(e) = &result {
            error!(error = %e, "Server exited with error");
        }
        result
    });

    info!(%addr, static_dir = %config.static_dir, "Server spawned on background task");

    Ok(ServerHandle { addr, task })
}
