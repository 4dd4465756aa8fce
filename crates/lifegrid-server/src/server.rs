//! HTTP server lifecycle management.
//!
//! Binding and serving are separate steps so that a bind failure surfaces
//! to the caller before anything runs in the background.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use lifegrid_core::config::ServerConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::ServerError;

/// Resolve the configured listen address.
pub fn listen_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))
}

/// Bind a TCP listener on the configured address.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = listen_addr(config)?;
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// Returns `Ok(())` on clean shutdown.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "LifeGrid server listening");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))
}
