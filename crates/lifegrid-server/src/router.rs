//! Axum router construction for the LifeGrid server.
//!
//! Mounts the simulation `WebSocket` at `/ws` and serves the front-end
//! assets from a directory at every other path.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /ws` -- simulation `WebSocket`
/// - everything else -- static files from `static_dir` (`/` serves
///   `index.html`)
pub fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
