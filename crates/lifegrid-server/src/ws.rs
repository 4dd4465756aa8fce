//! `WebSocket` handler: one task per connected client.
//!
//! Clients connect to `GET /ws`. On upgrade the session is registered and
//! receives one full grid snapshot. From then on every text frame is
//! decoded as a command, applied under the state lock, and followed by a
//! broadcast to every session. Undecodable frames are dropped silently and
//! the connection stays open.
//!
//! The socket is split: a writer task drains the session's outbound queue
//! while this task reads. A failed write ends the writer, which closes the
//! connection and deregisters the session. A read error or a close frame
//! does the same. There is no reconnection; a new connection is a new
//! session.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::debug;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` session.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive one session from registration to teardown.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (session, mut outbound) = state.connect().await;
    debug!(%session, "WebSocket client connected");

    let (mut sink, mut stream) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(frame)).await {
                debug!(%session, error = %e, "WebSocket send failed");
                return;
            }
        }
        // Queue closed: the session was dropped from the registry.
        let _ = sink.close().await;
    });

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = state.handle_text(text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%session, "WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(%session, error = %e, "WebSocket read error");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Binary, ping and pong frames carry no commands.
                    }
                }
            }
            _ = &mut writer => {
                debug!(%session, "WebSocket writer finished");
                break;
            }
        }
    }

    state.disconnect(session);
    writer.abort();
}
