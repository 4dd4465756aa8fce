//! Multi-client WebSocket server for the LifeGrid simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) where each client receives a full
//!   grid snapshot on connect and after every state change, and may send
//!   commands that mutate the shared grid
//! - **Static front-end assets** served from a configured directory at
//!   every other path
//!
//! # Architecture
//!
//! One [`SimulationState`] lives behind a single async mutex inside
//! [`AppState`]. Client commands and the [`ticker`] both mutate it under
//! that lock, serialize the resulting grid once, and enqueue the frame on
//! every registered session's bounded queue before releasing it. Each
//! connection owns a writer task that drains its queue to the socket, so
//! no network write ever happens while the state lock is held, and every
//! client sees snapshots in the same order the lock granted them.
//!
//! A session whose queue is closed or full is dropped from the
//! [`SessionRegistry`] on the next broadcast and never retried.
//!
//! [`SimulationState`]: lifegrid_core::SimulationState
//! [`AppState`]: state::AppState
//! [`SessionRegistry`]: session::SessionRegistry

pub mod broadcast;
pub mod error;
pub mod router;
pub mod server;
pub mod session;
pub mod startup;
pub mod state;
pub mod ticker;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ServerError;
pub use router::build_router;
pub use startup::{ServerHandle, StartupError, spawn_server};
pub use state::AppState;
pub use ticker::spawn_ticker;
