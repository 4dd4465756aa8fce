//! Shared application state for the LifeGrid server.
//!
//! [`AppState`] holds the one [`SimulationState`] behind an async mutex,
//! the [`SessionRegistry`], and the [`Broadcaster`]. It is wrapped in
//! [`Arc`] and handed to every connection task and to the ticker.
//!
//! Every path that mutates the simulation follows the same shape: take
//! the lock, mutate, serialize and queue the snapshot, release. Queueing
//! is non-blocking, so the lock is never held across socket I/O.

use std::sync::Arc;

use lifegrid_core::config::LifeGridConfig;
use lifegrid_core::{Command, Grid, SimulationState};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::broadcast::Broadcaster;
use crate::session::{Frame, SessionId, SessionRegistry};

/// Shared state for the Axum application and the ticker.
#[derive(Debug)]
pub struct AppState {
    simulation: Mutex<SimulationState>,
    sessions: Arc<SessionRegistry>,
    broadcaster: Broadcaster,
}

impl AppState {
    /// Create the application state from configuration.
    pub fn new(config: &LifeGridConfig) -> Self {
        Self::from_parts(
            SimulationState::new(&config.grid),
            config.server.session_queue,
        )
    }

    /// Create the application state around an existing simulation.
    pub fn from_parts(simulation: SimulationState, session_queue: usize) -> Self {
        let sessions = Arc::new(SessionRegistry::new(session_queue));
        Self {
            simulation: Mutex::new(simulation),
            broadcaster: Broadcaster::new(Arc::clone(&sessions)),
            sessions,
        }
    }

    /// The session registry.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Number of generations stepped since startup.
    pub async fn generation(&self) -> u64 {
        self.simulation.lock().await.generation()
    }

    /// Copy the current grid.
    pub async fn snapshot(&self) -> Grid {
        self.simulation.lock().await.grid().clone()
    }

    /// Register a new session and queue its initial snapshot.
    ///
    /// Registration happens under the state lock, so the initial snapshot
    /// is always the first frame the session sees.
    pub async fn connect(&self) -> (SessionId, mpsc::Receiver<Frame>) {
        let simulation = self.simulation.lock().await;
        let (id, rx) = self.sessions.register();
        match self.broadcaster.send_to(id, simulation.grid()) {
            Ok(true) => {}
            Ok(false) => debug!(session = %id, "Initial snapshot not delivered"),
            Err(e) => warn!(session = %id, error = %e, "Failed to serialize initial snapshot"),
        }
        debug!(session = %id, sessions = self.sessions.len(), "Session registered");
        (id, rx)
    }

    /// Remove a session.
    pub fn disconnect(&self, id: SessionId) {
        if self.sessions.deregister(id) {
            debug!(session = %id, sessions = self.sessions.len(), "Session deregistered");
            if self.sessions.is_empty() {
                debug!("No sessions connected");
            }
        }
    }

    /// Apply one command and broadcast the resulting grid.
    ///
    /// Returns the number of sessions the snapshot was queued for.
    pub async fn execute(&self, command: &Command) -> usize {
        let mut simulation = self.simulation.lock().await;
        simulation.apply(command);
        self.publish(simulation.grid())
    }

    /// Decode an inbound text frame and execute it.
    ///
    /// Undecodable messages are dropped without a broadcast or a reply and
    /// return `None`.
    pub async fn handle_text(&self, text: &str) -> Option<usize> {
        match Command::decode(text) {
            Ok(command) => Some(self.execute(&command).await),
            Err(e) => {
                debug!(error = %e, "Dropping undecodable message");
                None
            }
        }
    }

    /// Advance one generation if running, and broadcast it.
    ///
    /// Returns `None` when stopped, otherwise the number of sessions the
    /// snapshot was queued for.
    pub async fn tick(&self) -> Option<usize> {
        let mut simulation = self.simulation.lock().await;
        if !simulation.advance() {
            return None;
        }
        Some(self.publish(simulation.grid()))
    }

    fn publish(&self, grid: &Grid) -> usize {
        match self.broadcaster.broadcast(grid) {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!(error = %e, "Failed to serialize grid snapshot");
                0
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&LifeGridConfig::default())
    }
}
