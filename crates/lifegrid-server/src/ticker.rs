//! Periodic driver that advances the grid while the simulation runs.
//!
//! The ticker wakes on a fixed period. On each tick it takes the state
//! lock, steps the grid if the run flag is set, and broadcasts the new
//! generation. When stopped it does nothing until the next tick. Ticks
//! missed because the runtime was busy are skipped rather than replayed
//! in a burst.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::state::AppState;

/// Run the tick loop until `shutdown` becomes `true` or its sender drops.
pub async fn run_ticker(state: Arc<AppState>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; the first step happens one
    // period after startup.
    interval.tick().await;

    info!(period_ms = period.as_millis(), "Ticker started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(delivered) = state.tick().await {
                    debug!(delivered, "Generation broadcast");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Ticker stopped");
                    return;
                }
            }
        }
    }
}

/// Spawn [`run_ticker`] on a background Tokio task.
pub fn spawn_ticker(
    state: Arc<AppState>,
    period: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(run_ticker(state, period, shutdown))
}
