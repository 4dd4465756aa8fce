//! Simulation core for LifeGrid, a shared multi-client Game of Life.
//!
//! This crate owns everything that touches the authoritative simulation
//! state and nothing that touches the network:
//!
//! # Modules
//!
//! - [`grid`] -- Toroidal binary [`Grid`] and the B3/S23 generation step.
//! - [`patterns`] -- Named, in-memory [`PatternStore`] of grid snapshots.
//! - [`protocol`] -- JSON [`Envelope`] framing and [`Command`] decoding.
//! - [`state`] -- [`SimulationState`], the single value guarded by the
//!   server's state lock, and the command processor that mutates it.
//! - [`config`] -- Configuration loading from `lifegrid-config.yaml` into
//!   strongly-typed structs.
//!
//! [`Grid`]: grid::Grid
//! [`PatternStore`]: patterns::PatternStore
//! [`Envelope`]: protocol::Envelope
//! [`Command`]: protocol::Command
//! [`SimulationState`]: state::SimulationState

pub mod config;
pub mod grid;
pub mod patterns;
pub mod protocol;
pub mod state;

pub use grid::{Grid, GridError};
pub use patterns::PatternStore;
pub use protocol::{Command, DecodeError, Envelope};
pub use state::{Outcome, SimulationState};
