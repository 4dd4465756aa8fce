//! Authoritative simulation state and the command processor.
//!
//! [`SimulationState`] bundles the grid, the run flag and the pattern store
//! into the one value the server keeps behind its state lock. Every
//! mutation, whether from a client command or from the ticker, goes
//! through a `&mut SimulationState`, so holding the lock is the only way to
//! observe or change the simulation.

use rand::Rng;
use tracing::debug;

use crate::config::GridConfig;
use crate::grid::Grid;
use crate::patterns::PatternStore;
use crate::protocol::Command;

/// What applying a command did to the simulation.
///
/// Informational only: every decoded command is broadcast regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The grid, the run flag, or the pattern store changed.
    Applied,
    /// Nothing changed (toggle out of bounds, unknown pattern, redundant
    /// start or stop).
    NoOp,
}

/// The grid, run flag and pattern store shared by all sessions.
#[derive(Debug, Clone)]
pub struct SimulationState {
    grid: Grid,
    running: bool,
    patterns: PatternStore,
    density: f64,
    generation: u64,
}

impl SimulationState {
    /// Create a stopped simulation with an all-dead grid.
    pub fn new(config: &GridConfig) -> Self {
        Self {
            grid: Grid::new(config.rows, config.cols),
            running: false,
            patterns: PatternStore::new(),
            density: config.random_density,
            generation: 0,
        }
    }

    /// The current grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Whether the ticker should advance the grid.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Saved patterns.
    pub const fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    /// Number of generations stepped since startup.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one command, using the thread-local RNG for randomization.
    pub fn apply(&mut self, command: &Command) -> Outcome {
        self.apply_with_rng(command, &mut rand::rng())
    }

    /// Apply one command with an explicit RNG.
    pub fn apply_with_rng<R: Rng>(&mut self, command: &Command, rng: &mut R) -> Outcome {
        let outcome = match command {
            Command::Toggle { x, y } => outcome_of(self.grid.toggle(*x, *y)),
            Command::Start => outcome_of(!std::mem::replace(&mut self.running, true)),
            Command::Stop => outcome_of(std::mem::replace(&mut self.running, false)),
            Command::Clear => {
                self.grid.clear();
                Outcome::Applied
            }
            Command::Randomize => {
                self.grid.randomize(self.density, rng);
                Outcome::Applied
            }
            Command::Save { name } => {
                self.patterns.save(name, &self.grid);
                Outcome::Applied
            }
            Command::Load { name } => match self.patterns.get(name) {
                Some(pattern) => {
                    self.grid = pattern.clone();
                    Outcome::Applied
                }
                None => Outcome::NoOp,
            },
        };

        debug!(command = command.kind(), ?outcome, "Command applied");
        outcome
    }

    /// Advance one generation if running.
    ///
    /// Returns `true` if the grid was replaced.
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.grid = self.grid.step();
        self.generation = self.generation.saturating_add(1);
        true
    }
}

const fn outcome_of(changed: bool) -> Outcome {
    if changed { Outcome::Applied } else { Outcome::NoOp }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_config() -> GridConfig {
        GridConfig {
            rows: 8,
            cols: 8,
            ..GridConfig::default()
        }
    }

    fn toggle(x: i64, y: i64) -> Command {
        Command::Toggle { x, y }
    }

    fn save(name: &str) -> Command {
        Command::Save {
            name: name.to_owned(),
        }
    }

    fn load(name: &str) -> Command {
        Command::Load {
            name: name.to_owned(),
        }
    }

    #[test]
    fn starts_stopped_and_empty() {
        let state = SimulationState::new(&GridConfig::default());
        assert!(!state.is_running());
        assert_eq!(state.grid().rows(), 200);
        assert_eq!(state.grid().live_count(), 0);
        assert!(state.patterns().is_empty());
    }

    #[test]
    fn toggle_flips_cell() {
        let mut state = SimulationState::new(&small_config());
        assert_eq!(state.apply(&toggle(2, 5)), Outcome::Applied);
        assert!(state.grid().is_alive(2, 5));
    }

    #[test]
    fn toggle_out_of_bounds_is_noop() {
        let mut state = SimulationState::new(&small_config());
        assert_eq!(state.apply(&toggle(8, 0)), Outcome::NoOp);
        assert_eq!(state.apply(&toggle(0, -3)), Outcome::NoOp);
        assert_eq!(state.grid().live_count(), 0);
    }

    #[test]
    fn stop_when_stopped_is_idempotent() {
        let mut state = SimulationState::new(&small_config());
        state.apply(&toggle(1, 1));
        let before = state.grid().clone();

        assert_eq!(state.apply(&Command::Stop), Outcome::NoOp);
        assert!(!state.is_running());
        assert_eq!(state.grid(), &before);
    }

    #[test]
    fn start_twice_stays_running() {
        let mut state = SimulationState::new(&small_config());
        assert_eq!(state.apply(&Command::Start), Outcome::Applied);
        assert_eq!(state.apply(&Command::Start), Outcome::NoOp);
        assert!(state.is_running());
        assert_eq!(state.apply(&Command::Stop), Outcome::Applied);
        assert!(!state.is_running());
    }

    #[test]
    fn clear_kills_everything() {
        let mut state = SimulationState::new(&small_config());
        state.apply(&toggle(0, 0));
        state.apply(&toggle(7, 7));
        state.apply(&Command::Clear);
        assert_eq!(state.grid(), &Grid::new(8, 8));
    }

    #[test]
    fn save_clear_load_round_trip() {
        let mut state = SimulationState::new(&GridConfig::default());
        let mut rng = StdRng::seed_from_u64(42);
        state.apply_with_rng(&Command::Randomize, &mut rng);
        let snapshot = state.grid().clone();

        state.apply(&save("soup"));
        state.apply(&Command::Clear);
        assert_eq!(state.grid().live_count(), 0);

        assert_eq!(state.apply(&load("soup")), Outcome::Applied);
        assert_eq!(state.grid(), &snapshot);
    }

    #[test]
    fn load_is_a_copy_of_the_stored_pattern() {
        let mut state = SimulationState::new(&small_config());
        state.apply(&toggle(3, 3));
        state.apply(&save("dot"));
        state.apply(&load("dot"));
        state.apply(&toggle(3, 3));

        let stored = state.patterns().get("dot");
        assert!(stored.is_some_and(|g| g.is_alive(3, 3)));
    }

    #[test]
    fn unknown_load_is_noop() {
        let mut state = SimulationState::new(&small_config());
        state.apply(&toggle(4, 2));
        let before = state.grid().clone();

        assert_eq!(state.apply(&load("nonexistent")), Outcome::NoOp);
        assert_eq!(state.grid(), &before);
    }

    #[test]
    fn advance_only_when_running() {
        let mut state = SimulationState::new(&small_config());
        state.apply(&toggle(1, 2));
        state.apply(&toggle(2, 2));
        state.apply(&toggle(3, 2));

        assert!(!state.advance());
        assert_eq!(state.generation(), 0);
        assert!(state.grid().is_alive(1, 2));

        state.apply(&Command::Start);
        assert!(state.advance());
        assert_eq!(state.generation(), 1);
        assert!(state.grid().is_alive(2, 1));
        assert!(!state.grid().is_alive(1, 2));
    }

    #[test]
    fn randomize_uses_configured_density() {
        let config = GridConfig {
            random_density: 1.0,
            ..small_config()
        };
        let mut state = SimulationState::new(&config);
        state.apply(&Command::Randomize);
        assert_eq!(state.grid().live_count(), 64);
    }
}
