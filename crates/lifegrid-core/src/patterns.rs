//! Named, in-memory store of grid snapshots.
//!
//! Entries live for the lifetime of the process. Saving under an existing
//! name replaces the old entry wholesale; entries are never mutated in
//! place and never evicted.

use std::collections::BTreeMap;

use crate::grid::Grid;

/// Mapping from pattern name to a deep copy of a grid.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    patterns: BTreeMap<String, Grid>,
}

impl PatternStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            patterns: BTreeMap::new(),
        }
    }

    /// Store a copy of `grid` under `name`.
    ///
    /// Returns `true` if an existing pattern was overwritten.
    pub fn save(&mut self, name: &str, grid: &Grid) -> bool {
        self.patterns
            .insert(name.to_owned(), grid.clone())
            .is_some()
    }

    /// Look up a stored pattern.
    pub fn get(&self, name: &str) -> Option<&Grid> {
        self.patterns.get(name)
    }

    /// Number of stored patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
