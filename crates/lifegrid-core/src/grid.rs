//! Toroidal binary grid and the B3/S23 generation step.
//!
//! A [`Grid`] is a fixed-size rectangle of cells that are either dead (`0`)
//! or alive (`1`), stored row-major in a flat buffer. The grid wraps at
//! both edges: column `cols - 1` neighbours column `0` and row `rows - 1`
//! neighbours row `0`, so there are no boundary cells.
//!
//! # Design Principles
//!
//! - Dimensions are fixed at construction. Every operation that replaces
//!   the grid (step, clear, load) produces a grid of the same shape.
//! - [`Grid::step`] is pure. Neighbour counts are always taken from the
//!   previous generation, never from a partially updated buffer.
//! - Coordinates arriving from clients are untrusted. Out-of-range and
//!   negative coordinates are ignored rather than faulting.

use rand::Rng;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Default number of rows.
pub const DEFAULT_ROWS: usize = 200;

/// Default number of columns.
pub const DEFAULT_COLS: usize = 200;

/// Default probability that a cell is alive after randomization.
pub const DEFAULT_DENSITY: f64 = 0.3;

/// Largest grid, in cells, a configuration may ask for (4096 x 4096).
pub const MAX_CELLS: usize = 1 << 24;

const DEAD: u8 = 0;
const ALIVE: u8 = 1;

/// Errors raised when building a grid from caller-supplied rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The grid has no rows or no columns.
    #[error("grid must have at least one row and one column")]
    Empty,

    /// A row's length differs from the first row's length.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// A cell holds something other than `0` or `1`.
    #[error("cell ({x}, {y}) has value {value}, expected 0 or 1")]
    InvalidCell {
        /// Column of the offending cell.
        x: usize,
        /// Row of the offending cell.
        y: usize,
        /// The value found.
        value: u8,
    },
}

/// A fixed-size toroidal grid of binary cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Create an all-dead grid with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![DEAD; rows.saturating_mul(cols)],
        }
    }

    /// Build a grid from row-major nested rows.
    ///
    /// Every row must have the same non-zero length and every value must
    /// be `0` or `1`.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, GridError> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(rows.len().saturating_mul(cols));
        for (y, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (x, &value) in row.iter().enumerate() {
                if value > ALIVE {
                    return Err(GridError::InvalidCell { x, y, value });
                }
                cells.push(value);
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Return the cell at column `x`, row `y`, or `None` if out of range.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.cells.get(self.index(x, y)?).copied()
    }

    /// Whether the cell at column `x`, row `y` is alive.
    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(ALIVE)
    }

    /// Set the cell at column `x`, row `y`. Returns `false` if out of range.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) -> bool {
        match self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
            Some(cell) => {
                *cell = u8::from(alive);
                true
            }
            None => false,
        }
    }

    /// Flip the cell at column `x`, row `y` in place.
    ///
    /// Coordinates come straight off the wire, so they are signed. Negative
    /// or out-of-range coordinates leave the grid untouched and return
    /// `false`.
    pub fn toggle(&mut self, x: i64, y: i64) -> bool {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return false;
        };
        match self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
            Some(cell) => {
                *cell = if *cell == ALIVE { DEAD } else { ALIVE };
                true
            }
            None => false,
        }
    }

    /// Replace every cell with a dead cell.
    pub fn clear(&mut self) {
        *self = Self::new(self.rows, self.cols);
    }

    /// Re-roll every cell independently: alive with probability `density`.
    pub fn randomize<R: Rng>(&mut self, density: f64, rng: &mut R) {
        for cell in &mut self.cells {
            *cell = u8::from(rng.random::<f64>() < density);
        }
    }

    /// Number of live cells.
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == ALIVE).count()
    }

    /// Borrow row `y`, or `None` if out of range.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.rows {
            return None;
        }
        let start = y.checked_mul(self.cols)?;
        let end = start.checked_add(self.cols)?;
        self.cells.get(start..end)
    }

    /// Copy the grid out as row-major nested rows.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.rows)
            .filter_map(|y| self.row(y).map(<[u8]>::to_vec))
            .collect()
    }

    /// Compute the next generation.
    ///
    /// A live cell survives with exactly 2 or 3 live neighbours, a dead
    /// cell is born with exactly 3, everything else is dead. Returns a
    /// newly allocated grid and leaves `self` untouched.
    pub fn step(&self) -> Self {
        let mut next = Self::new(self.rows, self.cols);
        for y in 0..self.rows {
            for x in 0..self.cols {
                let alive = self.is_alive(x, y);
                let lives = matches!(
                    (alive, self.live_neighbors(x, y)),
                    (true, 2 | 3) | (false, 3)
                );
                if lives {
                    next.set(x, y, true);
                }
            }
        }
        next
    }

    /// Count the eight wrapped neighbours of `(x, y)`.
    fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        let rows = neighborhood(y, self.rows);
        let cols = neighborhood(x, self.cols);
        let mut count: u8 = 0;
        for (dy, &ny) in rows.iter().enumerate() {
            for (dx, &nx) in cols.iter().enumerate() {
                if dy == 1 && dx == 1 {
                    continue;
                }
                if self.is_alive(nx, ny) {
                    count = count.saturating_add(1);
                }
            }
        }
        count
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.cols && y < self.rows {
            y.checked_mul(self.cols)?.checked_add(x)
        } else {
            None
        }
    }
}

/// Previous, current and next index along an axis of length `len`, wrapped.
#[allow(clippy::arithmetic_side_effects)]
const fn neighborhood(i: usize, len: usize) -> [usize; 3] {
    // Only called with i < len, so len > 0 and neither sum overflows.
    [(i + len - 1) % len, i, (i + 1) % len]
}

/// Serializes as a row-major nested array of `0`/`1` integers.
impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows))?;
        for y in 0..self.rows {
            if let Some(row) = self.row(y) {
                seq.serialize_element(row)?;
            }
        }
        seq.end()
    }
}
