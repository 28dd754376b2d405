//! # Occupancy Grid

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{collections::HashSet, fmt};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Integer coordinates of a cell in an [`OccupancyGrid`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

/// A 2D field of free or blocked cells.
///
/// The grid is treated as immutable while a plan is being executed, and replaced wholesale by a
/// new grid if the map changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGrid {
    /// Raw cell data, indexed by `[row, col]`
    cells: Array2<CellState>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Free,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("Cell {0} is outside the grid ({1} x {2})")]
    OutsideGrid(GridCell, usize, usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GridCell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the cell offset by the given signed row and column deltas, or `None` if it would
    /// have a negative coordinate.
    pub fn offset(&self, d_row: i64, d_col: i64) -> Option<Self> {
        let row = self.row as i64 + d_row;
        let col = self.col as i64 + d_col;

        if row < 0 || col < 0 {
            None
        } else {
            Some(Self::new(row as usize, col as usize))
        }
    }

    /// Manhattan (4-connected) distance between two cells.
    pub fn manhattan(&self, other: &GridCell) -> usize {
        abs_diff(self.row, other.row) + abs_diff(self.col, other.col)
    }

    /// Chebyshev (8-connected) distance between two cells.
    pub fn chebyshev(&self, other: &GridCell) -> usize {
        abs_diff(self.row, other.row).max(abs_diff(self.col, other.col))
    }
}

impl From<(usize, usize)> for GridCell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Free
    }
}

impl OccupancyGrid {
    /// Create a new grid with every cell free.
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            cells: Array2::from_elem((num_rows, num_cols), CellState::Free),
        }
    }

    /// Create a new grid with the given cells blocked.
    pub fn with_blocked(
        num_rows: usize,
        num_cols: usize,
        blocked: &[GridCell],
    ) -> Result<Self, GridError> {
        let mut grid = Self::new(num_rows, num_cols);

        for cell in blocked {
            grid.set(cell, CellState::Blocked)?;
        }

        Ok(grid)
    }

    /// Parse a grid from rows of text, where `#` is blocked and anything else is free.
    ///
    /// Rows shorter than the longest row are padded with free cells.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let num_cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(rows.len(), num_cols);

        for (row, line) in rows.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                if c == '#' {
                    grid.cells[[row, col]] = CellState::Blocked;
                }
            }
        }

        grid
    }

    pub fn num_rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn num_cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn in_bounds(&self, cell: &GridCell) -> bool {
        cell.row < self.num_rows() && cell.col < self.num_cols()
    }

    /// Get the state of a cell, or `None` if the cell is outside the grid.
    pub fn get(&self, cell: &GridCell) -> Option<CellState> {
        self.cells.get([cell.row, cell.col]).copied()
    }

    /// Returns true if the cell is inside the grid and free.
    pub fn is_free(&self, cell: &GridCell) -> bool {
        matches!(self.get(cell), Some(CellState::Free))
    }

    pub fn set(&mut self, cell: &GridCell, state: CellState) -> Result<(), GridError> {
        let (num_rows, num_cols) = (self.num_rows(), self.num_cols());

        match self.cells.get_mut([cell.row, cell.col]) {
            Some(c) => {
                *c = state;
                Ok(())
            }
            None => Err(GridError::OutsideGrid(*cell, num_rows, num_cols)),
        }
    }

    /// Number of blocked cells in the grid.
    pub fn num_blocked(&self) -> usize {
        self.cells.iter().filter(|c| **c == CellState::Blocked).count()
    }

    /// Iterate over all blocked cells in row-major order.
    pub fn blocked_cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells
            .indexed_iter()
            .filter(|(_, c)| **c == CellState::Blocked)
            .map(|((row, col), _)| GridCell::new(row, col))
    }

    /// The 4-connected neighbours of `cell` which are inside the grid, in the order -row, +row,
    /// -col, +col.
    pub fn neighbours(&self, cell: &GridCell) -> impl Iterator<Item = GridCell> + '_ {
        static STEPS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

        let cell = *cell;
        STEPS
            .iter()
            .filter_map(move |(dr, dc)| cell.offset(*dr, *dc))
            .filter(move |n| self.in_bounds(n))
    }

    /// Render the grid as text, one line per row.
    ///
    /// Blocked cells are `#` and free cells are spaces. Optionally the path is overlaid with `.`,
    /// the start with `S` and the goal with `G`.
    pub fn render_ascii(
        &self,
        path: Option<&[GridCell]>,
        start: Option<GridCell>,
        goal: Option<GridCell>,
    ) -> String {
        let path_set: HashSet<GridCell> = path
            .map(|p| p.iter().copied().collect())
            .unwrap_or_default();

        let mut out = String::with_capacity(self.num_rows() * (self.num_cols() + 1));

        for row in 0..self.num_rows() {
            for col in 0..self.num_cols() {
                let cell = GridCell::new(row, col);
                let c = if start == Some(cell) {
                    'S'
                } else if goal == Some(cell) {
                    'G'
                } else if path_set.contains(&cell) {
                    '.'
                } else {
                    match self.cells[[row, col]] {
                        CellState::Blocked => '#',
                        CellState::Free => ' ',
                    }
                };
                out.push(c);
            }
            out.push('\n');
        }

        out
    }
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_ascii(None, None, None))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn abs_diff(a: usize, b: usize) -> usize {
    if a > b {
        a - b
    } else {
        b - a
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
