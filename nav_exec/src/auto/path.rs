//! # Path
//!
//! This module defines the grid path produced by the planner, and the segmenter which splits a
//! path into straight [`Run`]s for the motion executor.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};

use super::map::GridCell;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An ordered sequence of 4-connected adjacent cells from a start to a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GridPath {
    pub cells: Vec<GridCell>,
}

/// A maximal straight portion of a [`GridPath`].
///
/// Consecutive runs share their joining cell, i.e. the `terminal` of one run is the `entry` of
/// the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub entry: GridCell,
    pub terminal: GridCell,
    pub step: StepDir,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// One of the four cardinal unit steps between adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepDir {
    PlusRow,
    MinusRow,
    PlusCol,
    MinusCol,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("The path must contain at least two cells to be segmented")]
    EmptyPath,

    #[error("Cells {0} and {1} at index {2} of the path are not adjacent")]
    NonAdjacentCells(GridCell, GridCell, usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GridPath {
    pub fn new(cells: Vec<GridCell>) -> Self {
        Self { cells }
    }

    /// Rebuild a path from its runs, the inverse of [`segment`].
    pub fn from_runs(runs: &[Run]) -> Self {
        let mut cells = Vec::new();

        for (i, run) in runs.iter().enumerate() {
            let mut run_cells = run.cells();

            // Joining cell is already present from the previous run
            if i > 0 {
                run_cells.remove(0);
            }

            cells.extend(run_cells);
        }

        Self { cells }
    }

    pub fn start(&self) -> Option<GridCell> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<GridCell> {
        self.cells.last().copied()
    }

    /// Number of moves in the path, one less than the number of cells.
    pub fn num_steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
}

impl Deref for GridPath {
    type Target = [GridCell];

    fn deref(&self) -> &Self::Target {
        &self.cells
    }
}

impl fmt::Display for GridPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strs: Vec<String> = self.cells.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", strs.join(" -> "))
    }
}

impl Run {
    /// Number of cells moved over by this run.
    pub fn len(&self) -> usize {
        self.entry.manhattan(&self.terminal)
    }

    /// A run always contains at least one step.
    pub fn is_empty(&self) -> bool {
        self.entry == self.terminal
    }

    /// All cells of the run, entry and terminal inclusive.
    pub fn cells(&self) -> Vec<GridCell> {
        let (d_row, d_col) = self.step.delta();
        (0..=self.len() as i64)
            .filter_map(|i| self.entry.offset(i * d_row, i * d_col))
            .collect()
    }
}

impl StepDir {
    /// Get the step needed to move from `from` into the adjacent cell `to`.
    pub fn between(from: &GridCell, to: &GridCell) -> Option<Self> {
        let d_row = to.row as i64 - from.row as i64;
        let d_col = to.col as i64 - from.col as i64;

        match (d_row, d_col) {
            (1, 0) => Some(Self::PlusRow),
            (-1, 0) => Some(Self::MinusRow),
            (0, 1) => Some(Self::PlusCol),
            (0, -1) => Some(Self::MinusCol),
            _ => None,
        }
    }

    /// `(row, col)` delta of this step.
    pub fn delta(&self) -> (i64, i64) {
        match self {
            Self::PlusRow => (1, 0),
            Self::MinusRow => (-1, 0),
            Self::PlusCol => (0, 1),
            Self::MinusCol => (0, -1),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Split a path into maximal straight runs.
///
/// A new run starts wherever the step between consecutive cells changes. Paths of fewer than two
/// cells produce [`PathError::EmptyPath`].
pub fn segment(path: &[GridCell]) -> Result<Vec<Run>, PathError> {
    if path.len() < 2 {
        return Err(PathError::EmptyPath);
    }

    let mut runs: Vec<Run> = Vec::new();

    for (i, pair) in path.windows(2).enumerate() {
        let step = StepDir::between(&pair[0], &pair[1])
            .ok_or(PathError::NonAdjacentCells(pair[0], pair[1], i))?;

        match runs.last_mut() {
            Some(run) if run.step == step => run.terminal = pair[1],
            _ => runs.push(Run {
                entry: pair[0],
                terminal: pair[1],
                step,
            }),
        }
    }

    Ok(runs)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn cells(c: &[(usize, usize)]) -> Vec<GridCell> {
        c.iter().map(|&rc| GridCell::from(rc)).collect()
    }

    #[test]
    fn test_straight_path() {
        let path = cells(&[(0, 0), (0, 1), (0, 2), (0, 3)]);
        let runs = segment(&path).unwrap();

        assert_eq!(
            runs,
            vec![Run {
                entry: GridCell::new(0, 0),
                terminal: GridCell::new(0, 3),
                step: StepDir::PlusCol
            }]
        );
        assert_eq!(runs[0].len(), 3);
    }

    #[test]
    fn test_alternating_path() {
        let path = cells(&[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2), (3, 2)]);
        let runs = segment(&path).unwrap();

        assert_eq!(runs.len(), path.len() - 1);
        assert!(runs.iter().all(|r| r.len() == 1));
    }

    #[test]
    fn test_round_trip() {
        let path = cells(&[
            (4, 4),
            (3, 4),
            (2, 4),
            (2, 3),
            (2, 2),
            (2, 1),
            (3, 1),
            (3, 0),
        ]);
        let runs = segment(&path).unwrap();

        assert_eq!(runs.len(), 4);
        assert_eq!(
            runs.iter().map(|r| r.step).collect::<Vec<_>>(),
            vec![
                StepDir::MinusRow,
                StepDir::MinusCol,
                StepDir::PlusRow,
                StepDir::MinusCol
            ]
        );
        assert_eq!(GridPath::from_runs(&runs).cells, path);
    }

    #[test]
    fn test_degenerate_paths() {
        assert_eq!(segment(&[]), Err(PathError::EmptyPath));
        assert_eq!(segment(&cells(&[(1, 1)])), Err(PathError::EmptyPath));
        assert_eq!(
            segment(&cells(&[(1, 1), (1, 2), (2, 3)])),
            Err(PathError::NonAdjacentCells(
                GridCell::new(1, 2),
                GridCell::new(2, 3),
                1
            ))
        );
    }
}
