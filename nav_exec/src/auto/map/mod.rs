//! # Map
//!
//! This module implements the [`OccupancyGrid`] used for path planning, and the
//! [`ObstacleMapBuilder`] which produces local occupancy grids from the perception sweep.
//!
//! Grid convention: cell `(row, col)`, with `row` increasing along the vehicle's initial forward
//! axis and `col` increasing to the vehicle's left.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Implements the [`OccupancyGrid`] type
mod occ_grid;

/// Builds obstacle maps from polar range samples
mod obstacle_map;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use obstacle_map::{to_grid_cell, ObstacleMapBuilder, ObstacleMapParams, PolarSample};
pub use occ_grid::{CellState, GridCell, GridError, OccupancyGrid};
