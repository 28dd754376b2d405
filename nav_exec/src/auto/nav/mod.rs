//! # Navigation
//!
//! This module provides high level navigation of the vehicle: planning a path across an
//! [`OccupancyGrid`](crate::auto::map::OccupancyGrid) with [`path_planner`], then driving it as a
//! sequence of straight runs with the [`Navigator`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// A* planning over occupancy grids
pub mod path_planner;

/// Executes planned paths
mod navigator;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use navigator::{
    CancelReason, FailReason, NavError, NavOutcome, NavReport, Navigator, NavigatorParams,
};
