//! # Autonomy
//!
//! Everything the vehicle needs to get itself from a start cell to a goal cell: maps, planning,
//! path segmentation, dead-reckoned localisation, perception and the stop signal which couples
//! perception to the navigator.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Localisation - the dead-reckoned pose of the vehicle
pub mod loc;

/// Occupancy grids and obstacle map building
pub mod map;

/// Path planning and execution
pub mod nav;

/// Grid paths and path segmentation
pub mod path;

/// Perception sweep and hazard detection
pub mod per;

/// One-shot stop request shared by perception and navigation
pub mod stop_signal;
