//! # Navigation library
//!
//! This library allows other crates in the workspace (and the tests) to access items defined
//! inside the navigation executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy - maps, planning, perception and navigation
pub mod auto;

/// Locomotion control module - converts motion commands into timed wheel duty demands
pub mod loco_ctrl;

/// Parameters for the executable
pub mod params;

/// Simulated equipment for running without hardware
pub mod sim_eqpt;
