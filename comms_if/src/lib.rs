//! # Communications interface crate.
//!
//! Provides the interfaces between the navigation software and the vehicle's equipment. The
//! equipment drivers themselves live outside this workspace and implement the traits defined
//! here.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Interface traits and data types for vehicle equipment (drive, ranging, pan servo, camera)
pub mod eqpt;
