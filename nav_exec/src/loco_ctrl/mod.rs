//! Locomotion control module
//!
//! Converts heading changes and straight line moves into timed open-loop wheel duty commands,
//! dead-reckoning the vehicle [`Pose`](crate::auto::loc::Pose) from the calibrated drive and turn
//! rates.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use cmd::*;
pub use params::*;
pub use state::*;

use comms_if::eqpt::EqptError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("The drive equipment returned an error: {0}")]
    EqptError(#[from] EqptError),

    #[error("Attempted to command the drive after it was closed")]
    DriveClosed,
}
