//! # Perception
//!
//! The perception task continuously sweeps the pan-mounted ranging sensor and camera across a
//! fixed angular window. At each step it takes a range sample and classifies a frame, requesting
//! a stop from the navigator when a hazard is close. After each leg of the sweep the range samples
//! are built into a local obstacle map and offered to any listener.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod pan;
mod sweep;
mod task;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use pan::PanCtrl;
pub use params::PerParams;
pub use sweep::SweepState;
pub use task::{PerEqpt, PerReport, PerceptionTask, StepReport};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{cam::Classification, EqptError};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Class of a classified frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    /// The frame contains the hazard the vehicle must stop for
    Hazard,

    /// Anything else
    Benign,
}

#[derive(Debug, thiserror::Error)]
pub enum PerError {
    #[error("Could not move the pan servo to its initial angle: {0}")]
    InitFailed(EqptError),

    #[error("Sweep window is inverted: minimum {min_deg} deg is above maximum {max_deg} deg")]
    InvalidWindow { min_deg: i32, max_deg: i32 },

    #[error("Could not spawn the perception thread: {0}")]
    ThreadSpawnFailed(std::io::Error),

    #[error("The perception thread panicked")]
    ThreadPanicked,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Label {
    /// Map a classifier result onto a label, given the name of the hazard class.
    pub fn from_classification(class: &Classification, hazard_label: &str) -> Self {
        if class.label == hazard_label {
            Label::Hazard
        } else {
            Label::Benign
        }
    }
}
