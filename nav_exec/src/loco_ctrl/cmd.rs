//! Motion commands passed into LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::drive::WheelDuties;
use serde::{Deserialize, Serialize};

use super::LocoCtrlParams;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible motions to be executed by LocoCtrl.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Drive straight forwards
    Forward,
    /// Drive straight backwards
    Backward,
    /// Spin counter-clockwise about the vehicle centre
    Left,
    /// Spin clockwise about the vehicle centre
    Right,
    /// Bring the vehicle to a full stop
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Direction {
    /// The spin direction for a signed rotation, positive being counter-clockwise.
    pub fn spin(rot_deg: f64) -> Self {
        if rot_deg >= 0.0 {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// Get the wheel duties which produce this motion.
    pub fn duties(&self, params: &LocoCtrlParams) -> WheelDuties {
        let d = params.drive_duty;
        let t = params.turn_duty;

        match self {
            Direction::Forward => WheelDuties::new(d + params.forward_trim, d, d, d),
            Direction::Backward => WheelDuties::new(-d, -d, -d, -d),
            Direction::Left => WheelDuties::new(-t - params.spin_trim, -t, t, t),
            Direction::Right => WheelDuties::new(t, t, -t - params.spin_trim, -t),
            Direction::Stop => WheelDuties::STOP,
        }
    }
}
