//! # Drive Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Duty cycle demands for each of the four wheels.
///
/// Signal range and units are defined by the driver, positive values drive the wheel forwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelDuties {
    pub front_left: i32,
    pub rear_left: i32,
    pub front_right: i32,
    pub rear_right: i32,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A four wheel drive actuator.
pub trait DriveEqpt: Send {
    /// Set the duty cycle of all four wheels. The demand holds until the next call.
    fn set_wheel_duties(&mut self, duties: WheelDuties) -> Result<(), EqptError>;

    /// Release the actuator. No further demands may be sent after this call.
    fn close(&mut self) -> Result<(), EqptError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WheelDuties {
    /// All wheels stopped.
    pub const STOP: WheelDuties = WheelDuties {
        front_left: 0,
        rear_left: 0,
        front_right: 0,
        rear_right: 0,
    };

    pub fn new(front_left: i32, rear_left: i32, front_right: i32, rear_right: i32) -> Self {
        Self {
            front_left,
            rear_left,
            front_right,
            rear_right,
        }
    }

    /// Returns true if every wheel is stopped.
    pub fn is_stop(&self) -> bool {
        *self == Self::STOP
    }
}
