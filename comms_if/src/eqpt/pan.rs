//! # Pan Servo Equipment Interface

use super::EqptError;

/// A positional servo which pans the ranging sensor and camera.
pub trait PanEqpt: Send {
    /// Command the servo on `channel` to move to `angle_deg`.
    ///
    /// The call returns once the command is sent, not once the servo has arrived.
    fn set_angle(&mut self, channel: u8, angle_deg: i32) -> Result<(), EqptError>;
}
