//! # Ranging Sensor Equipment Interface

use super::EqptError;

/// A ranging sensor (for example an ultrasonic sensor) mounted on the pan servo.
pub trait RangeEqpt: Send {
    /// Take one distance sample in centimeters.
    ///
    /// Returns `Ok(None)` if there was no valid echo.
    fn sample_distance_cm(&mut self) -> Result<Option<f64>, EqptError>;

    /// Release the sensor.
    fn close(&mut self) -> Result<(), EqptError>;
}
