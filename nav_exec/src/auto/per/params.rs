//! Parameters for the perception task

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerParams {
    // ---- SWEEP ----
    /// Lowest pan angle of the sweep.
    ///
    /// Units: degrees
    pub angle_min_deg: i32,

    /// Highest pan angle of the sweep.
    ///
    /// Units: degrees
    pub angle_max_deg: i32,

    /// Pan step between samples, must be positive.
    ///
    /// Units: degrees
    pub angle_step_deg: i32,

    /// Servo controller channel of the pan servo.
    pub pan_channel: u8,

    /// Wait after each pan command before sampling.
    ///
    /// Units: seconds
    pub settle_dwell_s: f64,

    /// Wait at the end of each step.
    ///
    /// Units: seconds
    pub sweep_dwell_s: f64,

    // ---- HAZARD ----
    /// Classifier label of the hazard to stop for.
    pub hazard_label: String,

    /// A hazard is only acted on when closer than this.
    ///
    /// Units: centimeters
    pub hazard_distance_cm: f64,

    // ---- ARCHIVING ----
    /// If set, every acquired frame is saved as a PNG into this directory.
    pub frames_dir: Option<PathBuf>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PerParams {
    fn default() -> Self {
        Self {
            angle_min_deg: 45,
            angle_max_deg: 50,
            angle_step_deg: 5,
            pan_channel: 0,
            settle_dwell_s: 0.12,
            sweep_dwell_s: 0.0,
            hazard_label: "stop sign".into(),
            hazard_distance_cm: 20.0,
            frames_dir: None,
        }
    }
}

impl PerParams {
    /// Pan angle at the centre of the sweep, which is straight ahead.
    pub fn centre_angle_deg(&self) -> f64 {
        (self.angle_min_deg + self.angle_max_deg) as f64 / 2.0
    }
}
