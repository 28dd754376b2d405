//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::params::{ensure_positive, ParamsError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Calibration parameters for Locomotion control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocoCtrlParams {
    // ---- GEOMETRY ----
    /// Size of one occupancy grid cell.
    ///
    /// Units: centimeters
    pub cell_size_cm: f64,

    // ---- CALIBRATION ----
    /// Ground speed achieved by the drive duty.
    ///
    /// Units: centimeters/second
    pub drive_rate_cms: f64,

    /// Turn rate achieved by the turn duty.
    ///
    /// Units: degrees/second
    pub turn_rate_degs: f64,

    /// Rotations with a magnitude at or below this are not performed.
    ///
    /// Units: degrees
    pub rot_deadband_deg: f64,

    // ---- DUTIES ----
    /// Duty applied to all wheels when driving straight.
    pub drive_duty: i32,

    /// Duty applied to all wheels when spinning.
    pub turn_duty: i32,

    /// Extra duty added to the front left wheel when driving forwards, to counter drift.
    pub forward_trim: i32,

    /// Extra duty added to the leading reverse wheel when spinning.
    pub spin_trim: i32,

    // ---- DWELLS ----
    /// Hold before a rotation starts.
    ///
    /// Units: seconds
    pub pre_turn_dwell_s: f64,

    /// Hold after a rotation ends.
    ///
    /// Units: seconds
    pub post_turn_dwell_s: f64,

    /// Hold after a blocking drive ends.
    ///
    /// Units: seconds
    pub post_drive_settle_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LocoCtrlParams {
    fn default() -> Self {
        Self {
            cell_size_cm: 20.0,
            drive_rate_cms: 50.0,
            turn_rate_degs: 95.0,
            rot_deadband_deg: 2.0,
            drive_duty: 600,
            turn_duty: 1000,
            forward_trim: 300,
            spin_trim: 300,
            pre_turn_dwell_s: 0.5,
            post_turn_dwell_s: 3.0,
            post_drive_settle_s: 0.0,
        }
    }
}

impl LocoCtrlParams {
    /// Calibration with every dwell set to zero, for simulation.
    pub fn without_dwells(mut self) -> Self {
        self.pre_turn_dwell_s = 0.0;
        self.post_turn_dwell_s = 0.0;
        self.post_drive_settle_s = 0.0;
        self
    }

    /// Check that the geometry and calibrated rates are usable.
    pub fn validate(&self) -> Result<(), ParamsError> {
        ensure_positive("loco_ctrl.cell_size_cm", self.cell_size_cm)?;
        ensure_positive("loco_ctrl.drive_rate_cms", self.drive_rate_cms)?;
        ensure_positive("loco_ctrl.turn_rate_degs", self.turn_rate_degs)
    }
}
