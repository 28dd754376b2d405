//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::drive::{DriveEqpt, WheelDuties};
use log::{debug, trace, warn};
use nalgebra::Vector2;

use super::{Direction, LocoCtrlError, LocoCtrlParams};
use crate::auto::{
    loc::{cell_to_world_cm, Pose},
    map::GridCell,
};
use util::time::sleep_s;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state.
///
/// Owns the drive actuator and the dead-reckoned pose. The pose is only ever updated from
/// commanded motion.
pub struct LocoCtrl {
    params: LocoCtrlParams,

    drive: Box<dyn DriveEqpt>,

    pose: Pose,

    /// Last duties sent to the drive
    last_duties: Option<WheelDuties>,

    closed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    /// Create a new controller with the vehicle at the given pose.
    pub fn new(params: LocoCtrlParams, drive: Box<dyn DriveEqpt>, pose: Pose) -> Self {
        Self {
            params,
            drive,
            pose,
            last_duties: None,
            closed: false,
        }
    }

    pub fn params(&self) -> &LocoCtrlParams {
        &self.params
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn last_duties(&self) -> Option<WheelDuties> {
        self.last_duties
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// World position of a cell using the calibrated cell size.
    pub fn cell_to_world_cm(&self, cell: &GridCell) -> Vector2<f64> {
        cell_to_world_cm(cell, self.params.cell_size_cm)
    }

    /// Send the duties for `dir` to the drive. The motion continues until the next command.
    pub fn command(&mut self, dir: Direction) -> Result<(), LocoCtrlError> {
        if self.closed {
            return Err(LocoCtrlError::DriveClosed);
        }

        let duties = dir.duties(&self.params);
        trace!("Drive command {:?}: {:?}", dir, duties);

        self.drive.set_wheel_duties(duties)?;
        self.last_duties = Some(duties);

        Ok(())
    }

    /// Stop all wheels.
    pub fn halt(&mut self) -> Result<(), LocoCtrlError> {
        self.command(Direction::Stop)
    }

    /// Turn on the spot to face the centre of `target`.
    ///
    /// Returns the rotation performed in degrees, which is zero if the rotation needed was within
    /// the deadband or the target is the current position.
    pub fn rotate_to(&mut self, target: &GridCell) -> Result<f64, LocoCtrlError> {
        let target_cm = self.cell_to_world_cm(target);
        let rot_deg = self.pose.rotation_towards(&target_cm);

        self.rotate_by(rot_deg)
    }

    /// Turn on the spot by `rot_deg`, positive being counter-clockwise.
    pub fn rotate_by(&mut self, rot_deg: f64) -> Result<f64, LocoCtrlError> {
        if !rot_deg.is_finite() || rot_deg.abs() <= self.params.rot_deadband_deg {
            trace!("Rotation of {} deg within deadband, skipping", rot_deg);
            return Ok(0.0);
        }

        let duration_s = rot_deg.abs() / self.params.turn_rate_degs;
        debug!(
            "Rotating {:.1} deg over {:.2} s (yaw {:.1} deg)",
            rot_deg, duration_s, self.pose.yaw_deg
        );

        self.halt()?;
        sleep_s(self.params.pre_turn_dwell_s);

        self.command(Direction::spin(rot_deg))?;
        sleep_s(duration_s);
        self.pose.rotate(rot_deg);

        self.halt()?;
        sleep_s(self.params.post_turn_dwell_s);

        Ok(rot_deg)
    }

    /// Drive in a straight line to the centre of `target` as a single timed command.
    ///
    /// The direction (forwards or backwards) is chosen by the sign of the displacement along the
    /// current heading, and the pose is set to the target when the command completes. Returns the
    /// signed distance commanded.
    pub fn drive_to(&mut self, target: &GridCell) -> Result<f64, LocoCtrlError> {
        let (dir, dist_cm) = self.straight_line_to(target);

        if dist_cm < std::f64::EPSILON {
            trace!("Already at {}, not driving", target);
            return Ok(0.0);
        }

        let duration_s = dist_cm / self.params.drive_rate_cms;
        debug!(
            "Driving {:?} {:.1} cm over {:.2} s to {}",
            dir, dist_cm, duration_s, target
        );

        self.command(dir)?;
        sleep_s(duration_s);
        self.halt()?;

        self.arrive_at(target);
        sleep_s(self.params.post_drive_settle_s);

        Ok(match dir {
            Direction::Backward => -dist_cm,
            _ => dist_cm,
        })
    }

    /// Drive in `dir` for `duration_s` without stopping at the end.
    ///
    /// Returns the distance commanded. The pose is not updated, call [`LocoCtrl::arrive_at`] once
    /// the full distance has been covered.
    pub fn drive_slice(&mut self, dir: Direction, duration_s: f64) -> Result<f64, LocoCtrlError> {
        // Only send on a change of direction, the drive holds the last demand
        if self.last_duties != Some(dir.duties(&self.params)) {
            self.command(dir)?;
        }
        sleep_s(duration_s);

        Ok(self.params.drive_rate_cms * duration_s.max(0.0))
    }

    /// Direction and absolute distance to drive to reach the centre of `target`.
    pub fn straight_line_to(&self, target: &GridCell) -> (Direction, f64) {
        let disp = self.cell_to_world_cm(target) - self.pose.position_cm;
        let dir = if disp.dot(&self.pose.heading()) < 0.0 {
            Direction::Backward
        } else {
            Direction::Forward
        };

        (dir, disp.norm())
    }

    /// Set the dead-reckoned position to the centre of `cell`.
    pub fn arrive_at(&mut self, cell: &GridCell) {
        self.pose.position_cm = self.cell_to_world_cm(cell);
        trace!("Pose now {:?}", self.pose);
    }

    /// Halt the vehicle and release the drive.
    ///
    /// Closing an already closed controller does nothing. The drive is released even if the halt
    /// fails, with the first error being returned.
    pub fn close(&mut self) -> Result<(), LocoCtrlError> {
        if self.closed {
            return Ok(());
        }

        let halt_res = self.halt();
        if let Err(ref e) = halt_res {
            warn!("Failed to halt before closing the drive: {}", e);
        }

        self.closed = true;
        let close_res = self.drive.close().map_err(LocoCtrlError::from);

        halt_res.and(close_res)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
