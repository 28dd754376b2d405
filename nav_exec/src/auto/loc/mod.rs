//! # Localisation module
//!
//! The vehicle has no odometry, so its pose is dead-reckoned purely from commanded motion. This
//! module provides the [`Pose`] which the motion executor maintains.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use util::maths::{get_ang_dist_deg, wrap_deg_360};

use super::map::GridCell;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The believed pose of the vehicle in the world frame.
///
/// The world frame's X axis is the vehicle's initial forward axis (grid rows) and the Y axis
/// points to the vehicle's left (grid columns). Yaw is measured from +X, positive
/// counter-clockwise, and held in the range [0, 360).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {
    pub position_cm: Vector2<f64>,

    pub yaw_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(position_cm: Vector2<f64>, yaw_deg: f64) -> Self {
        Self {
            position_cm,
            yaw_deg: wrap_deg_360(yaw_deg),
        }
    }

    /// Pose at the centre of the given cell, facing along the forward axis.
    pub fn at_cell(cell: &GridCell, cell_size_cm: f64) -> Self {
        Self::new(cell_to_world_cm(cell, cell_size_cm), 0.0)
    }

    /// Yaw which would face the vehicle at `target_cm`.
    ///
    /// If the target is the current position the current yaw is returned.
    pub fn yaw_towards(&self, target_cm: &Vector2<f64>) -> f64 {
        let disp = target_cm - self.position_cm;

        if disp.norm() < std::f64::EPSILON {
            return self.yaw_deg;
        }

        wrap_deg_360(disp.y.atan2(disp.x).to_degrees())
    }

    /// Signed shortest rotation, in (-180, 180], which would face the vehicle at `target_cm`.
    pub fn rotation_towards(&self, target_cm: &Vector2<f64>) -> f64 {
        get_ang_dist_deg(self.yaw_deg, self.yaw_towards(target_cm))
    }

    /// Apply a rotation to the yaw.
    pub fn rotate(&mut self, rot_deg: f64) {
        self.yaw_deg = wrap_deg_360(self.yaw_deg + rot_deg);
    }

    /// Unit vector along the current heading.
    pub fn heading(&self) -> Vector2<f64> {
        let yaw_rad = self.yaw_deg.to_radians();
        Vector2::new(yaw_rad.cos(), yaw_rad.sin())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// World position of a grid cell.
pub fn cell_to_world_cm(cell: &GridCell, cell_size_cm: f64) -> Vector2<f64> {
    Vector2::new(cell.row as f64 * cell_size_cm, cell.col as f64 * cell_size_cm)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
