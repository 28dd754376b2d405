//! # Navigation Executable Parameters
//!
//! This module provides the parameters for the navigation executable, which aggregate the
//! parameters of each module, and the description of the mission to run.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{
    auto::{
        map::{GridCell, GridError, ObstacleMapParams, OccupancyGrid},
        nav::NavigatorParams,
        per::PerParams,
    },
    loco_ctrl::LocoCtrlParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for every module of the executable.
///
/// Any table missing from the parameter file takes its calibrated defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavExecParams {
    pub loco_ctrl: LocoCtrlParams,
    pub navigator: NavigatorParams,
    pub per: PerParams,
    pub obstacle_map: ObstacleMapParams,
}

/// A single navigation mission across a static grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionParams {
    pub num_rows: usize,
    pub num_cols: usize,

    /// Cells which are blocked in the grid
    #[serde(default)]
    pub blocked: Vec<GridCell>,

    pub start: GridCell,
    pub goal: GridCell,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A parameter value which would stop a module from making progress.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("Sweep window is inverted: minimum {min_deg} deg is above maximum {max_deg} deg")]
    InvertedSweepWindow { min_deg: i32, max_deg: i32 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavExecParams {
    /// Check every module's parameters.
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.loco_ctrl.validate()?;
        self.navigator.validate()?;

        if self.per.angle_min_deg > self.per.angle_max_deg {
            return Err(ParamsError::InvertedSweepWindow {
                min_deg: self.per.angle_min_deg,
                max_deg: self.per.angle_max_deg,
            });
        }
        ensure_positive("per.angle_step_deg", self.per.angle_step_deg as f64)?;
        ensure_positive("obstacle_map.grid_increment_cm", self.obstacle_map.grid_increment_cm)
    }
}

impl MissionParams {
    /// Build the occupancy grid for this mission.
    pub fn grid(&self) -> Result<OccupancyGrid, GridError> {
        OccupancyGrid::with_blocked(self.num_rows, self.num_cols, &self.blocked)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<(), ParamsError> {
    // Written so that NaN is rejected too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParamsError::NotPositive { name, value })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_exec_params() {
        let params: NavExecParams = util::params::parse(
            r#"
            [loco_ctrl]
            drive_rate_cms = 40.0

            [per]
            hazard_label = "stop"
            frames_dir = "frames"
            "#,
        )
        .unwrap();

        assert_eq!(params.loco_ctrl.drive_rate_cms, 40.0);
        assert_eq!(params.loco_ctrl.turn_rate_degs, 95.0);
        assert_eq!(params.per.hazard_label, "stop");
        assert_eq!(params.per.angle_min_deg, 45);
        assert_eq!(params.navigator.drive_slice_s, 0.05);
        assert_eq!(params.obstacle_map.feather_radius, 1);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let params: NavExecParams = util::params::parse(
            r#"
            [navigator]
            drive_slice_s = 0.0
            "#,
        )
        .unwrap();
        assert!(matches!(
            params.validate(),
            Err(ParamsError::NotPositive {
                name: "navigator.drive_slice_s",
                ..
            })
        ));

        let mut params = NavExecParams::default();
        params.loco_ctrl.drive_rate_cms = -50.0;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::NotPositive {
                name: "loco_ctrl.drive_rate_cms",
                ..
            })
        ));

        let mut params = NavExecParams::default();
        params.navigator.arrival_tolerance_cm = f64::NAN;
        assert!(params.validate().is_err());

        let mut params = NavExecParams::default();
        params.per.angle_min_deg = 50;
        params.per.angle_max_deg = 45;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::InvertedSweepWindow {
                min_deg: 50,
                max_deg: 45
            })
        ));

        // The watchdog limit may be anything, a negative value cancels immediately
        let mut params = NavExecParams::default();
        params.navigator.max_runtime_s = -1.0;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_mission() {
        let mission: MissionParams = util::params::parse(
            r#"
            num_rows = 4
            num_cols = 5
            start = { row = 0, col = 0 }
            goal = { row = 3, col = 4 }
            blocked = [
                { row = 1, col = 1 },
                { row = 2, col = 3 },
            ]
            "#,
        )
        .unwrap();

        let grid = mission.grid().unwrap();
        assert_eq!(grid.num_blocked(), 2);
        assert!(!grid.is_free(&GridCell::new(2, 3)));

        let bad = MissionParams {
            blocked: vec![GridCell::new(9, 9)],
            ..mission
        };
        assert!(bad.grid().is_err());
    }
}
