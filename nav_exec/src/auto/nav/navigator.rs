//! Navigator - drives a planned path as a sequence of straight runs.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::path_planner;
use crate::{
    auto::{
        loc::Pose,
        map::{GridCell, OccupancyGrid},
        path::{segment, GridPath, PathError, Run},
        stop_signal::StopSignal,
    },
    loco_ctrl::{LocoCtrl, LocoCtrlError},
    params::{ensure_positive, ParamsError},
};
use util::{session, time::sleep_s};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorParams {
    /// Length of each drive command, the stop signal is polled between slices.
    ///
    /// Units: seconds
    pub drive_slice_s: f64,

    /// A run is complete once the remaining distance is at or below this.
    ///
    /// Units: centimeters
    pub arrival_tolerance_cm: f64,

    /// How long to hold still after a stop request.
    ///
    /// Units: seconds
    pub stop_hold_s: f64,

    /// Missions taking longer than this are cancelled.
    ///
    /// Units: seconds
    pub max_runtime_s: f64,
}

/// Executes paths through the locomotion controller, holding whenever perception requests a stop.
///
/// The drive is released when the navigator is closed or dropped.
pub struct Navigator {
    params: NavigatorParams,

    loco_ctrl: LocoCtrl,

    stop_signal: Arc<StopSignal>,

    shutdown: Arc<AtomicBool>,

    /// Start of the current mission, used by the runtime watchdog
    mission_start: Option<Instant>,

    report: NavReport,
}

/// Record of a single call to [`Navigator::navigate`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct NavReport {
    pub start: GridCell,
    pub goal: GridCell,
    pub path: Option<GridPath>,

    /// Nodes expanded by the planner while searching for the path
    pub num_expanded: usize,

    pub runs: Vec<Run>,
    pub num_runs_completed: usize,
    pub num_rotations: usize,
    pub num_holds: usize,
    pub final_pose: Pose,
    pub outcome: Option<NavOutcome>,
    pub elapsed_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of a navigation attempt which did not hit an equipment error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavOutcome {
    /// The vehicle is at the goal
    Reached,

    /// Navigation was not attempted, no motion was commanded
    Failed(FailReason),

    /// Navigation was stopped part way, the vehicle has been halted
    Cancelled(CancelReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailReason {
    /// The goal is blocked, outside the grid, or unreachable
    NoPath,

    /// The planned path has fewer than two cells (start is the goal)
    EmptyPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// The shutdown flag was raised
    Shutdown,

    /// The mission took longer than the maximum runtime
    MaxRuntime,
}

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("Equipment error during navigation: {0}")]
    Eqpt(#[from] LocoCtrlError),

    #[error("Invalid navigation parameters: {0}")]
    InvalidParams(#[from] ParamsError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavigatorParams {
    fn default() -> Self {
        Self {
            drive_slice_s: 0.05,
            arrival_tolerance_cm: 0.5,
            stop_hold_s: 3.0,
            max_runtime_s: 180.0,
        }
    }
}

impl NavigatorParams {
    /// Check that the drive loop can make progress.
    pub fn validate(&self) -> Result<(), ParamsError> {
        ensure_positive("navigator.drive_slice_s", self.drive_slice_s)?;
        ensure_positive("navigator.arrival_tolerance_cm", self.arrival_tolerance_cm)
    }
}

impl Navigator {
    /// Create a navigator, rejecting parameters with which a run could never complete.
    ///
    /// If the parameters are rejected the drive is released before returning.
    pub fn new(
        params: NavigatorParams,
        mut loco_ctrl: LocoCtrl,
        stop_signal: Arc<StopSignal>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, NavError> {
        if let Err(e) = params.validate().and_then(|_| loco_ctrl.params().validate()) {
            if let Err(ce) = loco_ctrl.close() {
                warn!("Could not release the drive: {}", ce);
            }
            return Err(e.into());
        }

        Ok(Self {
            params,
            loco_ctrl,
            stop_signal,
            shutdown,
            mission_start: None,
            report: NavReport::default(),
        })
    }

    /// Plan a path from `start` to `goal` and drive it.
    ///
    /// Planning failures are reported as [`NavOutcome::Failed`] with no motion commanded. Once
    /// motion has started the vehicle is always halted before returning, and on an equipment
    /// error the drive is also released.
    pub fn navigate(
        &mut self,
        grid: &OccupancyGrid,
        start: GridCell,
        goal: GridCell,
    ) -> Result<NavOutcome, NavError> {
        let mission_start = Instant::now();
        self.mission_start = Some(mission_start);
        self.report = NavReport {
            start,
            goal,
            final_pose: *self.loco_ctrl.pose(),
            ..Default::default()
        };

        let result = self.plan_and_execute(grid, start, goal);

        self.report.final_pose = *self.loco_ctrl.pose();
        self.report.elapsed_s = mission_start.elapsed().as_secs_f64();
        self.report.outcome = result.as_ref().ok().copied();
        self.mission_start = None;

        match &result {
            Ok(outcome) => info!("Navigation to {} finished: {:?}", goal, outcome),
            Err(e) => error!("Navigation to {} failed: {}", goal, e),
        }

        session::save_with_timestamp("navigator/report.json", self.report.clone());

        result
    }

    /// Report from the last call to [`Navigator::navigate`].
    pub fn report(&self) -> &NavReport {
        &self.report
    }

    pub fn pose(&self) -> &Pose {
        self.loco_ctrl.pose()
    }

    /// Halt the vehicle and release the drive.
    pub fn close(&mut self) -> Result<(), NavError> {
        self.loco_ctrl.close().map_err(NavError::from)
    }

    fn plan_and_execute(
        &mut self,
        grid: &OccupancyGrid,
        start: GridCell,
        goal: GridCell,
    ) -> Result<NavOutcome, NavError> {
        let plan = path_planner::plan_with_report(grid, start, goal);
        self.report.num_expanded = plan.num_expanded;

        let path = match plan.path {
            Some(p) => p,
            None => {
                warn!("No path from {} to {}", start, goal);
                return Ok(NavOutcome::Failed(FailReason::NoPath));
            }
        };

        info!(
            "Planned path of {} cells:\n{}",
            path.len(),
            grid.render_ascii(Some(&path.cells[..]), Some(start), Some(goal))
        );
        self.report.path = Some(path.clone());

        let runs = match segment(&path) {
            Ok(r) => r,
            Err(PathError::EmptyPath) => {
                warn!("Path from {} to {} is empty", start, goal);
                return Ok(NavOutcome::Failed(FailReason::EmptyPath));
            }
            Err(e) => {
                // Planner paths are always adjacent, so this is treated as no path
                warn!("Planned path could not be segmented: {}", e);
                return Ok(NavOutcome::Failed(FailReason::NoPath));
            }
        };
        debug!("Path split into {} runs", runs.len());
        self.report.runs = runs.clone();

        // Pose tracks the vehicle from the start cell, keeping whatever heading it has
        self.loco_ctrl.arrive_at(&start);

        match self.execute(&runs) {
            Ok(outcome) => {
                // Final halt on every exit path once motion has started
                self.loco_ctrl.halt()?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(close_err) = self.loco_ctrl.close() {
                    warn!("Could not release the drive after error: {}", close_err);
                }
                Err(e)
            }
        }
    }

    fn execute(&mut self, runs: &[Run]) -> Result<NavOutcome, NavError> {
        for (i, run) in runs.iter().enumerate() {
            if let Some(reason) = self.check_cancel() {
                return Ok(NavOutcome::Cancelled(reason));
            }

            debug!(
                "Run {}/{}: {} -> {} ({:?})",
                i + 1,
                runs.len(),
                run.entry,
                run.terminal,
                run.step
            );

            if self.loco_ctrl.rotate_to(&run.terminal)? != 0.0 {
                self.report.num_rotations += 1;
            }

            if let Some(reason) = self.drive_run(run)? {
                return Ok(NavOutcome::Cancelled(reason));
            }

            self.report.num_runs_completed += 1;
            debug!("Run {} complete, pose {:?}", i + 1, self.loco_ctrl.pose());
        }

        Ok(NavOutcome::Reached)
    }

    /// Drive the length of a run in short slices, polling the stop signal between slices.
    ///
    /// Returns the reason if the run was cancelled part way.
    fn drive_run(&mut self, run: &Run) -> Result<Option<CancelReason>, NavError> {
        let (dir, mut remaining_cm) = self.loco_ctrl.straight_line_to(&run.terminal);
        let drive_rate_cms = self.loco_ctrl.params().drive_rate_cms;

        while remaining_cm > self.params.arrival_tolerance_cm {
            if let Some(reason) = self.check_cancel() {
                return Ok(Some(reason));
            }

            if self.stop_signal.consume_if_set() {
                info!(
                    "Stop requested, holding for {} s ({:.1} cm of run remaining)",
                    self.params.stop_hold_s, remaining_cm
                );
                self.loco_ctrl.halt()?;
                self.report.num_holds += 1;
                sleep_s(self.params.stop_hold_s);
                continue;
            }

            let slice_s = self
                .params
                .drive_slice_s
                .min(remaining_cm / drive_rate_cms);
            remaining_cm -= self.loco_ctrl.drive_slice(dir, slice_s)?;
        }

        self.loco_ctrl.halt()?;
        self.loco_ctrl.arrive_at(&run.terminal);

        Ok(None)
    }

    fn check_cancel(&self) -> Option<CancelReason> {
        if self.shutdown.load(Ordering::Relaxed) {
            warn!("Shutdown requested, cancelling navigation");
            return Some(CancelReason::Shutdown);
        }

        match self.mission_start {
            Some(s) if s.elapsed().as_secs_f64() > self.params.max_runtime_s => {
                warn!(
                    "Mission exceeded maximum runtime of {} s, cancelling",
                    self.params.max_runtime_s
                );
                Some(CancelReason::MaxRuntime)
            }
            _ => None,
        }
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        if let Err(e) = self.loco_ctrl.close() {
            warn!("Could not release the drive: {}", e);
        }
    }
}
