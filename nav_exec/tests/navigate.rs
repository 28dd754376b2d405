//! End-to-end navigation tests against simulated equipment.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc,
};

use comms_if::eqpt::{
    drive::{DriveEqpt, WheelDuties},
    EqptError,
};
use nav_lib::{
    auto::{
        loc::Pose,
        map::{CellState, GridCell, ObstacleMapParams, OccupancyGrid},
        nav::{CancelReason, FailReason, NavError, NavOutcome, Navigator, NavigatorParams},
        per::{PerEqpt, PerParams, PerceptionTask},
        stop_signal::StopSignal,
    },
    loco_ctrl::{Direction, LocoCtrl, LocoCtrlParams},
    sim_eqpt::{DriveRecord, SimCam, SimClassifier, SimDrive, SimPan, SimRange},
};

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

/// Calibration which drives a 20 cm cell in 10 ms with no dwells.
fn fast_loco_params() -> LocoCtrlParams {
    LocoCtrlParams {
        drive_rate_cms: 2000.0,
        turn_rate_degs: 9000.0,
        ..LocoCtrlParams::default().without_dwells()
    }
}

fn fast_nav_params() -> NavigatorParams {
    NavigatorParams {
        drive_slice_s: 0.002,
        stop_hold_s: 0.0,
        ..Default::default()
    }
}

struct Harness {
    navigator: Navigator,
    record: DriveRecord,
    stop_signal: Arc<StopSignal>,
    shutdown: Arc<AtomicBool>,
}

fn harness_with(drive: Box<dyn DriveEqpt>, record: DriveRecord, nav: NavigatorParams) -> Harness {
    let stop_signal = Arc::new(StopSignal::new());
    let shutdown = Arc::new(AtomicBool::new(false));
    let loco_ctrl = LocoCtrl::new(fast_loco_params(), drive, Pose::default());

    Harness {
        navigator: Navigator::new(nav, loco_ctrl, stop_signal.clone(), shutdown.clone()).unwrap(),
        record,
        stop_signal,
        shutdown,
    }
}

fn harness() -> Harness {
    let drive = SimDrive::new();
    let record = drive.record();
    harness_with(Box::new(drive), record, fast_nav_params())
}

/// Drive which raises a stop request the first time it is commanded forwards, standing in for a
/// perception task seeing a hazard part way through a run.
struct StopOnFirstForward {
    inner: SimDrive,
    stop_signal: Arc<StopSignal>,
    fired: bool,
}

impl DriveEqpt for StopOnFirstForward {
    fn set_wheel_duties(&mut self, duties: WheelDuties) -> Result<(), EqptError> {
        self.inner.set_wheel_duties(duties)?;

        if !self.fired && duties == Direction::Forward.duties(&fast_loco_params()) {
            self.fired = true;
            self.stop_signal.request();
        }

        Ok(())
    }

    fn close(&mut self) -> Result<(), EqptError> {
        self.inner.close()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn straight_row_is_one_run() {
    let mut h = harness();
    let grid = OccupancyGrid::new(10, 10);
    let params = fast_loco_params();

    let outcome = h
        .navigator
        .navigate(&grid, GridCell::new(0, 0), GridCell::new(0, 9))
        .unwrap();
    assert_eq!(outcome, NavOutcome::Reached);

    let report = h.navigator.report();
    assert_eq!(report.path.as_ref().unwrap().len(), 10);
    assert!(report.num_expanded >= 10);
    assert_eq!(report.runs.len(), 1);
    assert_eq!(report.num_runs_completed, 1);

    // Only the initial alignment to face along the row
    assert_eq!(report.num_rotations, 1);
    let duties = h.record.duties();
    assert_eq!(
        duties
            .iter()
            .filter(|d| **d == Direction::Left.duties(&params))
            .count(),
        1
    );
    assert!(!duties.contains(&Direction::Right.duties(&params)));
    assert!(duties.contains(&Direction::Forward.duties(&params)));
    assert!(duties.last().unwrap().is_stop());

    let pose = h.navigator.pose();
    assert!((pose.position_cm.x - 0.0).abs() < 1e-9);
    assert!((pose.position_cm.y - 180.0).abs() < 1e-9);
    assert!((pose.yaw_deg - 90.0).abs() < 1e-9);
    assert_eq!(report.final_pose, *pose);

    // Drive is still held until the navigator is closed
    assert!(!h.record.is_closed());
    h.navigator.close().unwrap();
    assert!(h.record.is_closed());
}

#[test]
fn blocking_row_gives_no_path_without_motion() {
    let mut h = harness();
    let mut grid = OccupancyGrid::new(10, 10);
    for col in 0..10 {
        grid.set(&GridCell::new(5, col), CellState::Blocked).unwrap();
    }

    let outcome = h
        .navigator
        .navigate(&grid, GridCell::new(0, 0), GridCell::new(9, 9))
        .unwrap();

    assert_eq!(outcome, NavOutcome::Failed(FailReason::NoPath));
    assert!(h.record.duties().is_empty());
    assert_eq!(*h.navigator.pose(), Pose::default());
    assert!(h.navigator.report().path.is_none());

    // Every cell on the start side of the wall is searched once
    assert_eq!(h.navigator.report().num_expanded, 50);
}

#[test]
fn start_at_goal_gives_empty_path() {
    let mut h = harness();
    let grid = OccupancyGrid::new(3, 3);

    let outcome = h
        .navigator
        .navigate(&grid, GridCell::new(1, 1), GridCell::new(1, 1))
        .unwrap();

    assert_eq!(outcome, NavOutcome::Failed(FailReason::EmptyPath));
    assert!(h.record.duties().is_empty());
}

#[test]
fn path_around_obstacle() {
    let mut h = harness();
    let grid = OccupancyGrid::from_ascii(&[
        "     ", //
        "  #  ", //
        "  #  ", //
        "  #  ", //
        "     ",
    ]);
    let goal = GridCell::new(2, 4);

    let outcome = h
        .navigator
        .navigate(&grid, GridCell::new(2, 0), goal)
        .unwrap();
    assert_eq!(outcome, NavOutcome::Reached);

    let report = h.navigator.report();
    assert_eq!(report.path.as_ref().unwrap().num_steps(), 8);
    assert!(report.runs.len() >= 3);
    assert_eq!(report.num_runs_completed, report.runs.len());

    let expected = nav_lib::auto::loc::cell_to_world_cm(&goal, fast_loco_params().cell_size_cm);
    assert!((h.navigator.pose().position_cm - expected).norm() < 1e-9);
}

#[test]
fn stop_request_holds_then_resumes() {
    let drive = SimDrive::new();
    let record = drive.record();
    let stop_signal = Arc::new(StopSignal::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    let loco_ctrl = LocoCtrl::new(
        fast_loco_params(),
        Box::new(StopOnFirstForward {
            inner: drive,
            stop_signal: stop_signal.clone(),
            fired: false,
        }),
        Pose::default(),
    );
    let mut navigator = Navigator::new(
        NavigatorParams {
            stop_hold_s: 0.02,
            ..fast_nav_params()
        },
        loco_ctrl,
        stop_signal.clone(),
        shutdown,
    )
    .unwrap();

    // Straight ahead so no rotation is needed
    let grid = OccupancyGrid::new(5, 5);
    let outcome = navigator
        .navigate(&grid, GridCell::new(0, 0), GridCell::new(3, 0))
        .unwrap();
    assert_eq!(outcome, NavOutcome::Reached);

    let fwd = Direction::Forward.duties(&fast_loco_params());
    assert_eq!(
        record.duties(),
        vec![
            fwd,
            WheelDuties::STOP,
            fwd,
            WheelDuties::STOP,
            WheelDuties::STOP
        ]
    );

    let report = navigator.report();
    assert_eq!(report.num_holds, 1);
    assert!(report.elapsed_s >= 0.02);
    assert_eq!(stop_signal.num_requests(), 1);
    assert_eq!(stop_signal.num_consumed(), 1);
    assert!(!stop_signal.is_set());
}

#[test]
fn shutdown_cancels_and_halts() {
    let mut h = harness();
    h.shutdown.store(true, Ordering::Relaxed);

    let outcome = h
        .navigator
        .navigate(&OccupancyGrid::new(4, 4), GridCell::new(0, 0), GridCell::new(3, 3))
        .unwrap();

    assert_eq!(outcome, NavOutcome::Cancelled(CancelReason::Shutdown));
    assert_eq!(h.record.duties(), vec![WheelDuties::STOP]);
}

#[test]
fn max_runtime_cancels() {
    let drive = SimDrive::new();
    let record = drive.record();
    let mut h = harness_with(
        Box::new(drive),
        record,
        NavigatorParams {
            max_runtime_s: -1.0,
            ..fast_nav_params()
        },
    );

    let outcome = h
        .navigator
        .navigate(&OccupancyGrid::new(4, 4), GridCell::new(0, 0), GridCell::new(3, 3))
        .unwrap();

    assert_eq!(outcome, NavOutcome::Cancelled(CancelReason::MaxRuntime));
    assert!(h.record.duties().iter().all(|d| d.is_stop()));
}

#[test]
fn drive_fault_halts_and_releases() {
    // First command (the halt before the initial rotation) succeeds, the spin fails
    let drive = SimDrive::failing_from(1);
    let record = drive.record();
    let mut h = harness_with(Box::new(drive), record, fast_nav_params());

    let result = h
        .navigator
        .navigate(&OccupancyGrid::new(4, 4), GridCell::new(0, 0), GridCell::new(0, 3));

    assert!(matches!(result, Err(NavError::Eqpt(_))));
    assert!(h.record.is_closed());
    assert_eq!(h.navigator.report().outcome, None);
}

#[test]
fn zero_drive_slice_is_rejected_and_releases_drive() {
    let drive = SimDrive::new();
    let record = drive.record();
    let loco_ctrl = LocoCtrl::new(fast_loco_params(), Box::new(drive), Pose::default());

    let result = Navigator::new(
        NavigatorParams {
            drive_slice_s: 0.0,
            ..fast_nav_params()
        },
        loco_ctrl,
        Arc::new(StopSignal::new()),
        Arc::new(AtomicBool::new(false)),
    );

    assert!(matches!(result, Err(NavError::InvalidParams(_))));
    assert!(record.is_closed());
}

#[test]
fn zero_drive_rate_is_rejected() {
    let loco_ctrl = LocoCtrl::new(
        LocoCtrlParams {
            drive_rate_cms: 0.0,
            ..fast_loco_params()
        },
        Box::new(SimDrive::new()),
        Pose::default(),
    );

    let result = Navigator::new(
        fast_nav_params(),
        loco_ctrl,
        Arc::new(StopSignal::new()),
        Arc::new(AtomicBool::new(false)),
    );

    assert!(matches!(result, Err(NavError::InvalidParams(_))));
}

#[test]
fn drop_releases_drive() {
    let h = harness();
    let record = h.record.clone();

    drop(h);
    assert!(record.is_closed());
    assert_eq!(record.duties(), vec![WheelDuties::STOP]);
}

#[test]
fn navigate_alongside_perception() {
    let h = harness();
    let (map_sender, map_receiver) = mpsc::sync_channel(1);

    let range = SimRange::constant(Some(15.0));
    let range_record = range.record();

    let per_jh = PerceptionTask::new(
        PerParams {
            settle_dwell_s: 0.01,
            sweep_dwell_s: 0.0,
            hazard_label: "stop".into(),
            ..Default::default()
        },
        ObstacleMapParams::default(),
        PerEqpt {
            pan: Box::new(SimPan::new()),
            range: Box::new(range),
            cam: Box::new(SimCam::new()),
            classifier: Box::new(SimClassifier::constant("stop")),
        },
        h.stop_signal.clone(),
        h.shutdown.clone(),
        Some(map_sender),
    )
    .spawn()
    .unwrap();

    let Harness {
        mut navigator,
        record,
        stop_signal,
        shutdown,
    } = h;

    let outcome = navigator
        .navigate(&OccupancyGrid::new(6, 6), GridCell::new(0, 0), GridCell::new(5, 5))
        .unwrap();
    assert_eq!(outcome, NavOutcome::Reached);
    navigator.close().unwrap();

    shutdown.store(true, Ordering::Relaxed);
    let per_report = per_jh.join().unwrap().unwrap();

    // Every hazard was requested, and every hold consumed exactly one request
    assert_eq!(stop_signal.num_requests() as usize, per_report.num_hazards);
    assert_eq!(
        stop_signal.num_consumed() as usize,
        navigator.report().num_holds
    );
    assert!(range_record.is_released());
    assert!(record.is_closed());

    // The report serialises for archiving
    let json = serde_json::to_string(navigator.report()).unwrap();
    assert!(json.contains("Reached"));

    // The first published map stays in the channel, later ones are dropped while it is full
    if per_report.num_maps_published > 0 {
        let map = map_receiver.try_recv().unwrap();
        assert!(map.num_blocked() > 0);
    }
}
