//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The executable runs a single mission described in `mission.toml`:
//!
//!     - Initialise the session, logging and parameters
//!     - Start the perception task on its own thread
//!     - Navigate from the mission start to the mission goal
//!     - Halt and release the drive, stop perception and archive the last obstacle map
//!
//! No hardware drivers are linked into this executable, all equipment is simulated.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::sync::{atomic::AtomicBool, mpsc, Arc};

// Internal
use nav_lib::{
    auto::{
        loc::Pose,
        nav::{NavOutcome, Navigator},
        per::{PerEqpt, PerError, PerceptionTask},
        stop_signal::StopSignal,
    },
    loco_ctrl::LocoCtrl,
    params::{MissionParams, NavExecParams},
    sim_eqpt::{SimCam, SimClassifier, SimDrive, SimPan, SimRange},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, LevelFilter::Info, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let mut params: NavExecParams =
        util::params::load("nav_exec.toml").wrap_err("Could not load executable params")?;
    let mission: MissionParams =
        util::params::load("mission.toml").wrap_err("Could not load the mission")?;
    params.validate().wrap_err("Invalid executable params")?;

    // Frames are archived inside the session
    if let Some(ref dir) = params.per.frames_dir {
        params.per.frames_dir = Some(session.session_root.join(dir));
    }

    session::save("params/nav_exec.json", params.clone());
    info!("Parameters loaded");

    let grid = mission.grid().wrap_err("Invalid mission grid")?;
    info!(
        "Mission: {} -> {} across a {} x {} grid with {} blocked cells",
        mission.start,
        mission.goal,
        grid.num_rows(),
        grid.num_cols(),
        grid.num_blocked()
    );

    // ---- INITIALISE MODULES ----

    let stop_signal = Arc::new(StopSignal::new());
    let shutdown = Arc::new(AtomicBool::new(false));
    let (map_sender, map_receiver) = mpsc::sync_channel(1);

    let per_jh = PerceptionTask::new(
        params.per.clone(),
        params.obstacle_map.clone(),
        PerEqpt {
            pan: Box::new(SimPan::new()),
            range: Box::new(SimRange::new(vec![
                Some(120.0),
                Some(80.0),
                None,
                Some(45.0),
            ])),
            cam: Box::new(SimCam::new()),
            classifier: Box::new(SimClassifier::constant("background")),
        },
        stop_signal.clone(),
        shutdown.clone(),
        Some(map_sender),
    )
    .spawn()
    .wrap_err("Failed to start the perception task")?;
    info!("Perception task started");

    let start_pose = Pose::at_cell(&mission.start, params.loco_ctrl.cell_size_cm);
    let loco_ctrl = LocoCtrl::new(
        params.loco_ctrl.clone(),
        Box::new(SimDrive::new()),
        start_pose,
    );
    let mut navigator = Navigator::new(
        params.navigator.clone(),
        loco_ctrl,
        stop_signal.clone(),
        shutdown.clone(),
    )
    .wrap_err("Failed to create the navigator")?;

    info!("Module initialisation complete\n");

    // ---- NAVIGATE ----

    let nav_result = navigator.navigate(&grid, mission.start, mission.goal);

    // ---- SHUTDOWN ----

    if let Err(e) = navigator.close() {
        warn!("Error releasing the drive: {}", e);
    }

    shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
    let per_result = per_jh
        .join()
        .map_err(|_| PerError::ThreadPanicked)
        .and_then(|r| r);

    match per_result {
        Ok(report) => {
            info!("Perception report: {:?}", report);
            session::save("perception/report.json", report);
        }
        Err(e) => warn!("Perception task ended with an error: {}", e),
    }

    // Archive the most recent obstacle map
    if let Some(map) = map_receiver.try_iter().last() {
        info!("Latest obstacle map:\n{}", map);
        session::save("obstacle_map/latest.json", map);
    }

    info!(
        "Stop signal: {} requests, {} consumed",
        stop_signal.num_requests(),
        stop_signal.num_consumed()
    );

    session.exit();

    match nav_result.wrap_err("Navigation failed")? {
        NavOutcome::Reached => Ok(()),
        outcome => Err(eyre!("Goal not reached: {:?}", outcome)),
    }
}
