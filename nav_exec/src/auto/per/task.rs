//! Perception task, run on its own thread alongside the navigator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{SyncSender, TrySendError},
        Arc,
    },
    thread::{self, JoinHandle},
};

use comms_if::eqpt::{
    cam::{CamEqpt, CamImage, Classification, Classifier},
    pan::PanEqpt,
    range::RangeEqpt,
};
use log::{debug, info, trace, warn};
use serde::Serialize;

use super::{Label, PanCtrl, PerError, PerParams, SweepState};
use crate::auto::{
    map::{ObstacleMapBuilder, ObstacleMapParams, OccupancyGrid, PolarSample},
    stop_signal::StopSignal,
};
use util::time::sleep_s;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The equipment used by the perception task. All of it is released when the task ends.
pub struct PerEqpt {
    pub pan: Box<dyn PanEqpt>,
    pub range: Box<dyn RangeEqpt>,
    pub cam: Box<dyn CamEqpt>,
    pub classifier: Box<dyn Classifier>,
}

pub struct PerceptionTask {
    params: PerParams,
    map_params: ObstacleMapParams,

    pan: PanCtrl,
    range: Box<dyn RangeEqpt>,
    cam: Box<dyn CamEqpt>,
    classifier: Box<dyn Classifier>,

    stop_signal: Arc<StopSignal>,
    shutdown: Arc<AtomicBool>,

    /// Channel on which obstacle maps are offered, `None` if there is no listener
    map_sender: Option<SyncSender<OccupancyGrid>>,

    state: SweepState,
    report: PerReport,
}

/// Result of a single sweep step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub sample: PolarSample,
    pub classification: Option<Classification>,
    pub label: Label,

    /// True if a stop was requested on this step
    pub hazard: bool,
}

/// Summary of a perception task's run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerReport {
    pub num_steps: usize,
    pub num_legs: usize,
    pub num_hazards: usize,
    pub num_maps_published: usize,
    pub num_maps_dropped: usize,
    pub final_state: SweepState,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PerceptionTask {
    pub fn new(
        params: PerParams,
        map_params: ObstacleMapParams,
        eqpt: PerEqpt,
        stop_signal: Arc<StopSignal>,
        shutdown: Arc<AtomicBool>,
        map_sender: Option<SyncSender<OccupancyGrid>>,
    ) -> Self {
        let pan = PanCtrl::new(
            eqpt.pan,
            params.pan_channel,
            params.angle_min_deg,
            params.angle_max_deg,
        );

        Self {
            params,
            map_params,
            pan,
            range: eqpt.range,
            cam: eqpt.cam,
            classifier: eqpt.classifier,
            stop_signal,
            shutdown,
            map_sender,
            state: SweepState::Idle,
            report: PerReport::default(),
        }
    }

    /// Run the task on a new thread.
    pub fn spawn(self) -> Result<JoinHandle<Result<PerReport, PerError>>, PerError> {
        thread::Builder::new()
            .name("auto::per".into())
            .spawn(move || self.run())
            .map_err(PerError::ThreadSpawnFailed)
    }

    /// Sweep until the shutdown flag is raised, then release the equipment.
    ///
    /// Errors in individual steps are logged and treated as "no hazard". If the sweep window is
    /// inverted, or the servo cannot be moved to its starting angle, the equipment is released and
    /// an error returned.
    pub fn run(mut self) -> Result<PerReport, PerError> {
        debug!("Perception task starting");

        if self.params.angle_min_deg > self.params.angle_max_deg {
            self.release();
            return Err(PerError::InvalidWindow {
                min_deg: self.params.angle_min_deg,
                max_deg: self.params.angle_max_deg,
            });
        }

        if let Err(e) = self.pan.move_to(self.params.angle_min_deg) {
            self.release();
            return Err(PerError::InitFailed(e));
        }
        sleep_s(self.params.settle_dwell_s);

        self.state = self.state.leg_complete();

        'sweep: while self.state.is_sweeping() {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            let mut builder =
                ObstacleMapBuilder::new(self.map_params.clone(), self.params.centre_angle_deg());

            for angle in self.state.leg_angles(&self.params) {
                if self.shutdown.load(Ordering::Relaxed) {
                    break 'sweep;
                }

                let step = self.step(angle);
                builder.add_sample(&step.sample);
            }

            self.publish(builder.finish());
            self.report.num_legs += 1;
            self.state = self.state.leg_complete();
        }

        self.state = self.state.shutdown();
        debug!("Perception task stopping");
        self.release();

        info!(
            "Perception task stopped after {} steps, {} hazards",
            self.report.num_steps, self.report.num_hazards
        );

        Ok(self.report)
    }

    /// Perform a single step of the sweep at the given angle.
    pub fn step(&mut self, angle_deg: i32) -> StepReport {
        if let Err(e) = self.pan.move_to(angle_deg) {
            warn!("Could not pan to {} deg: {}", angle_deg, e);
        }
        sleep_s(self.params.settle_dwell_s);

        let raw_cm = match self.range.sample_distance_cm() {
            Ok(d) => d,
            Err(e) => {
                warn!("Range sample failed: {}", e);
                None
            }
        };
        let sample = PolarSample::from_raw(raw_cm, angle_deg as f64, &self.map_params);

        let classification = match self.cam.acquire() {
            Ok(frame) => {
                if let Some(ref dir) = self.params.frames_dir {
                    archive_frame(dir, angle_deg, &frame);
                }

                match self.classifier.classify(&frame) {
                    Ok(c) => Some(c),
                    Err(e) => {
                        warn!("Classification failed: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                warn!("Frame acquisition failed: {}", e);
                None
            }
        };

        let label = classification
            .as_ref()
            .map(|c| Label::from_classification(c, &self.params.hazard_label))
            .unwrap_or(Label::Benign);

        let hazard = label == Label::Hazard
            && sample
                .distance_cm
                .map_or(false, |d| d < self.params.hazard_distance_cm);

        trace!(
            "Step at {} deg: {:?} cm, {:?}",
            angle_deg,
            sample.distance_cm,
            label
        );

        if hazard {
            info!(
                "Hazard \"{}\" at {:?} cm, requesting stop",
                self.params.hazard_label, sample.distance_cm
            );
            self.stop_signal.request();
            self.report.num_hazards += 1;
        }

        self.report.num_steps += 1;
        sleep_s(self.params.sweep_dwell_s);

        StepReport {
            sample,
            classification,
            label,
            hazard,
        }
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Offer a map to the listener, dropping it if the listener hasn't taken the last one.
    fn publish(&mut self, map: OccupancyGrid) {
        let sender = match self.map_sender {
            Some(ref s) => s,
            None => return,
        };

        match sender.try_send(map) {
            Ok(_) => self.report.num_maps_published += 1,
            Err(TrySendError::Full(_)) => {
                trace!("Obstacle map listener busy, dropping map");
                self.report.num_maps_dropped += 1;
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Obstacle map listener gone, no longer publishing");
                self.map_sender = None;
            }
        }
    }

    /// Release the range sensor and camera.
    fn release(&mut self) {
        if let Err(e) = self.range.close() {
            warn!("Could not close the range sensor: {}", e);
        }
        if let Err(e) = self.cam.stop() {
            warn!("Could not stop the camera: {}", e);
        }

        self.state = self.state.shutdown().released();
        self.report.final_state = self.state;
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn archive_frame(dir: &Path, angle_deg: i32, frame: &CamImage) {
    let path = dir.join(format!(
        "frame_{}_{}.png",
        angle_deg,
        frame.timestamp.timestamp_millis()
    ));

    if let Err(e) = std::fs::create_dir_all(dir).and_then(|_| {
        frame
            .image
            .save(&path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }) {
        warn!("Could not archive frame to {:?}: {}", path, e);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
