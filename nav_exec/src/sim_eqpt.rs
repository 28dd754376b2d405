//! # Simulated Equipment
//!
//! Simulated implementations of every equipment interface in [`comms_if::eqpt`]. They are used by
//! the executable when no hardware drivers are available, and by the tests.
//!
//! Each simulated item records what it was asked to do in a shared record which can be inspected
//! from another thread after the item has been moved into the navigation software.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard};

use comms_if::eqpt::{
    cam::{CamEqpt, CamImage, Classification, Classifier},
    drive::{DriveEqpt, WheelDuties},
    pan::PanEqpt,
    range::RangeEqpt,
    EqptError,
};
use image::{DynamicImage, RgbImage};
use log::trace;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated four wheel drive.
pub struct SimDrive {
    record: DriveRecord,

    /// If set, the command with this index (and all after it) fails
    fail_from: Option<usize>,
}

/// Shared record of the commands sent to a [`SimDrive`].
#[derive(Debug, Clone, Default)]
pub struct DriveRecord {
    inner: Arc<Mutex<DriveRecordInner>>,
}

#[derive(Debug, Default)]
struct DriveRecordInner {
    duties: Vec<WheelDuties>,
    closed: bool,
}

/// Simulated ranging sensor which replays a script of readings, repeating the last one forever.
pub struct SimRange {
    script: Vec<Option<f64>>,
    index: usize,
    record: ReleaseRecord,
}

/// Simulated pan servo.
pub struct SimPan {
    record: PanRecord,
    fail: bool,
}

/// Shared record of the angles commanded to a [`SimPan`].
#[derive(Debug, Clone, Default)]
pub struct PanRecord {
    inner: Arc<Mutex<Vec<(u8, i32)>>>,
}

/// Simulated camera producing small blank frames.
pub struct SimCam {
    record: ReleaseRecord,
    fail: bool,
}

/// Simulated classifier which replays a script of labels, repeating the last one forever.
pub struct SimClassifier {
    script: Vec<Classification>,
    index: usize,
}

/// Shared record of whether a piece of equipment has been released.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRecord {
    inner: Arc<Mutex<ReleaseInner>>,
}

#[derive(Debug, Default)]
struct ReleaseInner {
    num_uses: usize,
    released: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimDrive {
    pub fn new() -> Self {
        Self {
            record: DriveRecord::default(),
            fail_from: None,
        }
    }

    /// A drive which fails on the `n`th command (zero indexed) and every command after.
    pub fn failing_from(n: usize) -> Self {
        Self {
            record: DriveRecord::default(),
            fail_from: Some(n),
        }
    }

    pub fn record(&self) -> DriveRecord {
        self.record.clone()
    }
}

impl Default for SimDrive {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveEqpt for SimDrive {
    fn set_wheel_duties(&mut self, duties: WheelDuties) -> Result<(), EqptError> {
        let mut rec = lock(&self.record.inner);

        if rec.closed {
            return Err(EqptError::Released);
        }
        if let Some(n) = self.fail_from {
            if rec.duties.len() >= n {
                return Err(EqptError::Fault("simulated drive fault".into()));
            }
        }

        trace!("SimDrive: {:?}", duties);
        rec.duties.push(duties);
        Ok(())
    }

    fn close(&mut self) -> Result<(), EqptError> {
        lock(&self.record.inner).closed = true;
        Ok(())
    }
}

impl DriveRecord {
    /// Every set of duties accepted by the drive, in order.
    pub fn duties(&self) -> Vec<WheelDuties> {
        lock(&self.inner).duties.clone()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner).closed
    }
}

impl SimRange {
    pub fn new(script: Vec<Option<f64>>) -> Self {
        Self {
            script,
            index: 0,
            record: ReleaseRecord::default(),
        }
    }

    /// A sensor which always reads the same value.
    pub fn constant(distance_cm: Option<f64>) -> Self {
        Self::new(vec![distance_cm])
    }

    pub fn record(&self) -> ReleaseRecord {
        self.record.clone()
    }
}

impl RangeEqpt for SimRange {
    fn sample_distance_cm(&mut self) -> Result<Option<f64>, EqptError> {
        self.record.use_once()?;

        let sample = next_scripted(&self.script, &mut self.index).flatten();
        Ok(sample)
    }

    fn close(&mut self) -> Result<(), EqptError> {
        self.record.release();
        Ok(())
    }
}

impl SimPan {
    pub fn new() -> Self {
        Self {
            record: PanRecord::default(),
            fail: false,
        }
    }

    /// A servo which rejects every command.
    pub fn failing() -> Self {
        Self {
            record: PanRecord::default(),
            fail: true,
        }
    }

    pub fn record(&self) -> PanRecord {
        self.record.clone()
    }
}

impl Default for SimPan {
    fn default() -> Self {
        Self::new()
    }
}

impl PanEqpt for SimPan {
    fn set_angle(&mut self, channel: u8, angle_deg: i32) -> Result<(), EqptError> {
        if self.fail {
            return Err(EqptError::Fault("simulated servo fault".into()));
        }

        lock(&self.record.inner).push((channel, angle_deg));
        Ok(())
    }
}

impl PanRecord {
    /// Every `(channel, angle)` command sent to the servo, in order.
    pub fn commands(&self) -> Vec<(u8, i32)> {
        lock(&self.inner).clone()
    }

    pub fn angles(&self) -> Vec<i32> {
        lock(&self.inner).iter().map(|(_, a)| *a).collect()
    }
}

impl SimCam {
    pub fn new() -> Self {
        Self {
            record: ReleaseRecord::default(),
            fail: false,
        }
    }

    /// A camera for which every acquisition fails.
    pub fn failing() -> Self {
        Self {
            record: ReleaseRecord::default(),
            fail: true,
        }
    }

    pub fn record(&self) -> ReleaseRecord {
        self.record.clone()
    }
}

impl Default for SimCam {
    fn default() -> Self {
        Self::new()
    }
}

impl CamEqpt for SimCam {
    fn acquire(&mut self) -> Result<CamImage, EqptError> {
        self.record.use_once()?;

        if self.fail {
            return Err(EqptError::Fault("simulated camera fault".into()));
        }

        Ok(CamImage::now(DynamicImage::ImageRgb8(RgbImage::new(8, 6))))
    }

    fn stop(&mut self) -> Result<(), EqptError> {
        self.record.release();
        Ok(())
    }
}

impl SimClassifier {
    pub fn new(script: Vec<Classification>) -> Self {
        Self { script, index: 0 }
    }

    /// A classifier which always gives the same label with full confidence.
    pub fn constant(label: &str) -> Self {
        Self::new(vec![Classification {
            label: label.into(),
            confidence: 1.0,
        }])
    }
}

impl Classifier for SimClassifier {
    fn classify(&mut self, _image: &CamImage) -> Result<Classification, EqptError> {
        next_scripted(&self.script, &mut self.index)
            .ok_or_else(|| EqptError::Fault("classifier has no labels".into()))
    }
}

impl ReleaseRecord {
    /// Number of successful uses of the equipment.
    pub fn num_uses(&self) -> usize {
        lock(&self.inner).num_uses
    }

    pub fn is_released(&self) -> bool {
        lock(&self.inner).released
    }

    fn use_once(&self) -> Result<(), EqptError> {
        let mut inner = lock(&self.inner);
        if inner.released {
            return Err(EqptError::Released);
        }
        inner.num_uses += 1;
        Ok(())
    }

    fn release(&self) {
        lock(&self.inner).released = true;
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get the next item from a script, holding on the last item once the end is reached.
fn next_scripted<T: Clone>(script: &[T], index: &mut usize) -> Option<T> {
    let item = script.get((*index).min(script.len().saturating_sub(1))).cloned();
    *index += 1;
    item
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_drive() {
        let mut drive = SimDrive::failing_from(2);
        let record = drive.record();

        drive.set_wheel_duties(WheelDuties::new(1, 2, 3, 4)).unwrap();
        drive.set_wheel_duties(WheelDuties::STOP).unwrap();
        assert!(drive.set_wheel_duties(WheelDuties::STOP).is_err());

        assert_eq!(record.duties().len(), 2);
        drive.close().unwrap();
        assert!(record.is_closed());
    }

    #[test]
    fn test_scripts() {
        let mut range = SimRange::new(vec![Some(10.0), None, Some(30.0)]);
        let readings: Vec<_> = (0..5).map(|_| range.sample_distance_cm().unwrap()).collect();
        assert_eq!(
            readings,
            vec![Some(10.0), None, Some(30.0), Some(30.0), Some(30.0)]
        );

        let record = range.record();
        range.close().unwrap();
        assert!(record.is_released());
        assert!(matches!(
            range.sample_distance_cm(),
            Err(EqptError::Released)
        ));

        let mut empty = SimRange::new(vec![]);
        assert_eq!(empty.sample_distance_cm().unwrap(), None);
    }
}
