//! # Obstacle Map Builder
//!
//! Converts polar range samples from the perception sweep into a local [`OccupancyGrid`].
//!
//! The obstacle map is vehicle-centred: the sensor sits at `(row 0, centre_col)`, rows increase
//! along the sweep centre line and columns increase to the left. Each valid hit is feathered by a
//! Chebyshev radius so that thin obstacles cannot be stepped around by the planner.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use super::{CellState, GridCell, OccupancyGrid};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleMapParams {
    /// Minimum plausible range reading, readings below this are treated as no echo.
    pub valid_min_cm: f64,

    /// Maximum plausible range reading, readings above this are treated as no echo.
    pub valid_max_cm: f64,

    /// Only hits at or closer than this distance are marked in the map.
    pub detection_threshold_cm: f64,

    /// Size of one obstacle map cell.
    pub grid_increment_cm: f64,

    /// Chebyshev radius by which every hit is dilated.
    pub feather_radius: usize,

    pub num_rows: usize,

    pub num_cols: usize,
}

/// A single observation from the perception sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarSample {
    /// Measured distance, `None` if there was no echo or the reading was implausible.
    pub distance_cm: Option<f64>,

    /// Pan angle the sample was taken at.
    pub sweep_angle_deg: f64,
}

/// Accumulates polar samples into a single obstacle map.
///
/// Marking is monotonic, a cell once blocked is never cleared by the same builder.
#[derive(Debug, Clone)]
pub struct ObstacleMapBuilder {
    params: ObstacleMapParams,

    /// Pan angle which corresponds to straight ahead.
    centre_angle_deg: f64,

    map: OccupancyGrid,

    num_hits: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ObstacleMapParams {
    fn default() -> Self {
        Self {
            valid_min_cm: 2.0,
            valid_max_cm: 300.0,
            detection_threshold_cm: 100.0,
            grid_increment_cm: 10.0,
            feather_radius: 1,
            num_rows: 11,
            num_cols: 11,
        }
    }
}

impl ObstacleMapParams {
    /// The column in which the sensor sits.
    pub fn centre_col(&self) -> usize {
        self.num_cols / 2
    }
}

impl PolarSample {
    /// Build a sample from a raw range reading, rejecting readings outside the plausibility
    /// window.
    pub fn from_raw(raw_cm: Option<f64>, sweep_angle_deg: f64, params: &ObstacleMapParams) -> Self {
        let distance_cm = raw_cm
            .filter(|d| d.is_finite() && *d >= params.valid_min_cm && *d <= params.valid_max_cm);

        if raw_cm.is_some() && distance_cm.is_none() {
            trace!(
                "Discarding implausible range {:?} cm at {} deg",
                raw_cm,
                sweep_angle_deg
            );
        }

        Self {
            distance_cm,
            sweep_angle_deg,
        }
    }
}

impl ObstacleMapBuilder {
    pub fn new(params: ObstacleMapParams, centre_angle_deg: f64) -> Self {
        let map = OccupancyGrid::new(params.num_rows, params.num_cols);

        Self {
            params,
            centre_angle_deg,
            map,
            num_hits: 0,
        }
    }

    /// Add a sample to the map.
    ///
    /// Returns the cell which was marked, or `None` if the sample was discarded (no echo, outside
    /// the detection window, or projected outside the map).
    pub fn add_sample(&mut self, sample: &PolarSample) -> Option<GridCell> {
        let distance_cm = sample.distance_cm?;

        if distance_cm < self.params.valid_min_cm
            || distance_cm > self.params.detection_threshold_cm
        {
            trace!(
                "Sample {} cm at {} deg outside detection window",
                distance_cm,
                sample.sweep_angle_deg
            );
            return None;
        }

        let (col, row) = to_grid_cell(
            distance_cm,
            sample.sweep_angle_deg - self.centre_angle_deg,
            self.params.grid_increment_cm,
            self.params.centre_col(),
        );

        if col < 0 || row < 0 {
            trace!("Hit ({}, {}) projected outside map", row, col);
            return None;
        }

        let cell = GridCell::new(row as usize, col as usize);
        if !self.map.in_bounds(&cell) {
            trace!("Hit {} projected outside map", cell);
            return None;
        }

        self.paint(&cell, self.params.feather_radius);
        self.num_hits += 1;

        Some(cell)
    }

    /// Mark `cell` and every in-bounds cell within `feather_radius` of it (Chebyshev distance) as
    /// blocked.
    pub fn paint(&mut self, cell: &GridCell, feather_radius: usize) {
        let r = feather_radius as i64;

        for d_row in -r..=r {
            for d_col in -r..=r {
                if let Some(c) = cell.offset(d_row, d_col) {
                    // Out of bounds cells are simply skipped
                    self.map.set(&c, CellState::Blocked).ok();
                }
            }
        }
    }

    /// Number of samples which produced a mark.
    pub fn num_hits(&self) -> usize {
        self.num_hits
    }

    pub fn map(&self) -> &OccupancyGrid {
        &self.map
    }

    /// Consume the builder, returning the finished map.
    pub fn finish(self) -> OccupancyGrid {
        self.map
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Project a polar observation into obstacle map coordinates, returning `(col, row)`.
///
/// `offset_angle_deg` is measured from the sweep centre, positive to the left. The result may lie
/// outside the map, in which case it is up to the caller to discard it.
pub fn to_grid_cell(
    distance_cm: f64,
    offset_angle_deg: f64,
    grid_increment_cm: f64,
    centre_col: usize,
) -> (i64, i64) {
    let offset_rad = offset_angle_deg.to_radians();

    let col = centre_col as i64 + (distance_cm * offset_rad.sin() / grid_increment_cm).round() as i64;
    let row = (distance_cm * offset_rad.cos() / grid_increment_cm).round() as i64;

    (col, row)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_grid_cell() {
        // Straight ahead
        assert_eq!(to_grid_cell(50.0, 0.0, 10.0, 5), (5, 5));

        // Fully to the left and right
        assert_eq!(to_grid_cell(30.0, 90.0, 10.0, 5), (8, 0));
        assert_eq!(to_grid_cell(30.0, -90.0, 10.0, 5), (2, 0));

        // 45 degrees, 42.4 cm -> 3 cells each way
        assert_eq!(to_grid_cell(42.4, 45.0, 10.0, 5), (8, 3));
    }

    #[test]
    fn test_sample_validity() {
        let params = ObstacleMapParams::default();

        assert_eq!(PolarSample::from_raw(Some(1.0), 0.0, &params).distance_cm, None);
        assert_eq!(PolarSample::from_raw(Some(301.0), 0.0, &params).distance_cm, None);
        assert_eq!(PolarSample::from_raw(None, 0.0, &params).distance_cm, None);
        assert_eq!(PolarSample::from_raw(Some(f64::NAN), 0.0, &params).distance_cm, None);
        assert_eq!(
            PolarSample::from_raw(Some(150.0), 10.0, &params),
            PolarSample {
                distance_cm: Some(150.0),
                sweep_angle_deg: 10.0
            }
        );
    }

    #[test]
    fn test_boundary_rejection() {
        let params = ObstacleMapParams::default();
        let mut builder = ObstacleMapBuilder::new(params.clone(), 90.0);

        // Below the valid minimum never marks, regardless of angle
        for angle in (0..=180).step_by(5) {
            let sample = PolarSample {
                distance_cm: Some(params.valid_min_cm - 0.5),
                sweep_angle_deg: angle as f64,
            };
            assert_eq!(builder.add_sample(&sample), None);
        }

        // Beyond the detection threshold but still plausible
        let far = PolarSample {
            distance_cm: Some(params.detection_threshold_cm + 1.0),
            sweep_angle_deg: 90.0,
        };
        assert_eq!(builder.add_sample(&far), None);

        // No echo
        let none = PolarSample {
            distance_cm: None,
            sweep_angle_deg: 90.0,
        };
        assert_eq!(builder.add_sample(&none), None);

        assert_eq!(builder.num_hits(), 0);
        assert_eq!(builder.finish().num_blocked(), 0);
    }

    #[test]
    fn test_feathering() {
        let params = ObstacleMapParams::default();
        let mut builder = ObstacleMapBuilder::new(params, 90.0);

        let hit = builder.add_sample(&PolarSample {
            distance_cm: Some(50.0),
            sweep_angle_deg: 90.0,
        });
        assert_eq!(hit, Some(GridCell::new(5, 5)));

        let map = builder.map();
        assert_eq!(map.num_blocked(), 9);
        for row in 4..=6 {
            for col in 4..=6 {
                assert!(!map.is_free(&GridCell::new(row, col)));
            }
        }
        assert!(map.is_free(&GridCell::new(3, 5)));
        assert!(map.is_free(&GridCell::new(5, 7)));
    }

    #[test]
    fn test_paint_edges() {
        let mut builder = ObstacleMapBuilder::new(ObstacleMapParams::default(), 90.0);

        // Corner hit is clipped to the grid
        builder.paint(&GridCell::new(0, 0), 1);
        assert_eq!(builder.map().num_blocked(), 4);

        // Painting again never clears anything
        builder.paint(&GridCell::new(0, 0), 0);
        assert_eq!(builder.map().num_blocked(), 4);

        builder.paint(&GridCell::new(10, 10), 2);
        assert_eq!(builder.map().num_blocked(), 4 + 9);
    }

    #[test]
    fn test_outside_map() {
        let mut builder = ObstacleMapBuilder::new(ObstacleMapParams::default(), 90.0);

        // Row 10 is the last row, 100 cm straight ahead lands on it
        assert_eq!(
            builder.add_sample(&PolarSample {
                distance_cm: Some(100.0),
                sweep_angle_deg: 90.0
            }),
            Some(GridCell::new(10, 5))
        );

        // Behind the sensor
        let mut params = ObstacleMapParams::default();
        params.num_cols = 3;
        let mut builder = ObstacleMapBuilder::new(params, 90.0);
        assert_eq!(
            builder.add_sample(&PolarSample {
                distance_cm: Some(60.0),
                sweep_angle_deg: 0.0
            }),
            None
        );
    }
}
