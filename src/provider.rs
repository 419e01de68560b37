//! Cost-matrix acquisition boundary.
//!
//! The solver only needs a square integer matrix. Providers turn an ordered
//! list of coordinates into one; [`sanitize_matrix`] normalises raw floating
//! point tables coming back from routing services.

use crate::error::{Error, Result};
use crate::problem::{Coordinate, CostMatrix, UNREACHABLE};
use serde::{Deserialize, Serialize};

/// What the matrix measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Metres
    Distance,
    /// Seconds
    Duration,
}

/// Supplies the travel-cost matrix for an ordered list of coordinates.
pub trait CostMatrixProvider {
    /// Return an `n x n` matrix for `n` coordinates, unreachable pairs set to
    /// [`UNREACHABLE`].
    fn get_matrix(&self, coordinates: &[Coordinate], metric: Metric) -> Result<CostMatrix>;
}

/// Round a raw table into integer costs.
///
/// Missing, negative and non-finite entries become [`UNREACHABLE`], as do values
/// that would exceed it. The diagonal is always zero.
pub fn sanitize_matrix(raw: &[Vec<Option<f64>>], expected: usize) -> Result<CostMatrix> {
    if raw.len() != expected || raw.iter().any(|row| row.len() != expected) {
        return Err(Error::Provider(format!(
            "expected a {0}x{0} matrix, got {1} rows",
            expected,
            raw.len()
        )));
    }

    Ok(CostMatrix::from_fn(expected, |i, j| {
        if i == j {
            return 0;
        }
        match raw[i][j] {
            Some(value) if value.is_finite() && value >= 0.0 => {
                let rounded = value.round();
                if rounded >= UNREACHABLE as f64 {
                    UNREACHABLE
                } else {
                    rounded as i64
                }
            }
            _ => UNREACHABLE,
        }
    }))
}

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in metres.
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Offline provider using great-circle distances.
///
/// Durations assume a constant travel speed.
#[derive(Debug, Clone, Copy)]
pub struct HaversineProvider {
    /// Travel speed in metres per second
    pub speed_mps: f64,
}

impl Default for HaversineProvider {
    fn default() -> Self {
        // 30 km/h, a rough urban average
        HaversineProvider {
            speed_mps: 30.0 / 3.6,
        }
    }
}

impl CostMatrixProvider for HaversineProvider {
    fn get_matrix(&self, coordinates: &[Coordinate], metric: Metric) -> Result<CostMatrix> {
        if metric == Metric::Duration && !(self.speed_mps > 0.0) {
            return Err(Error::Provider(format!(
                "travel speed must be positive, got {}",
                self.speed_mps
            )));
        }

        let raw: Vec<Vec<Option<f64>>> = coordinates
            .iter()
            .map(|&from| {
                coordinates
                    .iter()
                    .map(|&to| {
                        let meters = haversine_meters(from, to);
                        Some(match metric {
                            Metric::Distance => meters,
                            Metric::Duration => meters / self.speed_mps,
                        })
                    })
                    .collect()
            })
            .collect();

        sanitize_matrix(&raw, coordinates.len())
    }
}

/// Provider returning a fixed matrix, e.g. one loaded from disk.
#[derive(Debug, Clone)]
pub struct StaticMatrixProvider {
    pub matrix: CostMatrix,
}

impl CostMatrixProvider for StaticMatrixProvider {
    fn get_matrix(&self, coordinates: &[Coordinate], _metric: Metric) -> Result<CostMatrix> {
        if self.matrix.size() != coordinates.len() {
            return Err(Error::Provider(format!(
                "matrix is {0}x{0} but {1} coordinates were requested",
                self.matrix.size(),
                coordinates.len()
            )));
        }
        Ok(self.matrix.clone())
    }
}
