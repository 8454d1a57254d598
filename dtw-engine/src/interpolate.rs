//! Surface interpolation from point observations.
//!
//! The geostatistical mathematics (empirical Bayesian kriging,
//! semivariogram fitting) is an external capability behind the
//! [`SurfaceInterpolator`] trait. The bundled [`IdwInterpolator`] is a
//! deterministic inverse-distance-weighted reference engine: it honors
//! the cell size and the local-point budget from the parameter set and
//! passes the remaining kriging parameters through untouched.

use crate::EngineError;
use dtw_core::observation::DepthObservation;
use dtw_core::params::KrigingParams;
use dtw_core::raster::RasterGrid;

/// Produces a raster surface from point observations.
pub trait SurfaceInterpolator {
    fn interpolate(
        &self,
        points: &[DepthObservation],
        params: &KrigingParams,
        output_crs: &str,
    ) -> Result<RasterGrid, EngineError>;
}

/// Inverse-distance-weighted interpolation over the observation extent.
#[derive(Debug, Clone, Copy)]
pub struct IdwInterpolator {
    /// IDW distance exponent.
    pub power: f64,
}

impl IdwInterpolator {
    pub fn new() -> Self {
        Self { power: 2.0 }
    }
}

impl Default for IdwInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceInterpolator for IdwInterpolator {
    fn interpolate(
        &self,
        points: &[DepthObservation],
        params: &KrigingParams,
        output_crs: &str,
    ) -> Result<RasterGrid, EngineError> {
        if points.is_empty() {
            return Err(EngineError::EmptyPointSet);
        }
        let power = self.power;
        let cell = params.cell_size;

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return Err(EngineError::DegenerateExtent(
                "non-finite observation coordinates".to_string(),
            ));
        }

        // Pad the extent by half a cell so every observation falls inside
        // a cell rather than on the boundary.
        let min_x = min_x - cell / 2.0;
        let min_y = min_y - cell / 2.0;
        let width = (((max_x + cell / 2.0) - min_x) / cell).ceil().max(1.0) as usize;
        let height = (((max_y + cell / 2.0) - min_y) / cell).ceil().max(1.0) as usize;

        let k = (params.max_local_points as usize).max(1).min(points.len());
        let mut grid = RasterGrid::new(width, height, min_x, min_y, cell, 0.0);

        log::debug!(
            "idw: {} points -> {}x{} cells at {} ({} neighbors, crs {})",
            points.len(),
            width,
            height,
            cell,
            k,
            &output_crs[..output_crs.len().min(32)]
        );

        let mut distances: Vec<(f64, f64)> = Vec::with_capacity(points.len());
        for row in 0..height {
            for col in 0..width {
                let (cx, cy) = grid.cell_center(row, col);

                distances.clear();
                for p in points {
                    let d2 = (p.x - cx).powi(2) + (p.y - cy).powi(2);
                    distances.push((d2, p.depth_bgs));
                }
                distances.sort_by(|a, b| a.0.total_cmp(&b.0));

                // An observation on the cell center wins outright.
                let value = if distances[0].0 == 0.0 {
                    distances[0].1
                } else {
                    let mut weight_sum = 0.0;
                    let mut value_sum = 0.0;
                    for &(d2, v) in distances.iter().take(k) {
                        let w = 1.0 / d2.powf(power / 2.0);
                        weight_sum += w;
                        value_sum += w * v;
                    }
                    value_sum / weight_sum
                };
                grid.set(row, col, value);
            }
        }
        Ok(grid)
    }
}
