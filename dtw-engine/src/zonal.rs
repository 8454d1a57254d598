//! Zonal aggregation: one scalar statistic per zone over a raster.

use crate::EngineError;
use dtw_core::params::ZonalStatistic;
use dtw_core::raster::RasterGrid;
use dtw_core::stats::ZonalValue;
use dtw_core::zone::ZoneFeature;

/// Computes one scalar statistic per zone from a raster surface.
pub trait ZonalAggregator {
    fn aggregate(
        &self,
        raster: &RasterGrid,
        zones: &[ZoneFeature],
        statistic: ZonalStatistic,
    ) -> Result<Vec<ZonalValue>, EngineError>;
}

/// Aggregates over raster cells whose centers fall inside the zone.
///
/// Cells without data are excluded from the statistic, never treated as
/// zero; zones whose footprint covers no data cells are omitted from the
/// result entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellCenterAggregator;

impl CellCenterAggregator {
    pub fn new() -> Self {
        Self
    }
}

impl ZonalAggregator for CellCenterAggregator {
    fn aggregate(
        &self,
        raster: &RasterGrid,
        zones: &[ZoneFeature],
        statistic: ZonalStatistic,
    ) -> Result<Vec<ZonalValue>, EngineError> {
        if raster.width == 0 || raster.height == 0 {
            return Err(EngineError::DegenerateExtent("empty raster".to_string()));
        }

        let mut results = Vec::new();
        for zone in zones {
            let Some((zmin_x, zmin_y, zmax_x, zmax_y)) = zone.bbox() else {
                log::warn!("zone '{}' has no geometry, skipping", zone.pcl);
                continue;
            };

            // Restrict the scan to the rows/cols whose centers can fall
            // inside the zone's bounding box.
            let mut count = 0usize;
            let mut sum = 0.0;
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for row in 0..raster.height {
                for col in 0..raster.width {
                    let (cx, cy) = raster.cell_center(row, col);
                    if cx < zmin_x || cx > zmax_x || cy < zmin_y || cy > zmax_y {
                        continue;
                    }
                    let v = raster.get(row, col);
                    if RasterGrid::is_nodata(v) {
                        continue;
                    }
                    if zone.contains(cx, cy) {
                        count += 1;
                        sum += v;
                        min = min.min(v);
                        max = max.max(v);
                    }
                }
            }

            if count == 0 {
                log::info!("zone '{}' covers no data cells, omitted", zone.pcl);
                continue;
            }
            let value = match statistic {
                ZonalStatistic::Mean => sum / count as f64,
                ZonalStatistic::Min => min,
                ZonalStatistic::Max => max,
                ZonalStatistic::Count => count as f64,
            };
            results.push(ZonalValue {
                pcl: zone.pcl.clone(),
                value,
            });
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtw_core::raster::NODATA;

    fn zone(pcl: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> ZoneFeature {
        ZoneFeature {
            pcl: pcl.to_string(),
            rings: vec![vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]],
        }
    }

    /// 4x4 grid over (0,0)-(40,40), cell size 10, values 1..=16 by row
    /// from the top.
    fn raster() -> RasterGrid {
        let mut grid = RasterGrid::new(4, 4, 0.0, 0.0, 10.0, 0.0);
        for row in 0..4 {
            for col in 0..4 {
                grid.set(row, col, (row * 4 + col) as f64 + 1.0);
            }
        }
        grid
    }

    #[test]
    fn mean_over_covered_cells() {
        let agg = CellCenterAggregator::new();
        // Lower-left quadrant: cell centers (5,5), (15,5), (5,15), (15,15)
        // hold values 13, 14, 9, 10.
        let zones = vec![zone("P1", 0.0, 0.0, 20.0, 20.0)];
        let values = agg
            .aggregate(&raster(), &zones, ZonalStatistic::Mean)
            .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].pcl, "P1");
        assert!((values[0].value - 11.5).abs() < 1e-12);
    }

    #[test]
    fn nodata_cells_are_excluded_not_zeroed() {
        let agg = CellCenterAggregator::new();
        let mut grid = raster();
        // Knock out three of the four quadrant cells.
        grid.set(3, 0, NODATA);
        grid.set(3, 1, NODATA);
        grid.set(2, 0, NODATA);
        let zones = vec![zone("P1", 0.0, 0.0, 20.0, 20.0)];
        let values = agg.aggregate(&grid, &zones, ZonalStatistic::Mean).unwrap();
        assert_eq!(
            values[0].value, 10.0,
            "Mean should cover only the one data cell, not average in zeros"
        );
    }

    #[test]
    fn zone_without_coverage_is_omitted() {
        let agg = CellCenterAggregator::new();
        let zones = vec![
            zone("inside", 0.0, 0.0, 20.0, 20.0),
            zone("outside", 100.0, 100.0, 120.0, 120.0),
        ];
        let values = agg
            .aggregate(&raster(), &zones, ZonalStatistic::Mean)
            .unwrap();
        assert_eq!(values.len(), 1, "Zones covering no data cells are omitted");
        assert_eq!(values[0].pcl, "inside");
    }

    #[test]
    fn min_max_count_statistics() {
        let agg = CellCenterAggregator::new();
        let zones = vec![zone("P1", 0.0, 0.0, 20.0, 20.0)];
        let grid = raster();

        let min = agg.aggregate(&grid, &zones, ZonalStatistic::Min).unwrap();
        assert_eq!(min[0].value, 9.0);
        let max = agg.aggregate(&grid, &zones, ZonalStatistic::Max).unwrap();
        assert_eq!(max[0].value, 14.0);
        let count = agg.aggregate(&grid, &zones, ZonalStatistic::Count).unwrap();
        assert_eq!(count[0].value, 4.0);
    }
}
