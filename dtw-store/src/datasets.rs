//! Point-layer, raster, and zone-layer operations on the workspace.

use crate::error::StoreError;
use crate::{DatasetKind, Workspace};
use dtw_core::observation::DepthObservation;
use dtw_core::raster::{RasterGrid, NODATA};
use dtw_core::zone::ZoneFeature;
use rusqlite::params;
use std::fmt::Write as _;
use std::path::Path;

impl Workspace {
    /// Build (or rebuild) a named point layer from observations.
    ///
    /// The layer is recreated, not appended: any prior rows under the
    /// name are dropped first. Busy/locked workspace conditions surface
    /// as [`StoreError::SchemaLock`] for the caller's retry policy.
    pub fn create_point_layer(
        &self,
        name: &str,
        observations: &[DepthObservation],
        crs: &str,
    ) -> Result<(), StoreError> {
        let map = |e| StoreError::from_sqlite(name, e);
        {
            let mut conn = self.conn.borrow_mut();
            let tx = conn.transaction().map_err(map)?;
            tx.execute("DELETE FROM point_features WHERE layer = ?1", params![name])
                .map_err(map)?;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO point_features (layer, x, y, depth_bgs)
                         VALUES (?1, ?2, ?3, ?4)",
                    )
                    .map_err(map)?;
                for obs in observations {
                    stmt.execute(params![name, obs.x, obs.y, obs.depth_bgs])
                        .map_err(map)?;
                }
            }
            tx.commit().map_err(map)?;
        }
        self.register_dataset(name, DatasetKind::PointLayer, Some(crs))?;
        log::info!("point layer '{}': {} features", name, observations.len());
        Ok(())
    }

    /// Read back a point layer's observations.
    pub fn point_layer(&self, name: &str) -> Result<Vec<DepthObservation>, StoreError> {
        if !self.exists(name)? {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT x, y, depth_bgs FROM point_features WHERE layer = ?1")?;
        let rows = stmt
            .query_map(params![name], |row| {
                Ok(DepthObservation {
                    x: row.get(0)?,
                    y: row.get(1)?,
                    depth_bgs: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Persist a raster surface under a year-qualified name, replacing
    /// any prior payload under that name.
    pub fn put_raster(&self, name: &str, grid: &RasterGrid, crs: &str) -> Result<(), StoreError> {
        let payload = serde_json::to_string(grid)
            .map_err(|e| StoreError::CorruptPayload(name.to_string(), e))?;
        {
            let conn = self.conn.borrow();
            conn.execute(
                "INSERT OR REPLACE INTO rasters (name, payload) VALUES (?1, ?2)",
                params![name, payload],
            )
            .map_err(|e| StoreError::from_sqlite(name, e))?;
        }
        self.register_dataset(name, DatasetKind::Raster, Some(crs))?;
        log::info!(
            "raster '{}': {}x{} cells at {}",
            name,
            grid.width,
            grid.height,
            grid.cell_size
        );
        Ok(())
    }

    /// Load a raster surface by name.
    pub fn raster(&self, name: &str) -> Result<RasterGrid, StoreError> {
        let conn = self.conn.borrow();
        let payload: String = conn
            .query_row(
                "SELECT payload FROM rasters WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    Err(StoreError::NotFound(name.to_string()))
                }
                e => Err(StoreError::Sql(e)),
            })?;
        serde_json::from_str(&payload)
            .map_err(|e| StoreError::CorruptPayload(name.to_string(), e))
    }

    /// Export a stored raster to an ESRI ASCII grid file.
    ///
    /// An existing file at the path is replaced; the caller is expected
    /// to have confirmed the overwrite.
    pub fn export_raster_ascii(&self, name: &str, path: &Path) -> Result<(), StoreError> {
        let grid = self.raster(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut out = String::new();
        // Header writes into a String cannot fail.
        let _ = writeln!(out, "ncols {}", grid.width);
        let _ = writeln!(out, "nrows {}", grid.height);
        let _ = writeln!(out, "xllcorner {}", grid.min_x);
        let _ = writeln!(out, "yllcorner {}", grid.min_y);
        let _ = writeln!(out, "cellsize {}", grid.cell_size);
        let _ = writeln!(out, "NODATA_value {}", NODATA);
        for row in 0..grid.height {
            let mut line = String::new();
            for col in 0..grid.width {
                if col > 0 {
                    line.push(' ');
                }
                let _ = write!(line, "{}", grid.get(row, col));
            }
            out.push_str(&line);
            out.push('\n');
        }
        std::fs::write(path, out)?;
        log::info!("exported raster '{}' to {}", name, path.display());
        Ok(())
    }

    /// Create (or replace) a named zone feature layer.
    pub fn create_zone_layer(&self, name: &str, zones: &[ZoneFeature]) -> Result<(), StoreError> {
        {
            let mut conn = self.conn.borrow_mut();
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM zone_features WHERE layer = ?1", params![name])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO zone_features (layer, pcl, geometry) VALUES (?1, ?2, ?3)",
                )?;
                for zone in zones {
                    let geometry = serde_json::to_string(&zone.rings)
                        .map_err(|e| StoreError::CorruptPayload(name.to_string(), e))?;
                    stmt.execute(params![name, zone.pcl, geometry])?;
                }
            }
            tx.commit()?;
        }
        self.register_dataset(name, DatasetKind::ZoneLayer, None)?;
        log::info!("zone layer '{}': {} zones", name, zones.len());
        Ok(())
    }

    /// Read back a zone feature layer.
    pub fn zone_layer(&self, name: &str) -> Result<Vec<ZoneFeature>, StoreError> {
        if !self.exists(name)? {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT pcl, geometry FROM zone_features WHERE layer = ?1 ORDER BY pcl")?;
        let rows = stmt
            .query_map(params![name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(pcl, geometry)| {
                let rings = serde_json::from_str(&geometry)
                    .map_err(|e| StoreError::CorruptPayload(name.to_string(), e))?;
                Ok(ZoneFeature { pcl, rings })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations() -> Vec<DepthObservation> {
        vec![
            DepthObservation { x: 350000.0, y: 4100000.0, depth_bgs: 12.5 },
            DepthObservation { x: 351000.0, y: 4100500.0, depth_bgs: 14.0 },
        ]
    }

    #[test]
    fn point_layer_round_trip() {
        let ws = Workspace::in_memory().unwrap();
        ws.create_point_layer("DTWPoint", &observations(), "EPSG:26911")
            .unwrap();
        let points = ws.point_layer("DTWPoint").unwrap();
        assert_eq!(points, observations());
        assert_eq!(
            ws.dataset_kind("DTWPoint").unwrap(),
            Some(DatasetKind::PointLayer)
        );
    }

    #[test]
    fn point_layer_is_recreated_not_appended() {
        let ws = Workspace::in_memory().unwrap();
        ws.create_point_layer("DTWPoint", &observations(), "EPSG:26911")
            .unwrap();
        ws.create_point_layer("DTWPoint", &observations()[..1], "EPSG:26911")
            .unwrap();
        let points = ws.point_layer("DTWPoint").unwrap();
        assert_eq!(points.len(), 1, "Rebuilding a point layer should replace its rows");
    }

    #[test]
    fn raster_round_trip_and_delete() {
        let ws = Workspace::in_memory().unwrap();
        let mut grid = RasterGrid::new(3, 2, 0.0, 0.0, 10.0, NODATA);
        grid.set(0, 0, 5.25);
        ws.put_raster("DTW_BGS_2020", &grid, "EPSG:26911").unwrap();
        assert_eq!(ws.raster("DTW_BGS_2020").unwrap(), grid);

        ws.delete("DTW_BGS_2020").unwrap();
        assert!(!ws.exists("DTW_BGS_2020").unwrap());
        assert!(matches!(
            ws.raster("DTW_BGS_2020"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn ascii_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::in_memory().unwrap();
        let mut grid = RasterGrid::new(2, 2, 100.0, 200.0, 50.0, NODATA);
        grid.set(0, 0, 1.5);
        grid.set(1, 1, 2.0);
        ws.put_raster("DTW_BGS_2020", &grid, "EPSG:26911").unwrap();

        let path = dir.path().join("DTW_BGS_2020.asc");
        ws.export_raster_ascii("DTW_BGS_2020", &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ncols 2");
        assert_eq!(lines[1], "nrows 2");
        assert_eq!(lines[2], "xllcorner 100");
        assert_eq!(lines[3], "yllcorner 200");
        assert_eq!(lines[4], "cellsize 50");
        assert_eq!(lines[5], "NODATA_value -9999");
        assert_eq!(lines[6], "1.5 -9999", "Row 0 is the top row");
        assert_eq!(lines[7], "-9999 2");
    }

    #[test]
    fn zone_layer_round_trip() {
        let ws = Workspace::in_memory().unwrap();
        let zones = vec![ZoneFeature {
            pcl: "012-345-67".to_string(),
            rings: vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]],
        }];
        ws.create_zone_layer("vegetation_parcels", &zones).unwrap();
        assert_eq!(ws.zone_layer("vegetation_parcels").unwrap(), zones);

        let fields = ws.list_fields("vegetation_parcels").unwrap();
        assert!(
            fields.iter().any(|f| f.name == "PCL"),
            "Zone layers should expose the PCL field"
        );
    }
}
