//! Cumulative zonal-statistics table maintenance, CSV export, and the
//! join back onto zone geometry.
//!
//! The cumulative table is the one long-lived shared mutable resource
//! across pipeline runs. Its mutation discipline is: check existence,
//! delete the year slice if confirmed, then append — never update in
//! place. Appends are atomic and schema-checked; a duplicate
//! `(zone, year)` pair is a hard error, not a silent skip.

use crate::error::StoreError;
use crate::{validate_identifier, DatasetKind, Workspace};
use dtw_core::stats::ZonalRecord;
use rusqlite::ffi::ErrorCode;
use rusqlite::params;
use std::path::Path;

/// One row of a joined zone-geometry-plus-statistics layer.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedZone {
    pub pcl: String,
    pub mean: Option<f64>,
    pub year: Option<i32>,
}

impl Workspace {
    /// Create the cumulative statistics table if missing and make sure
    /// its required fields are present.
    pub fn ensure_stats_table(&self, table: &str) -> Result<(), StoreError> {
        validate_identifier(table)?;
        {
            let conn = self.conn.borrow();
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS \"{table}\" (
                     pcl TEXT NOT NULL,
                     mean REAL NOT NULL,
                     year INTEGER NOT NULL,
                     PRIMARY KEY (pcl, year)
                 )"
            ))?;
        }
        self.ensure_fields(table, &[("pcl", "TEXT"), ("mean", "REAL"), ("year", "INTEGER")])?;
        self.register_dataset(table, DatasetKind::Table, None)?;
        Ok(())
    }

    /// Add any missing fields to a table.
    fn ensure_fields(&self, table: &str, fields: &[(&str, &str)]) -> Result<(), StoreError> {
        validate_identifier(table)?;
        let conn = self.conn.borrow();
        let existing: Vec<String> = {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(1))?
                .collect::<Result<Vec<_>, _>>()?;
            names
        };
        for (name, field_type) in fields {
            if !existing.iter().any(|f| f.eq_ignore_ascii_case(name)) {
                conn.execute_batch(&format!(
                    "ALTER TABLE \"{table}\" ADD COLUMN {name} {field_type}"
                ))?;
                log::info!("added field {} of type {} to {}", name, field_type, table);
            }
        }
        Ok(())
    }

    /// Whether any record for the year exists in the cumulative table.
    /// A missing table counts as "no prior result".
    pub fn stats_year_exists(&self, table: &str, year: i32) -> Result<bool, StoreError> {
        validate_identifier(table)?;
        if !self.exists(table)? {
            return Ok(false);
        }
        let conn = self.conn.borrow();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{table}\" WHERE year = ?1"),
            params![year],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Delete the cumulative table's slice for one year.
    pub fn delete_stats_year(&self, table: &str, year: i32) -> Result<usize, StoreError> {
        validate_identifier(table)?;
        if !self.exists(table)? {
            return Ok(0);
        }
        let conn = self.conn.borrow();
        let deleted = conn.execute(
            &format!("DELETE FROM \"{table}\" WHERE year = ?1"),
            params![year],
        )?;
        if deleted > 0 {
            log::info!("deleted {} prior rows for year {} from {}", deleted, year, table);
        }
        Ok(deleted)
    }

    /// Append records to the cumulative table, atomically.
    ///
    /// Every record is schema-checked first (non-empty zone id, finite
    /// statistic); a duplicate `(pcl, year)` pair aborts the whole append.
    pub fn append_stats(&self, table: &str, records: &[ZonalRecord]) -> Result<(), StoreError> {
        validate_identifier(table)?;
        for record in records {
            if record.pcl.trim().is_empty() {
                return Err(StoreError::SchemaMismatch {
                    table: table.to_string(),
                    reason: "empty zone id".to_string(),
                });
            }
            if !record.mean.is_finite() {
                return Err(StoreError::SchemaMismatch {
                    table: table.to_string(),
                    reason: format!("non-finite statistic for zone '{}'", record.pcl),
                });
            }
        }

        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO \"{table}\" (pcl, mean, year) VALUES (?1, ?2, ?3)"
            ))?;
            for record in records {
                stmt.execute(params![record.pcl, record.mean, record.year])
                    .map_err(|e| match &e {
                        rusqlite::Error::SqliteFailure(f, _)
                            if f.code == ErrorCode::ConstraintViolation =>
                        {
                            StoreError::DuplicateRecord {
                                pcl: record.pcl.clone(),
                                year: record.year,
                            }
                        }
                        _ => StoreError::Sql(e),
                    })?;
            }
        }
        tx.commit()?;
        log::info!("appended {} records to {}", records.len(), table);
        Ok(())
    }

    /// The cumulative table's records for one year, ordered by zone id.
    pub fn stats_for_year(&self, table: &str, year: i32) -> Result<Vec<ZonalRecord>, StoreError> {
        validate_identifier(table)?;
        if !self.exists(table)? {
            return Err(StoreError::NotFound(table.to_string()));
        }
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!(
            "SELECT pcl, mean, year FROM \"{table}\" WHERE year = ?1 ORDER BY pcl"
        ))?;
        let rows = stmt
            .query_map(params![year], |row| {
                Ok(ZonalRecord {
                    pcl: row.get(0)?,
                    mean: row.get(1)?,
                    year: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Export one year's slice of the cumulative table to CSV with
    /// columns `PCL,MEAN,YEAR`. Replaces any existing file at the path.
    pub fn export_stats_csv(
        &self,
        table: &str,
        year: i32,
        path: &Path,
    ) -> Result<usize, StoreError> {
        let records = self.stats_for_year(table, year)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["PCL", "MEAN", "YEAR"])?;
        for record in &records {
            wtr.write_record([
                record.pcl.as_str(),
                &record.mean.to_string(),
                &record.year.to_string(),
            ])?;
        }
        wtr.flush().map_err(StoreError::Io)?;
        log::info!(
            "exported {} records for year {} to {}",
            records.len(),
            year,
            path.display()
        );
        Ok(records.len())
    }

    /// Join the cumulative table's year slice onto a zone layer and
    /// persist the result as a named feature layer.
    ///
    /// Zones without a statistic row keep their geometry and carry no
    /// joined values. Returns the number of zones written.
    pub fn write_joined_layer(
        &self,
        zone_layer: &str,
        stats_table: &str,
        year: i32,
        out_name: &str,
    ) -> Result<usize, StoreError> {
        validate_identifier(stats_table)?;
        if !self.exists(zone_layer)? {
            return Err(StoreError::NotFound(zone_layer.to_string()));
        }
        if !self.exists(stats_table)? {
            return Err(StoreError::NotFound(stats_table.to_string()));
        }

        let written = {
            let mut conn = self.conn.borrow_mut();
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM joined_features WHERE layer = ?1",
                params![out_name],
            )?;
            let written = tx.execute(
                &format!(
                    "INSERT INTO joined_features (layer, pcl, geometry, mean, year)
                     SELECT ?1, z.pcl, z.geometry, s.mean, s.year
                     FROM zone_features z
                     LEFT JOIN \"{stats_table}\" s
                       ON s.pcl = z.pcl AND s.year = ?2
                     WHERE z.layer = ?3"
                ),
                params![out_name, year, zone_layer],
            )?;
            tx.commit()?;
            written
        };
        self.register_dataset(out_name, DatasetKind::FeatureLayer, None)?;
        log::info!(
            "joined layer '{}': {} zones (year {})",
            out_name,
            written,
            year
        );
        Ok(written)
    }

    /// Read back a joined feature layer, ordered by zone id.
    pub fn joined_layer(&self, name: &str) -> Result<Vec<JoinedZone>, StoreError> {
        if !self.exists(name)? {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT pcl, mean, year FROM joined_features WHERE layer = ?1 ORDER BY pcl",
        )?;
        let rows = stmt
            .query_map(params![name], |row| {
                Ok(JoinedZone {
                    pcl: row.get(0)?,
                    mean: row.get(1)?,
                    year: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtw_core::zone::ZoneFeature;

    const TABLE: &str = "parcel_dtw_stats";

    fn records(year: i32) -> Vec<ZonalRecord> {
        vec![
            ZonalRecord { pcl: "012-345-67".to_string(), mean: 13.25, year },
            ZonalRecord { pcl: "890-123-45".to_string(), mean: 8.5, year },
        ]
    }

    #[test]
    fn append_and_read_back() {
        let ws = Workspace::in_memory().unwrap();
        ws.ensure_stats_table(TABLE).unwrap();
        ws.append_stats(TABLE, &records(2020)).unwrap();

        let rows = ws.stats_for_year(TABLE, 2020).unwrap();
        assert_eq!(rows, records(2020), "Rows should come back ordered by zone id");
        assert!(ws.stats_year_exists(TABLE, 2020).unwrap());
        assert!(!ws.stats_year_exists(TABLE, 2021).unwrap());
    }

    #[test]
    fn duplicate_append_is_rejected() {
        let ws = Workspace::in_memory().unwrap();
        ws.ensure_stats_table(TABLE).unwrap();
        ws.append_stats(TABLE, &records(2020)).unwrap();

        let err = ws.append_stats(TABLE, &records(2020)).unwrap_err();
        assert!(
            matches!(err, StoreError::DuplicateRecord { year: 2020, .. }),
            "Appending the same (zone, year) twice must be a hard error, got {err:?}"
        );
        assert_eq!(
            ws.stats_for_year(TABLE, 2020).unwrap().len(),
            2,
            "A rejected append must not leave partial rows"
        );
    }

    #[test]
    fn delete_then_append_leaves_one_row_per_zone() {
        let ws = Workspace::in_memory().unwrap();
        ws.ensure_stats_table(TABLE).unwrap();
        ws.append_stats(TABLE, &records(2020)).unwrap();

        ws.delete_stats_year(TABLE, 2020).unwrap();
        let mut updated = records(2020);
        updated[0].mean = 99.0;
        ws.append_stats(TABLE, &updated).unwrap();

        let rows = ws.stats_for_year(TABLE, 2020).unwrap();
        assert_eq!(rows.len(), 2, "Exactly one row per (zone, year) after replace");
        assert_eq!(rows[0].mean, 99.0);
    }

    #[test]
    fn other_years_survive_a_slice_delete() {
        let ws = Workspace::in_memory().unwrap();
        ws.ensure_stats_table(TABLE).unwrap();
        ws.append_stats(TABLE, &records(2019)).unwrap();
        ws.append_stats(TABLE, &records(2020)).unwrap();

        ws.delete_stats_year(TABLE, 2020).unwrap();
        assert!(ws.stats_year_exists(TABLE, 2019).unwrap());
        assert!(!ws.stats_year_exists(TABLE, 2020).unwrap());
    }

    #[test]
    fn schema_mismatch_is_a_hard_error() {
        let ws = Workspace::in_memory().unwrap();
        ws.ensure_stats_table(TABLE).unwrap();

        let bad = vec![ZonalRecord { pcl: "  ".to_string(), mean: 1.0, year: 2020 }];
        assert!(matches!(
            ws.append_stats(TABLE, &bad),
            Err(StoreError::SchemaMismatch { .. })
        ));

        let bad = vec![ZonalRecord { pcl: "P1".to_string(), mean: f64::NAN, year: 2020 }];
        assert!(matches!(
            ws.append_stats(TABLE, &bad),
            Err(StoreError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn csv_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::in_memory().unwrap();
        ws.ensure_stats_table(TABLE).unwrap();
        ws.append_stats(TABLE, &records(2020)).unwrap();

        let path = dir.path().join("parcel_dtw_stats_2020.csv");
        let written = ws.export_stats_csv(TABLE, 2020, &path).unwrap();
        assert_eq!(written, 2);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            rdr.headers().unwrap(),
            &csv::StringRecord::from(vec!["PCL", "MEAN", "YEAR"])
        );
        let rows: Vec<ZonalRecord> = rdr
            .records()
            .map(|r| {
                let r = r.unwrap();
                ZonalRecord {
                    pcl: r.get(0).unwrap().to_string(),
                    mean: r.get(1).unwrap().parse().unwrap(),
                    year: r.get(2).unwrap().parse().unwrap(),
                }
            })
            .collect();
        let table_rows = ws.stats_for_year(TABLE, 2020).unwrap();
        assert_eq!(rows.len(), table_rows.len());
        for (csv_row, table_row) in rows.iter().zip(&table_rows) {
            assert_eq!(csv_row.pcl, table_row.pcl);
            assert_eq!(csv_row.year, table_row.year);
            assert!(
                (csv_row.mean - table_row.mean).abs() < 1e-9,
                "CSV statistic should match the table within float tolerance"
            );
        }
    }

    #[test]
    fn join_back_carries_statistics_onto_zones() {
        let ws = Workspace::in_memory().unwrap();
        let zones = vec![
            ZoneFeature {
                pcl: "012-345-67".to_string(),
                rings: vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]],
            },
            ZoneFeature {
                pcl: "no-stats".to_string(),
                rings: vec![vec![(20.0, 0.0), (30.0, 0.0), (30.0, 10.0), (20.0, 10.0)]],
            },
        ];
        ws.create_zone_layer("vegetation_parcels", &zones).unwrap();
        ws.ensure_stats_table(TABLE).unwrap();
        ws.append_stats(TABLE, &records(2020)).unwrap();

        let written = ws
            .write_joined_layer("vegetation_parcels", TABLE, 2020, "vegetation_parcels_2020")
            .unwrap();
        assert_eq!(written, 2, "Every zone should appear in the joined layer");

        let joined = ws.joined_layer("vegetation_parcels_2020").unwrap();
        assert_eq!(joined[0].pcl, "012-345-67");
        assert_eq!(joined[0].mean, Some(13.25));
        assert_eq!(joined[0].year, Some(2020));
        assert_eq!(joined[1].pcl, "no-stats");
        assert_eq!(joined[1].mean, None, "Zones without statistics carry no joined value");
    }
}
