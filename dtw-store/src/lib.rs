//! File-backed spatial workspace for the DTW kriging toolkit.
//!
//! The workspace is a single SQLite database holding every named dataset
//! a pipeline run touches: the per-year point layer, interpolated raster
//! surfaces, the zone (parcel) feature layer, the cumulative zonal
//! statistics table, and the per-year joined feature layers. Datasets are
//! keyed by name in a catalog table, mirroring how a file geodatabase
//! addresses its contents.
//!
//! Concurrency: the workspace file may be opened by other processes.
//! SQLite busy/locked conditions surface as
//! [`StoreError::SchemaLock`](error::StoreError), the one transient error
//! class the pipeline retries.

pub mod error;
pub mod schema;
mod datasets;
mod stats;

pub use error::StoreError;

use chrono::Utc;
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Kinds of named datasets the catalog tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    PointLayer,
    Raster,
    ZoneLayer,
    Table,
    FeatureLayer,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::PointLayer => "point_layer",
            DatasetKind::Raster => "raster",
            DatasetKind::ZoneLayer => "zone_layer",
            DatasetKind::Table => "table",
            DatasetKind::FeatureLayer => "feature_layer",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "point_layer" => Some(DatasetKind::PointLayer),
            "raster" => Some(DatasetKind::Raster),
            "zone_layer" => Some(DatasetKind::ZoneLayer),
            "table" => Some(DatasetKind::Table),
            "feature_layer" => Some(DatasetKind::FeatureLayer),
            _ => None,
        }
    }
}

/// A field (name, type) pair describing one attribute of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: String,
}

/// The spatial workspace: a catalog of named datasets over one SQLite file.
///
/// Cheaply cloneable (via `Rc`); the pipeline is single-threaded.
#[derive(Clone)]
pub struct Workspace {
    pub(crate) conn: Rc<RefCell<Connection>>,
}

impl Workspace {
    /// Open (idempotently creating) the workspace at the given path.
    ///
    /// The parent directory is created if missing and the base schema is
    /// applied with `IF NOT EXISTS`, so repeated opens are no-ops.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let existed = path.exists();
        let conn = Connection::open(path)
            .map_err(|e| StoreError::from_sqlite(&path.display().to_string(), e))?;
        conn.execute_batch(schema::create_schema())
            .map_err(|e| StoreError::from_sqlite(&path.display().to_string(), e))?;
        if !existed {
            log::info!("created workspace at {}", path.display());
        }
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }

    /// Open an in-memory workspace. Used by tests and dry runs.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }

    /// Whether a named dataset exists in the catalog.
    pub fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.conn.borrow();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM datasets WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// The catalog kind of a dataset, if present.
    pub fn dataset_kind(&self, name: &str) -> Result<Option<DatasetKind>, StoreError> {
        let conn = self.conn.borrow();
        let kind: Option<String> = conn
            .query_row(
                "SELECT kind FROM datasets WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                e => Err(e),
            })?;
        Ok(kind.as_deref().and_then(DatasetKind::from_str))
    }

    /// Delete a named dataset and its payload rows. Deleting a dataset
    /// that does not exist is a no-op.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let Some(kind) = self.dataset_kind(name)? else {
            return Ok(());
        };
        let conn = self.conn.borrow();
        match kind {
            DatasetKind::PointLayer => {
                conn.execute("DELETE FROM point_features WHERE layer = ?1", params![name])?;
            }
            DatasetKind::Raster => {
                conn.execute("DELETE FROM rasters WHERE name = ?1", params![name])?;
            }
            DatasetKind::ZoneLayer => {
                conn.execute("DELETE FROM zone_features WHERE layer = ?1", params![name])?;
            }
            DatasetKind::FeatureLayer => {
                conn.execute("DELETE FROM joined_features WHERE layer = ?1", params![name])?;
            }
            DatasetKind::Table => {
                validate_identifier(name)?;
                conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{name}\""))?;
            }
        }
        conn.execute("DELETE FROM datasets WHERE name = ?1", params![name])?;
        log::info!("deleted dataset '{}'", name);
        Ok(())
    }

    /// List the attribute fields a dataset exposes.
    ///
    /// Zone and joined feature layers expose their zone-identifier and
    /// statistic fields; point layers expose the observation fields;
    /// tables expose their SQL columns.
    pub fn list_fields(&self, name: &str) -> Result<Vec<FieldDef>, StoreError> {
        let kind = self
            .dataset_kind(name)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let fields = match kind {
            DatasetKind::PointLayer => vec![
                field("X", "DOUBLE"),
                field("Y", "DOUBLE"),
                field("DTW_BGS", "DOUBLE"),
            ],
            DatasetKind::Raster => vec![field("VALUE", "DOUBLE")],
            DatasetKind::ZoneLayer => vec![
                field(dtw_core::zone::ZONE_ID_FIELD, "TEXT"),
                field("SHAPE", "POLYGON"),
            ],
            DatasetKind::FeatureLayer => vec![
                field(dtw_core::zone::ZONE_ID_FIELD, "TEXT"),
                field("SHAPE", "POLYGON"),
                field("MEAN", "DOUBLE"),
                field("YEAR", "LONG"),
            ],
            DatasetKind::Table => {
                validate_identifier(name)?;
                let conn = self.conn.borrow();
                let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{name}\")"))?;
                let fields = stmt
                    .query_map([], |row| {
                        Ok(FieldDef {
                            name: row.get::<_, String>(1)?,
                            field_type: row.get::<_, String>(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                fields
            }
        };
        Ok(fields)
    }

    /// Register (or refresh) a dataset in the catalog.
    pub(crate) fn register_dataset(
        &self,
        name: &str,
        kind: DatasetKind,
        crs: Option<&str>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.borrow();
        conn.execute(
            "INSERT OR REPLACE INTO datasets (name, kind, crs, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, kind.as_str(), crs, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

fn field(name: &str, field_type: &str) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        field_type: field_type.to_string(),
    }
}

/// Dataset names that become SQL identifiers must stay inside a safe
/// alphabet; everything the pipeline generates does.
pub(crate) fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
