//! Error types for workspace storage.

use rusqlite::ffi::ErrorCode;
use thiserror::Error;

/// Errors that can occur against the workspace store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another process holds an incompatible lock on the workspace.
    /// This is the one transient, retryable error class.
    #[error("schema lock on workspace while writing '{dataset}'")]
    SchemaLock { dataset: String },

    #[error("dataset '{0}' does not exist in the workspace")]
    NotFound(String),

    #[error("invalid dataset name '{0}'")]
    InvalidName(String),

    /// A record failed the fixed schema of a statistics table.
    #[error("record rejected by table '{table}': {reason}")]
    SchemaMismatch { table: String, reason: String },

    /// A `(zone, year)` pair already present in the cumulative table.
    #[error("duplicate statistic for zone '{pcl}' year {year}")]
    DuplicateRecord { pcl: String, year: i32 },

    #[error("payload for '{0}' is corrupt: {1}")]
    CorruptPayload(String, serde_json::Error),

    #[error("storage error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    /// True for the transient schema-lock class that the pipeline retries.
    pub fn is_schema_lock(&self) -> bool {
        matches!(self, StoreError::SchemaLock { .. })
    }

    /// Map a low-level SQLite error, turning busy/locked conditions into
    /// the schema-lock class for the named dataset.
    pub(crate) fn from_sqlite(dataset: &str, err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) {
                return StoreError::SchemaLock {
                    dataset: dataset.to_string(),
                };
            }
        }
        StoreError::Sql(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_maps_to_schema_lock() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        let err = StoreError::from_sqlite("DTWPoint", sqlite_err);
        assert!(err.is_schema_lock(), "SQLITE_BUSY should map to the schema-lock class");
    }

    #[test]
    fn other_sqlite_errors_pass_through() {
        let sqlite_err = rusqlite::Error::QueryReturnedNoRows;
        let err = StoreError::from_sqlite("DTWPoint", sqlite_err);
        assert!(!err.is_schema_lock());
    }
}
