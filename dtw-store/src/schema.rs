//! SQL schema for the workspace database.
//!
//! The base schema holds the dataset catalog and the payload tables for
//! point layers, rasters, zone layers, and joined feature layers. The
//! cumulative statistics tables are created on demand by
//! [`crate::Workspace::ensure_stats_table`] because the zonal stage owns
//! their lifecycle.

/// Returns the base workspace schema as a single batch string.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS datasets (
        name TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        crs TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS point_features (
        layer TEXT NOT NULL,
        x REAL NOT NULL,
        y REAL NOT NULL,
        depth_bgs REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_point_features_layer ON point_features(layer);

    CREATE TABLE IF NOT EXISTS rasters (
        name TEXT PRIMARY KEY,
        payload TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS zone_features (
        layer TEXT NOT NULL,
        pcl TEXT NOT NULL,
        geometry TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_zone_features_layer ON zone_features(layer);

    CREATE TABLE IF NOT EXISTS joined_features (
        layer TEXT NOT NULL,
        pcl TEXT NOT NULL,
        geometry TEXT NOT NULL,
        mean REAL,
        year INTEGER
    );
    CREATE INDEX IF NOT EXISTS idx_joined_features_layer ON joined_features(layer);

    "#
}
