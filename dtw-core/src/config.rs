//! Pipeline configuration: loading, validation, and workspace path layout.
//!
//! The configuration file is YAML:
//!
//! ```yaml
//! base_path: /data/dtw
//! years: "2019-2021"
//! continue_on_error: false
//! kriging:
//!   cell_size: 100.0
//!   transformation_type: empirical
//!   max_local_points: 100
//!   overlap_factor: 1.0
//!   number_semivariograms: 100
//!   search_neighborhood: "NBRTYPE=StandardCircular;RADIUS=10000"
//!   output_type: prediction
//!   quantile_value: 0.5
//!   threshold_type: exceed
//!   probability_threshold: none
//!   semivariogram_model_type: power
//! zonal:
//!   zone_layer: vegetation_parcels
//!   statistic: mean
//! ```
//!
//! All enumerations and numeric bounds are validated at load time so the
//! stages can treat the parameter set as already-checked pass-through.

use crate::params::{KrigingParams, ParamError, ZonalStatistic};
use crate::years::{YearSpec, YearSpecError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the point layer rebuilt from each year's observation CSV.
pub const POINT_LAYER: &str = "DTWPoint";

/// Name of the cumulative per-zone statistics table.
pub const STATS_TABLE: &str = "parcel_dtw_stats";

/// Errors from loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Years(#[from] YearSpecError),
    #[error(transparent)]
    Params(#[from] ParamError),
}

/// Zonal-statistics stage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ZonalConfig {
    /// Name of the zone feature layer in the workspace.
    pub zone_layer: String,
    #[serde(default)]
    pub statistic: ZonalStatistic,
}

/// The validated pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Workspace root; all other paths are derived from it.
    pub base_path: PathBuf,
    /// Year specification: `"2019"`, `"2019-2021"`, or `"2019,2020,2022"`.
    pub years: String,
    pub kriging: KrigingParams,
    pub zonal: ZonalConfig,
    /// Whether a fatal error in one year aborts the run (false, default)
    /// or is recorded and the driver moves on to the next year (true).
    #[serde(default)]
    pub continue_on_error: bool,
}

impl PipelineConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.validate()?;
        log::info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Validate numeric bounds and expand-ability of the year spec.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.kriging.validate()?;
        YearSpec::parse(&self.years)?;
        Ok(())
    }

    /// The expanded, ascending list of processing years.
    pub fn year_list(&self) -> Result<Vec<i32>, ConfigError> {
        Ok(YearSpec::parse(&self.years)?.years().to_vec())
    }

    // ───────────────────── Path layout ─────────────────────

    /// Directory holding the per-year observation CSVs.
    pub fn data_dir(&self) -> PathBuf {
        self.base_path.join("data")
    }

    /// The workspace database file.
    pub fn workspace_path(&self) -> PathBuf {
        self.base_path.join("kriging.db")
    }

    /// Directory for archival raster exports.
    pub fn output_dir(&self) -> PathBuf {
        self.base_path.join("output")
    }

    /// Directory for per-year zonal statistics CSV exports.
    pub fn zonal_output_dir(&self) -> PathBuf {
        self.output_dir().join("zonal_stats")
    }

    /// The observation CSV for a year: `data/DTW<year>.csv`.
    pub fn observation_csv(&self, year: i32) -> PathBuf {
        self.data_dir().join(format!("DTW{year}.csv"))
    }

    /// The year-qualified raster name in the workspace.
    pub fn raster_name(year: i32) -> String {
        format!("DTW_BGS_{year}")
    }

    /// The archival ASCII grid path for a year.
    pub fn archive_raster_path(&self, year: i32) -> PathBuf {
        self.output_dir().join(format!("DTW_BGS_{year}.asc"))
    }

    /// The per-year statistics CSV export path.
    pub fn stats_csv_path(&self, year: i32) -> PathBuf {
        self.zonal_output_dir()
            .join(format!("parcel_dtw_stats_{year}.csv"))
    }

    /// The year-qualified joined zone-geometry-plus-statistics layer name.
    pub fn joined_layer_name(year: i32) -> String {
        format!("vegetation_parcels_{year}")
    }
}
