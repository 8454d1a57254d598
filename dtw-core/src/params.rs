//! Interpolation parameter set and its closed enumerations.
//!
//! These parameters are validated at configuration-load time and passed
//! through to the interpolation engine as opaque values, except for the
//! probability threshold, which is normalized here: a textual "none"
//! (case-insensitive), an empty string, or an absent value all map to the
//! engine's disabled sentinel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from validating interpolation parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("cell_size must be positive, got {0}")]
    NonPositiveCellSize(f64),
    #[error("max_local_points must be at least 1")]
    NoLocalPoints,
    #[error("quantile_value must be in (0, 1), got {0}")]
    QuantileOutOfRange(f64),
    #[error("invalid probability threshold '{0}'")]
    InvalidProbabilityThreshold(String),
}

/// Value transformation applied before model fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationType {
    None,
    Empirical,
    LogEmpirical,
}

/// What the output raster represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Prediction,
    PredictionStandardError,
    Probability,
    Quantile,
}

/// Direction of a probability threshold test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdType {
    Exceed,
    NotExceed,
}

/// Semivariogram model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemivariogramModel {
    Power,
    Linear,
    ThinPlateSpline,
    Exponential,
    Whittle,
    KBessel,
}

/// A probability threshold that is either disabled or a numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbabilityThreshold {
    Disabled,
    Value(f64),
}

impl ProbabilityThreshold {
    /// Normalize a raw configuration value.
    ///
    /// `None`, an empty string, and a case-insensitive `"none"` all mean
    /// disabled; any other text must parse as a number.
    pub fn normalize(raw: Option<&str>) -> Result<Self, ParamError> {
        match raw {
            None => Ok(Self::Disabled),
            Some(s) => {
                let s = s.trim();
                if s.is_empty() || s.eq_ignore_ascii_case("none") {
                    Ok(Self::Disabled)
                } else {
                    s.parse::<f64>()
                        .map(Self::Value)
                        .map_err(|_| ParamError::InvalidProbabilityThreshold(s.to_string()))
                }
            }
        }
    }
}

/// The interpolation parameter set supplied by configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrigingParams {
    pub cell_size: f64,
    pub transformation_type: TransformationType,
    pub max_local_points: u32,
    pub overlap_factor: f64,
    pub number_semivariograms: u32,
    /// Engine search-neighborhood descriptor; semicolons are accepted as
    /// separators and normalized to spaces before the engine call.
    pub search_neighborhood: String,
    pub output_type: OutputType,
    pub quantile_value: f64,
    pub threshold_type: ThresholdType,
    #[serde(default)]
    pub probability_threshold: Option<String>,
    pub semivariogram_model_type: SemivariogramModel,
}

impl KrigingParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.cell_size <= 0.0 {
            return Err(ParamError::NonPositiveCellSize(self.cell_size));
        }
        if self.max_local_points < 1 {
            return Err(ParamError::NoLocalPoints);
        }
        if !(self.quantile_value > 0.0 && self.quantile_value < 1.0) {
            return Err(ParamError::QuantileOutOfRange(self.quantile_value));
        }
        self.probability_threshold()?;
        Ok(())
    }

    /// The normalized probability threshold.
    pub fn probability_threshold(&self) -> Result<ProbabilityThreshold, ParamError> {
        ProbabilityThreshold::normalize(self.probability_threshold.as_deref())
    }

    /// Search-neighborhood descriptor with semicolon separators replaced
    /// by spaces, the form the engine expects.
    pub fn search_neighborhood_normalized(&self) -> String {
        self.search_neighborhood.replace(';', " ")
    }
}

/// The scalar statistic computed per zone. A closed choice; the pipeline
/// default is the mean over covered cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZonalStatistic {
    #[default]
    Mean,
    Min,
    Max,
    Count,
}
