//! Pipeline error types carrying year and stage context.

use dtw_core::observation::ObservationError;
use dtw_engine::EngineError;
use dtw_store::StoreError;
use std::fmt;
use thiserror::Error;

/// Which pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Surface,
    ZonalStats,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Surface => write!(f, "surface generation"),
            Stage::ZonalStats => write!(f, "zonal statistics"),
        }
    }
}

/// The underlying failure behind a [`PipelineError`].
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Observations(#[from] ObservationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fatal error in one year's stage, with enough context to reproduce.
#[derive(Debug, Error)]
#[error("{stage} failed for year {year}: {source}")]
pub struct PipelineError {
    pub year: i32,
    pub stage: Stage,
    #[source]
    pub source: StageFailure,
}

impl PipelineError {
    pub fn new(year: i32, stage: Stage, source: impl Into<StageFailure>) -> Self {
        Self {
            year,
            stage,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_names_year_and_stage() {
        let err = PipelineError::new(
            2020,
            Stage::Surface,
            StoreError::NotFound("DTW_BGS_2020".to_string()),
        );
        let msg = err.to_string();
        assert!(msg.contains("2020"), "Message should carry the year: {msg}");
        assert!(
            msg.contains("surface generation"),
            "Message should carry the stage: {msg}"
        );
        assert!(msg.contains("DTW_BGS_2020"), "Message should carry the operation context: {msg}");
    }
}
