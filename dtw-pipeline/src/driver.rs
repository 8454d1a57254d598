//! Pipeline Driver: expands the configured year set and runs the stages
//! per year in ascending order.
//!
//! Per-year isolation is a policy choice made explicit in configuration:
//! with `continue_on_error` unset (the default) the first fatal error
//! aborts the run; when set, the error is logged, recorded in the
//! summary, and the driver moves on to the next year. Failures are never
//! silently swallowed.

use crate::confirm::OverwriteDecision;
use crate::error::PipelineError;
use crate::surface::{generate_surface, SurfaceOutcome};
use crate::zonal::{aggregate_zone_statistics, ZonalOutcome};
use dtw_core::config::{ConfigError, PipelineConfig};
use dtw_engine::{SurfaceInterpolator, ZonalAggregator};
use dtw_store::Workspace;
use log::{error, info};
use thiserror::Error;

/// Errors from a whole pipeline run.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Stage(#[from] PipelineError),
    #[error("all {failed} of {requested} requested years failed")]
    AllYearsFailed { requested: usize, failed: usize },
}

/// What happened across a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// Years whose stages completed (including logged skips).
    pub processed: Vec<i32>,
    /// Years that failed, with the error text, when `continue_on_error`
    /// let the run carry on past them.
    pub failed: Vec<(i32, String)>,
}

/// Runs the two pipeline stages over the configured year sequence.
pub struct PipelineRunner<'a> {
    config: &'a PipelineConfig,
    workspace: &'a Workspace,
    interpolator: &'a dyn SurfaceInterpolator,
    aggregator: &'a dyn ZonalAggregator,
    decision: &'a dyn OverwriteDecision,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        workspace: &'a Workspace,
        interpolator: &'a dyn SurfaceInterpolator,
        aggregator: &'a dyn ZonalAggregator,
        decision: &'a dyn OverwriteDecision,
    ) -> Self {
        Self {
            config,
            workspace,
            interpolator,
            aggregator,
            decision,
        }
    }

    /// Run both stages for every configured year.
    pub fn run(&self) -> Result<RunSummary, DriverError> {
        self.run_years(|year| {
            self.surface_year(year)?;
            self.zonal_year(year)?;
            Ok(())
        })
    }

    /// Run only the surface-generation stage.
    pub fn run_surface(&self) -> Result<RunSummary, DriverError> {
        self.run_years(|year| self.surface_year(year).map(|_| ()))
    }

    /// Run only the zonal-statistics stage.
    pub fn run_zonal(&self) -> Result<RunSummary, DriverError> {
        self.run_years(|year| self.zonal_year(year).map(|_| ()))
    }

    fn surface_year(&self, year: i32) -> Result<SurfaceOutcome, PipelineError> {
        let outcome = generate_surface(
            year,
            self.config,
            self.workspace,
            self.interpolator,
            self.decision,
        )?;
        match &outcome {
            SurfaceOutcome::Generated { raster, exported } => {
                info!("year {year}: surface '{raster}' generated (exported: {exported})")
            }
            SurfaceOutcome::Skipped => info!("year {year}: surface generation skipped"),
        }
        Ok(outcome)
    }

    fn zonal_year(&self, year: i32) -> Result<ZonalOutcome, PipelineError> {
        let outcome = aggregate_zone_statistics(
            year,
            self.config,
            self.workspace,
            self.aggregator,
            self.decision,
        )?;
        match &outcome {
            ZonalOutcome::Completed { rows, exported, joined } => info!(
                "year {year}: {rows} zonal records (exported: {exported}, joined: {joined})"
            ),
            ZonalOutcome::Skipped(reason) => {
                info!("year {year}: zonal statistics skipped ({reason})")
            }
        }
        Ok(outcome)
    }

    fn run_years(
        &self,
        per_year: impl Fn(i32) -> Result<(), PipelineError>,
    ) -> Result<RunSummary, DriverError> {
        let years = self.config.year_list()?;
        let mut summary = RunSummary::default();

        for &year in &years {
            info!("processing year {year}");
            match per_year(year) {
                Ok(()) => summary.processed.push(year),
                Err(e) if self.config.continue_on_error => {
                    error!("{e}; continuing with remaining years");
                    summary.failed.push((year, e.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        if summary.processed.is_empty() && !summary.failed.is_empty() {
            return Err(DriverError::AllYearsFailed {
                requested: years.len(),
                failed: summary.failed.len(),
            });
        }
        Ok(summary)
    }
}
