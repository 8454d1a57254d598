//! Surface Generation Stage: observations to an interpolated raster.

use crate::confirm::OverwriteDecision;
use crate::error::{PipelineError, Stage};
use crate::retry::{with_schema_lock_retry, SCHEMA_LOCK_ATTEMPTS, SCHEMA_LOCK_RETRY_DELAY};
use dtw_core::config::{PipelineConfig, POINT_LAYER};
use dtw_core::crs::NAD83_UTM_ZONE_11N;
use dtw_core::observation::DepthObservation;
use dtw_engine::SurfaceInterpolator;
use dtw_store::Workspace;
use log::info;

/// How the surface stage ended for a year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOutcome {
    /// The raster was (re)computed and persisted; `exported` tells
    /// whether the archival file was also written.
    Generated { raster: String, exported: bool },
    /// A raster already existed and the overwrite was declined.
    Skipped,
}

/// Generate the year's interpolated surface.
///
/// Builds the point layer from the year's observation CSV (retrying
/// schema-lock contention), gates recomputation and archival export on
/// the injected overwrite decision, and persists the raster under its
/// year-qualified name.
pub fn generate_surface(
    year: i32,
    config: &PipelineConfig,
    workspace: &Workspace,
    interpolator: &dyn SurfaceInterpolator,
    decision: &dyn OverwriteDecision,
) -> Result<SurfaceOutcome, PipelineError> {
    let fail = |source: crate::error::StageFailure| PipelineError {
        year,
        stage: Stage::Surface,
        source,
    };

    std::fs::create_dir_all(config.output_dir()).map_err(|e| fail(e.into()))?;

    let csv_path = config.observation_csv(year);
    let csv_text = std::fs::read_to_string(&csv_path).map_err(|e| fail(e.into()))?;
    let points = DepthObservation::parse_csv(&csv_text).map_err(|e| fail(e.into()))?;

    with_schema_lock_retry(POINT_LAYER, SCHEMA_LOCK_ATTEMPTS, SCHEMA_LOCK_RETRY_DELAY, || {
        workspace.create_point_layer(POINT_LAYER, &points, NAD83_UTM_ZONE_11N)
    })
    .map_err(|e| fail(e.into()))?;

    let raster_name = PipelineConfig::raster_name(year);
    if workspace.exists(&raster_name).map_err(|e| fail(e.into()))?
        && !decision.decide(&format!("The raster for the year {year}"))
    {
        info!("Skipping processing for the year {year}.");
        return Ok(SurfaceOutcome::Skipped);
    }

    let grid = interpolator
        .interpolate(&points, &config.kriging, NAD83_UTM_ZONE_11N)
        .map_err(|e| fail(e.into()))?;
    workspace
        .put_raster(&raster_name, &grid, NAD83_UTM_ZONE_11N)
        .map_err(|e| fail(e.into()))?;

    let archive_path = config.archive_raster_path(year);
    if archive_path.exists()
        && !decision.decide(&format!("The archival raster for the year {year}"))
    {
        info!("Skipping archival export for the year {year}.");
        return Ok(SurfaceOutcome::Generated {
            raster: raster_name,
            exported: false,
        });
    }
    workspace
        .export_raster_ascii(&raster_name, &archive_path)
        .map_err(|e| fail(e.into()))?;

    Ok(SurfaceOutcome::Generated {
        raster: raster_name,
        exported: true,
    })
}
