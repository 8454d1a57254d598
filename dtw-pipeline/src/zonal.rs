//! Zonal Statistics Stage: raster to per-parcel statistics.

use crate::confirm::OverwriteDecision;
use crate::error::{PipelineError, Stage};
use dtw_core::config::{PipelineConfig, STATS_TABLE};
use dtw_core::stats::ZonalRecord;
use dtw_core::zone::ZONE_ID_FIELD;
use dtw_engine::ZonalAggregator;
use dtw_store::Workspace;
use log::{info, warn};
use std::fmt;

/// Why the stage was skipped for a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    RasterMissing,
    ZoneLayerMissing,
    ZoneIdFieldMissing,
    OverwriteDeclined,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::RasterMissing => write!(f, "raster does not exist"),
            SkipReason::ZoneLayerMissing => write!(f, "zone layer does not exist"),
            SkipReason::ZoneIdFieldMissing => {
                write!(f, "zone layer has no {ZONE_ID_FIELD} field")
            }
            SkipReason::OverwriteDeclined => write!(f, "overwrite declined"),
        }
    }
}

/// How the zonal stage ended for a year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZonalOutcome {
    /// Records were appended to the cumulative table. `exported` and
    /// `joined` tell whether the CSV artifact and the joined layer were
    /// also (re)written.
    Completed {
        rows: usize,
        exported: bool,
        joined: bool,
    },
    Skipped(SkipReason),
}

/// Aggregate the year's raster over the zone layer and fold the results
/// into the cumulative statistics table, the CSV export, and the joined
/// parcel layer.
///
/// Missing preconditions are logged skips, not errors; the aggregation
/// engine is only invoked once all preconditions hold.
pub fn aggregate_zone_statistics(
    year: i32,
    config: &PipelineConfig,
    workspace: &Workspace,
    aggregator: &dyn ZonalAggregator,
    decision: &dyn OverwriteDecision,
) -> Result<ZonalOutcome, PipelineError> {
    let fail = |source: crate::error::StageFailure| PipelineError {
        year,
        stage: Stage::ZonalStats,
        source,
    };

    let raster_name = PipelineConfig::raster_name(year);
    if !workspace.exists(&raster_name).map_err(|e| fail(e.into()))? {
        warn!("Raster for the year {year} does not exist. Skipping...");
        return Ok(ZonalOutcome::Skipped(SkipReason::RasterMissing));
    }

    let zone_layer = config.zonal.zone_layer.as_str();
    if !workspace.exists(zone_layer).map_err(|e| fail(e.into()))? {
        warn!("Zone layer {zone_layer} does not exist. Skipping...");
        return Ok(ZonalOutcome::Skipped(SkipReason::ZoneLayerMissing));
    }

    let fields = workspace.list_fields(zone_layer).map_err(|e| fail(e.into()))?;
    if !fields.iter().any(|f| f.name == ZONE_ID_FIELD) {
        warn!("Field {ZONE_ID_FIELD} does not exist in {zone_layer}. Skipping...");
        return Ok(ZonalOutcome::Skipped(SkipReason::ZoneIdFieldMissing));
    }

    info!("Computing zonal statistics for {year}...");
    let raster = workspace.raster(&raster_name).map_err(|e| fail(e.into()))?;
    let zones = workspace.zone_layer(zone_layer).map_err(|e| fail(e.into()))?;
    let values = aggregator
        .aggregate(&raster, &zones, config.zonal.statistic)
        .map_err(|e| fail(e.into()))?;
    let records: Vec<ZonalRecord> = values
        .into_iter()
        .map(|v| ZonalRecord::from_value(v, year))
        .collect();

    if workspace
        .stats_year_exists(STATS_TABLE, year)
        .map_err(|e| fail(e.into()))?
        && !decision.decide(&format!(
            "The {STATS_TABLE} entry for the year {year}"
        ))
    {
        info!("Skipping processing for the year {year}.");
        return Ok(ZonalOutcome::Skipped(SkipReason::OverwriteDeclined));
    }

    workspace
        .delete_stats_year(STATS_TABLE, year)
        .map_err(|e| fail(e.into()))?;
    workspace
        .ensure_stats_table(STATS_TABLE)
        .map_err(|e| fail(e.into()))?;
    workspace
        .append_stats(STATS_TABLE, &records)
        .map_err(|e| fail(e.into()))?;

    let csv_path = config.stats_csv_path(year);
    let exported = if csv_path.exists()
        && !decision.decide(&format!("The CSV file {}", csv_path.display()))
    {
        info!("Skipped exporting to {}", csv_path.display());
        false
    } else {
        workspace
            .export_stats_csv(STATS_TABLE, year, &csv_path)
            .map_err(|e| fail(e.into()))?;
        true
    };

    let joined_name = PipelineConfig::joined_layer_name(year);
    if workspace.exists(&joined_name).map_err(|e| fail(e.into()))?
        && !decision.decide(&format!("The feature class {joined_name}"))
    {
        info!("Skipping creation of {joined_name}");
        return Ok(ZonalOutcome::Completed {
            rows: records.len(),
            exported,
            joined: false,
        });
    }
    workspace.delete(&joined_name).map_err(|e| fail(e.into()))?;
    workspace
        .write_joined_layer(zone_layer, STATS_TABLE, year, &joined_name)
        .map_err(|e| fail(e.into()))?;

    info!(
        "Zonal statistics for year {year} appended to {STATS_TABLE} and joined into {joined_name}."
    );
    Ok(ZonalOutcome::Completed {
        rows: records.len(),
        exported,
        joined: true,
    })
}
