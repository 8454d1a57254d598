//! Pipeline run commands.

use crate::OnExisting;
use dtw_core::config::PipelineConfig;
use dtw_engine::{CellCenterAggregator, IdwInterpolator};
use dtw_pipeline::{
    AlwaysApprove, AlwaysDeny, OverwriteDecision, PipelineRunner, PromptDecision, RunSummary,
};
use dtw_store::Workspace;
use log::{info, warn};
use std::path::Path;

fn decision_for(on_existing: OnExisting) -> Box<dyn OverwriteDecision> {
    match on_existing {
        OnExisting::Ask => Box::new(PromptDecision),
        OnExisting::Overwrite => Box::new(AlwaysApprove),
        OnExisting::Keep => Box::new(AlwaysDeny),
    }
}

fn report(summary: &RunSummary) {
    info!(
        "run complete: {} years processed, {} failed",
        summary.processed.len(),
        summary.failed.len()
    );
    for (year, err) in &summary.failed {
        warn!("year {year} failed: {err}");
    }
}

fn with_runner(
    config_path: &str,
    on_existing: OnExisting,
    go: impl Fn(&PipelineRunner) -> Result<RunSummary, dtw_pipeline::DriverError>,
) -> anyhow::Result<()> {
    let config = PipelineConfig::load(Path::new(config_path))?;
    let workspace = Workspace::open(&config.workspace_path())?;
    let interpolator = IdwInterpolator::new();
    let aggregator = CellCenterAggregator::new();
    let decision = decision_for(on_existing);

    let runner = PipelineRunner::new(
        &config,
        &workspace,
        &interpolator,
        &aggregator,
        decision.as_ref(),
    );
    let summary = go(&runner)?;
    report(&summary);
    Ok(())
}

/// Run both stages for every configured year.
pub fn run_full(config_path: &str, on_existing: OnExisting) -> anyhow::Result<()> {
    with_runner(config_path, on_existing, |runner| runner.run())
}

/// Run only the surface-generation stage.
pub fn run_surface(config_path: &str, on_existing: OnExisting) -> anyhow::Result<()> {
    with_runner(config_path, on_existing, |runner| runner.run_surface())
}

/// Run only the zonal-statistics stage.
pub fn run_zonal(config_path: &str, on_existing: OnExisting) -> anyhow::Result<()> {
    with_runner(config_path, on_existing, |runner| runner.run_zonal())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configuration_file_is_fatal() {
        let err = run_full("/no/such/pipeline.yaml", OnExisting::Keep).unwrap_err();
        assert!(
            err.to_string().contains("configuration file not found"),
            "Startup should fail loudly on a missing configuration: {err}"
        );
    }

    #[test]
    fn full_run_from_configuration_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("work");
        std::fs::create_dir_all(base.join("data")).unwrap();
        std::fs::write(
            base.join("data/DTW2020.csv"),
            "X,Y,DTW_BGS\n0.0,0.0,10.0\n100.0,100.0,20.0\n",
        )
        .unwrap();

        let config_path = dir.path().join("pipeline.yaml");
        std::fs::write(
            &config_path,
            format!(
                r#"
base_path: {}
years: "2020"
kriging:
  cell_size: 50.0
  transformation_type: empirical
  max_local_points: 2
  overlap_factor: 1.0
  number_semivariograms: 100
  search_neighborhood: "NBRTYPE=StandardCircular;RADIUS=10000"
  output_type: prediction
  quantile_value: 0.5
  threshold_type: exceed
  probability_threshold: none
  semivariogram_model_type: power
zonal:
  zone_layer: vegetation_parcels
"#,
                base.display()
            ),
        )
        .unwrap();

        // No zone layer imported: surface runs, zonal logs a skip.
        run_full(config_path.to_str().unwrap(), OnExisting::Keep).unwrap();

        let ws = Workspace::open(&base.join("kriging.db")).unwrap();
        assert!(ws.exists("DTW_BGS_2020").unwrap(), "Surface stage should have run");
        assert!(
            base.join("output/DTW_BGS_2020.asc").exists(),
            "Archival raster should be exported"
        );
    }
}
