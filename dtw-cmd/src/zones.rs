//! Zone layer import.

use dtw_core::config::PipelineConfig;
use dtw_core::zone::ZoneFeature;
use dtw_store::Workspace;
use log::info;
use std::path::Path;

/// Import zone features from a JSON file into the configured zone layer.
///
/// The file holds an array of `{ "pcl": ..., "rings": [[[x, y], ...]] }`
/// features. The layer is replaced, not appended.
pub fn run_import(config_path: &str, zones_path: &str) -> anyhow::Result<()> {
    let config = PipelineConfig::load(Path::new(config_path))?;
    let workspace = Workspace::open(&config.workspace_path())?;

    let text = std::fs::read_to_string(zones_path)?;
    let zones: Vec<ZoneFeature> = serde_json::from_str(&text)?;
    anyhow::ensure!(!zones.is_empty(), "zone file {zones_path} holds no features");

    workspace.create_zone_layer(&config.zonal.zone_layer, &zones)?;
    info!(
        "imported {} zones into layer '{}'",
        zones.len(),
        config.zonal.zone_layer
    );
    Ok(())
}
