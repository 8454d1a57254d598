//! Command implementations for the DTW kriging CLI.
//!
//! Provides subcommands for running the per-year pipeline (both stages
//! together or individually) and for importing the zone feature layer
//! the zonal stage aggregates onto.

use clap::{Subcommand, ValueEnum};

pub mod pipeline;
pub mod zones;

/// How to treat artifacts that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnExisting {
    /// Ask interactively before each overwrite (only `yes` affirms).
    Ask,
    /// Overwrite without asking.
    Overwrite,
    /// Keep existing artifacts, skipping the guarded steps.
    Keep,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run surface generation and zonal statistics for the configured years
    Run {
        /// Path to the pipeline configuration file
        #[arg(short, long, default_value = "pipeline.yaml")]
        config: String,

        /// What to do when a raster, export, table slice, or layer already exists
        #[arg(long, value_enum, default_value = "ask")]
        on_existing: OnExisting,
    },

    /// Run only the surface-generation stage
    Surface {
        /// Path to the pipeline configuration file
        #[arg(short, long, default_value = "pipeline.yaml")]
        config: String,

        /// What to do when a raster or archival export already exists
        #[arg(long, value_enum, default_value = "ask")]
        on_existing: OnExisting,
    },

    /// Run only the zonal-statistics stage
    ZonalStats {
        /// Path to the pipeline configuration file
        #[arg(short, long, default_value = "pipeline.yaml")]
        config: String,

        /// What to do when a table slice, CSV, or joined layer already exists
        #[arg(long, value_enum, default_value = "ask")]
        on_existing: OnExisting,
    },

    /// Import a zone feature layer into the workspace from a JSON file
    ImportZones {
        /// Path to the pipeline configuration file
        #[arg(short, long, default_value = "pipeline.yaml")]
        config: String,

        /// Path to a JSON array of zone features ({pcl, rings})
        #[arg(short, long)]
        zones: String,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Run { config, on_existing } => {
            pipeline::run_full(&config, on_existing)
        }
        Command::Surface { config, on_existing } => {
            pipeline::run_surface(&config, on_existing)
        }
        Command::ZonalStats { config, on_existing } => {
            pipeline::run_zonal(&config, on_existing)
        }
        Command::ImportZones { config, zones } => zones::run_import(&config, &zones),
    }
}
