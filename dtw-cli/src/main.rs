//! DTW CLI - groundwater depth-to-water kriging and zonal statistics.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "dtw-cli",
    version,
    about = "Groundwater depth-to-water kriging toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: dtw_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    dtw_cmd::run(cli.command)
}
