//! Sprite Storm Runtime
//!
//! `storm` binary: windowed benchmark by default, `--headless <frames>` for
//! a CPU-only run that only logs.

mod app;
mod bench;
mod cli;
mod frame;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = cli.resolve_settings()?;

    info!("Sprite Storm v{}", storm_core::VERSION);
    info!(
        backend = ?settings.backend,
        rotation = ?settings.rotation,
        assets = %settings.assets_dir.display(),
        parallel = settings.simulation.parallel_update,
        "starting"
    );

    match cli.headless {
        Some(frames) => bench::run(&settings, frames, cli.batches),
        None => app::run(settings, cli.batches),
    }
}
