//! Command line
//!
//! Flags override whatever the settings file says.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use storm_core::RotationMode;
use storm_services::{BackendKind, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Gpu,
    Software,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Gpu => BackendKind::Gpu,
            BackendArg::Software => BackendKind::Software,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RotationArg {
    /// Rotate every sprite at draw time.
    Direct,
    /// Pre-rotate each image once per angle slot.
    Cached,
}

impl From<RotationArg> for RotationMode {
    fn from(arg: RotationArg) -> Self {
        match arg {
            RotationArg::Direct => RotationMode::Direct,
            RotationArg::Cached => RotationMode::Cached,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "storm", version, about = "Bouncing, spinning sprite throughput benchmark")]
pub struct Cli {
    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Directory searched recursively for .png and .bmp sprites
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    #[arg(long, value_enum)]
    pub rotation: Option<RotationArg>,

    /// Graphics driver preference, e.g. "vulkan,gl"
    #[arg(long = "use-renderer", value_name = "DRIVERS")]
    pub use_renderer: Option<String>,

    /// Run this many frames on the CPU renderer without a window
    #[arg(long, value_name = "FRAMES")]
    pub headless: Option<u64>,

    /// Batches added at the window center before the first frame
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub batches: usize,

    /// Update sprites on the rayon thread pool
    #[arg(long)]
    pub parallel: bool,
}

impl Cli {
    /// Settings file (or defaults) with the command line applied on top.
    pub fn resolve_settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path).context("settings loading failed")?,
            None => Settings::default(),
        };

        if let Some(assets) = &self.assets {
            settings.assets_dir = assets.clone();
        }
        if let Some(backend) = self.backend {
            settings.backend = backend.into();
        }
        if let Some(rotation) = self.rotation {
            settings.rotation = rotation.into();
        }
        if let Some(drivers) = &self.use_renderer {
            settings.gpu_backends = Some(drivers.clone());
        }
        if self.parallel {
            settings.simulation.parallel_update = true;
        }

        settings.validate().context("invalid settings")?;
        Ok(settings)
    }
}
