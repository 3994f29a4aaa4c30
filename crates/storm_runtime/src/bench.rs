//! Headless benchmark
//!
//! Same frame loop as the window, on the CPU renderer with nothing on
//! screen. Results go to the log.

use crate::frame;
use anyhow::{Context, Result};
use storm_asset::AssetSet;
use storm_core::{RotationStrategy, SpritePopulation};
use storm_metrics::{time_scope, FrameClock, PhaseProfiler, DEFAULT_FPS_WINDOW};
use storm_render::SoftwareRenderer;
use storm_services::Settings;
use tracing::info;

/// Frames between progress lines.
const REPORT_EVERY: u64 = 120;

/// Run `frames` frames starting from one sprite plus `batches` batches at the
/// center.
pub fn run(settings: &Settings, frames: u64, batches: usize) -> Result<()> {
    let sim = &settings.simulation;
    let mut renderer = SoftwareRenderer::new(sim.window_width as u32, sim.window_height as u32);

    let assets = AssetSet::load(&settings.assets_dir, &mut renderer).context("asset loading failed")?;
    let strategy = RotationStrategy::prepare(
        settings.rotation,
        &mut renderer,
        assets.images(),
        sim.angle_resolution()?,
    )
    .context("rotation cache build failed")?;

    let mut population =
        SpritePopulation::new(sim.clone(), assets.count()).context("invalid simulation settings")?;
    let center = sim.center();
    for _ in 0..batches {
        population.add_batch(center.x, center.y);
    }

    info!(frames, sprites = population.len(), "headless run started");

    let mut clock = FrameClock::new(DEFAULT_FPS_WINDOW);
    let mut profiler = PhaseProfiler::new();
    for _ in 0..frames {
        let dt = clock.tick();
        time_scope!(profiler, "update", { population.update(dt) });
        time_scope!(profiler, "draw", {
            frame::render(&mut renderer, &population, &strategy, clock.fps())
        })
        .context("renderer failed")?;
        profiler.end_frame();

        if clock.frames() % REPORT_EVERY == 0 {
            info!(frame = clock.frames(), "{}", renderer.overlay());
        }
    }

    let (fastest, slowest) = clock.frame_time_range_ms();
    info!(
        frames = renderer.frames_presented(),
        sprites = population.len(),
        fps = format!("{:.1}", clock.fps()),
        frame_ms = format!("{:.2}", clock.frame_time_ms()),
        fastest_ms = format!("{fastest:.2}"),
        slowest_ms = format!("{slowest:.2}"),
        update_ms = format!("{:.3}", profiler.average_ms("update")),
        draw_ms = format!("{:.3}", profiler.average_ms("draw")),
        "headless run finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;
    use std::path::Path;
    use storm_core::Renderer;
    use tempfile::TempDir;

    fn settings_with_assets(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.assets_dir = dir.to_path_buf();
        settings.simulation.window_width = 64.0;
        settings.simulation.window_height = 64.0;
        settings.simulation.batch_size = 3;
        settings
    }

    #[test]
    fn test_missing_assets_fail_before_the_loop() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with_assets(&dir.path().join("missing"));

        let err = run(&settings, 10, 0).unwrap_err();
        assert!(format!("{err:#}").contains("asset loading failed"));
    }

    #[test]
    fn test_undecodable_asset_names_the_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("junk.png"), b"not a png").unwrap();
        let settings = settings_with_assets(dir.path());

        let err = run(&settings, 10, 0).unwrap_err();
        assert!(format!("{err:#}").contains("junk.png"));
    }

    #[test]
    fn test_frame_renders_population() {
        let mut renderer = SoftwareRenderer::new(32, 32);
        // An opaque black tile is as good a sprite as any.
        let tile = SoftwareRenderer::new(4, 4).frame().clone();
        let image = renderer.insert_image(tile);
        let strategy = RotationStrategy::DirectRotate { images: vec![image] };
        let population = SpritePopulation::new(Default::default(), NonZeroUsize::MIN).unwrap();

        frame::render(&mut renderer, &population, &strategy, 42.4).unwrap();

        assert_eq!(renderer.draws_this_frame(), 1);
        assert_eq!(renderer.overlay(), "42 FPS | 1 SPRITES");
        assert_eq!(renderer.frames_presented(), 1);
        assert_eq!(renderer.name(), "software");
    }
}
