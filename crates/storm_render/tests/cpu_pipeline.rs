//! Sprites on disk through the CPU back end, end to end.

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use storm_asset::{AssetLoadError, AssetSet};
use storm_core::{overlay_text, Renderer, RotationMode, RotationStrategy, SimConfig, SpritePopulation};
use storm_render::SoftwareRenderer;
use tempfile::TempDir;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn write_sprites(dir: &Path) {
    RgbaImage::from_pixel(8, 4, RED).save(dir.join("a_red.png")).unwrap();
    RgbaImage::from_pixel(6, 6, BLUE).save(dir.join("b_blue.png")).unwrap();
}

fn small_config() -> SimConfig {
    SimConfig {
        window_width: 320.0,
        window_height: 240.0,
        batch_size: 10,
        num_angles: 8,
        ..SimConfig::default()
    }
}

fn run_frames(mode: RotationMode) -> (SoftwareRenderer, SpritePopulation<StdRng>, RotationStrategy) {
    let dir = TempDir::new().unwrap();
    write_sprites(dir.path());

    let config = small_config();
    let mut renderer = SoftwareRenderer::new(320, 240);
    let assets = AssetSet::load(dir.path(), &mut renderer).unwrap();
    let strategy = RotationStrategy::prepare(
        mode,
        &mut renderer,
        assets.images(),
        config.angle_resolution().unwrap(),
    )
    .unwrap();

    let mut population = SpritePopulation::with_rng(config, assets.count(), StdRng::seed_from_u64(7)).unwrap();
    // Clear of the overlay box in the top-left corner.
    population.add_batch(160.0, 160.0);

    for _ in 0..5 {
        population.update(1.0 / 60.0);
        renderer.begin_frame().unwrap();
        population.draw(&mut renderer, &strategy).unwrap();
        renderer
            .draw_overlay(&overlay_text(60.0, population.len()))
            .unwrap();
        renderer.present().unwrap();
    }

    (renderer, population, strategy)
}

fn has_overlay_text(renderer: &SoftwareRenderer) -> bool {
    (0..24).any(|y| (0..160).any(|x| *renderer.frame().get_pixel(x, y) == Rgba([0, 255, 0, 255])))
}

#[test]
fn test_assets_load_in_path_order() {
    let dir = TempDir::new().unwrap();
    write_sprites(dir.path());

    let mut renderer = SoftwareRenderer::new(16, 16);
    let assets = AssetSet::load(dir.path(), &mut renderer).unwrap();

    assert_eq!(assets.count().get(), 2);
    assert_eq!(renderer.image_size(assets.images()[0]), Some((8, 4)));
    assert_eq!(renderer.image_size(assets.images()[1]), Some((6, 6)));
}

#[test]
fn test_direct_rotation_frames() {
    let (renderer, population, strategy) = run_frames(RotationMode::Direct);

    assert_eq!(strategy.mode(), RotationMode::Direct);
    assert_eq!(population.len(), 11);
    assert_eq!(renderer.frames_presented(), 5);
    assert_eq!(renderer.draws_this_frame(), 11);
    assert_eq!(renderer.overlay(), "60 FPS | 11 SPRITES");
    assert!(renderer.frame().pixels().any(|p| *p == RED || *p == BLUE));
    assert!(has_overlay_text(&renderer));
}

#[test]
fn test_cached_rotation_frames() {
    let (renderer, population, strategy) = run_frames(RotationMode::Cached);

    match &strategy {
        RotationStrategy::Cached(cache) => assert_eq!(cache.len(), 2 * 8),
        other => panic!("expected cached strategy, got {:?}", other.mode()),
    }
    assert_eq!(renderer.draws_this_frame(), population.len());
    assert!(renderer.frame().pixels().any(|p| *p == RED || *p == BLUE));
}

#[test]
fn test_empty_asset_dir_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut renderer = SoftwareRenderer::new(16, 16);

    let err = AssetSet::load(dir.path(), &mut renderer).unwrap_err();
    assert!(matches!(err, AssetLoadError::Empty(_)));
}
