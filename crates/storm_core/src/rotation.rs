//! Rotation strategies
//!
//! A sprite's on-screen orientation is resolved in one of two ways:
//!
//! - **Direct**: hand the base image and the angle to the renderer and let it
//!   rotate at draw time (in hardware, or naively on the CPU).
//! - **Cached**: pre-bake `num_angles` rotated copies of every image once at
//!   startup and pick the nearest-lower one per frame. Costs
//!   `num_angles × image_count` bitmaps of memory, saves all per-frame
//!   resampling.

use crate::math::angle_bucket;
use crate::render::{ImageHandle, Renderer, RendererError};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use tracing::info;

/// Which strategy to build, as chosen in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    #[default]
    Direct,
    Cached,
}

/// Pre-rotated image variants keyed by `(image_index, bucket)`.
///
/// Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct RotationCache {
    num_angles: NonZeroU32,
    image_count: usize,
    // Row-major: image_index * num_angles + bucket
    variants: Vec<ImageHandle>,
}

impl RotationCache {
    /// Rotate every image to `k * 360 / num_angles` degrees for each `k`.
    pub fn build<R: Renderer + ?Sized>(
        renderer: &mut R,
        images: &[ImageHandle],
        num_angles: NonZeroU32,
    ) -> Result<Self, RendererError> {
        let n = num_angles.get();
        let mut variants = Vec::with_capacity(images.len() * n as usize);

        for &image in images {
            for k in 0..n {
                variants.push(renderer.rotate_image(image, Self::slot_degrees(k, num_angles))?);
            }
        }

        info!(
            images = images.len(),
            angles = n,
            variants = variants.len(),
            "rotation cache built"
        );

        Ok(Self {
            num_angles,
            image_count: images.len(),
            variants,
        })
    }

    /// Orientation baked into slot `k`.
    pub fn slot_degrees(k: u32, num_angles: NonZeroU32) -> f32 {
        k as f32 * 360.0 / num_angles.get() as f32
    }

    pub fn bucket(&self, angle_degrees: f32) -> u32 {
        angle_bucket(angle_degrees, self.num_angles.get())
    }

    /// Pre-rotated variant for an image at an angle. O(1), never rotates.
    pub fn lookup(&self, image_index: usize, angle_degrees: f32) -> Option<ImageHandle> {
        if image_index >= self.image_count {
            return None;
        }
        let n = self.num_angles.get() as usize;
        let slot = image_index * n + self.bucket(angle_degrees) as usize;
        self.variants.get(slot).copied()
    }

    pub fn num_angles(&self) -> NonZeroU32 {
        self.num_angles
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Total number of cached variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Resolves a sprite's image index and angle to what the renderer draws.
#[derive(Debug, Clone)]
pub enum RotationStrategy {
    /// Draw the base image with the sprite's angle.
    DirectRotate { images: Vec<ImageHandle> },
    /// Draw a pre-rotated variant unrotated.
    Cached(RotationCache),
}

impl RotationStrategy {
    pub fn prepare<R: Renderer + ?Sized>(
        mode: RotationMode,
        renderer: &mut R,
        images: &[ImageHandle],
        num_angles: NonZeroU32,
    ) -> Result<Self, RendererError> {
        match mode {
            RotationMode::Direct => Ok(Self::DirectRotate {
                images: images.to_vec(),
            }),
            RotationMode::Cached => Ok(Self::Cached(RotationCache::build(renderer, images, num_angles)?)),
        }
    }

    pub fn mode(&self) -> RotationMode {
        match self {
            Self::DirectRotate { .. } => RotationMode::Direct,
            Self::Cached(_) => RotationMode::Cached,
        }
    }

    /// Image to draw and the angle to draw it at. `angle_degrees` must
    /// already be wrapped into `[0, 360)`.
    #[inline]
    pub fn resolve(&self, image_index: usize, angle_degrees: f32) -> Option<(ImageHandle, f32)> {
        match self {
            Self::DirectRotate { images } => images.get(image_index).map(|&image| (image, angle_degrees)),
            Self::Cached(cache) => cache.lookup(image_index, angle_degrees).map(|image| (image, 0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use std::path::Path;

    /// Hands out sequential handles and records rotate requests.
    #[derive(Default)]
    struct RotateRecorder {
        next: u32,
        rotations: Vec<(ImageHandle, f32)>,
    }

    impl Renderer for RotateRecorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn load_image(&mut self, _path: &Path) -> Result<ImageHandle, RendererError> {
            self.next += 1;
            Ok(ImageHandle::from_index(self.next - 1))
        }

        fn rotate_image(&mut self, image: ImageHandle, degrees: f32) -> Result<ImageHandle, RendererError> {
            self.rotations.push((image, degrees));
            self.next += 1;
            Ok(ImageHandle::from_index(self.next - 1))
        }

        fn image_size(&self, _image: ImageHandle) -> Option<(u32, u32)> {
            Some((8, 8))
        }

        fn begin_frame(&mut self) -> Result<(), RendererError> {
            Ok(())
        }

        fn draw_image(&mut self, _image: ImageHandle, _position: Vec2, _angle: f32) -> Result<(), RendererError> {
            Ok(())
        }

        fn draw_overlay(&mut self, _text: &str) -> Result<(), RendererError> {
            Ok(())
        }

        fn present(&mut self) -> Result<(), RendererError> {
            Ok(())
        }
    }

    fn base_images(renderer: &mut RotateRecorder, count: usize) -> Vec<ImageHandle> {
        (0..count)
            .map(|_| renderer.load_image(Path::new("sprite.png")).unwrap())
            .collect()
    }

    fn angles(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_build_rotates_every_slot() {
        let mut renderer = RotateRecorder::default();
        let images = base_images(&mut renderer, 2);

        let cache = RotationCache::build(&mut renderer, &images, angles(4)).unwrap();

        assert_eq!(cache.len(), 8);
        assert_eq!(cache.image_count(), 2);
        let expected: Vec<(ImageHandle, f32)> = images
            .iter()
            .flat_map(|&image| [0.0, 90.0, 180.0, 270.0].map(|deg| (image, deg)))
            .collect();
        assert_eq!(renderer.rotations, expected);
    }

    #[test]
    fn test_lookup_is_pure_and_periodic() {
        let mut renderer = RotateRecorder::default();
        let images = base_images(&mut renderer, 3);
        let cache = RotationCache::build(&mut renderer, &images, angles(36)).unwrap();

        for image_index in 0..3 {
            for angle in [0.0_f32, 5.0, 17.5, 123.4, 359.0, -42.0] {
                let first = cache.lookup(image_index, angle);
                assert!(first.is_some());
                assert_eq!(first, cache.lookup(image_index, angle));
                assert_eq!(first, cache.lookup(image_index, angle + 360.0));
            }
        }
    }

    #[test]
    fn test_lookup_picks_bucket_variant() {
        let mut renderer = RotateRecorder::default();
        let images = base_images(&mut renderer, 2);
        let cache = RotationCache::build(&mut renderer, &images, angles(4)).unwrap();

        // Handles 0 and 1 are the base images; variants start at 2.
        assert_eq!(cache.lookup(0, 0.0), Some(ImageHandle::from_index(2)));
        assert_eq!(cache.lookup(0, 89.9), Some(ImageHandle::from_index(2)));
        assert_eq!(cache.lookup(0, 90.0), Some(ImageHandle::from_index(3)));
        assert_eq!(cache.lookup(1, 270.0), Some(ImageHandle::from_index(9)));
        assert_eq!(cache.lookup(1, -1.0), Some(ImageHandle::from_index(9)));
        assert_eq!(cache.lookup(2, 0.0), None);
    }

    #[test]
    fn test_direct_strategy_passes_angle_through() {
        let mut renderer = RotateRecorder::default();
        let images = base_images(&mut renderer, 2);

        let strategy = RotationStrategy::prepare(RotationMode::Direct, &mut renderer, &images, angles(36)).unwrap();

        assert_eq!(strategy.mode(), RotationMode::Direct);
        assert!(renderer.rotations.is_empty());
        assert_eq!(strategy.resolve(1, 33.0), Some((images[1], 33.0)));
        assert_eq!(strategy.resolve(5, 33.0), None);
    }

    #[test]
    fn test_cached_strategy_draws_unrotated() {
        let mut renderer = RotateRecorder::default();
        let images = base_images(&mut renderer, 1);

        let strategy = RotationStrategy::prepare(RotationMode::Cached, &mut renderer, &images, angles(36)).unwrap();

        assert_eq!(strategy.mode(), RotationMode::Cached);
        let (image, angle) = strategy.resolve(0, 45.0).unwrap();
        assert_eq!(angle, 0.0);
        assert_ne!(image, images[0]);
    }

    #[test]
    fn test_rotation_mode_serde() {
        let mode: RotationMode = serde_json::from_str("\"cached\"").unwrap();
        assert_eq!(mode, RotationMode::Cached);
        assert_eq!(serde_json::to_string(&RotationMode::Direct).unwrap(), "\"direct\"");
    }
}
