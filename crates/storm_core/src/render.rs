//! Renderer contract
//!
//! The simulation never touches pixels. Back ends hand out opaque
//! [`ImageHandle`]s and draw them centered at a position with a rotation in
//! degrees (positive = clockwise on the y-down screen).

use crate::math::Vec2;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Opaque reference to an image owned by a renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(u32);

impl ImageHandle {
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Slot of this image in the renderer's own storage.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Failure surfaced by a renderer back end. Always fatal to the run.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("failed to load image {}: {message}", path.display())]
    ImageLoad { path: PathBuf, message: String },

    #[error("unknown image handle {0:?}")]
    UnknownImage(ImageHandle),

    #[error("no image variant for sprite image index {image_index}")]
    MissingVariant { image_index: usize },

    #[error("surface error: {0}")]
    Surface(String),

    #[error("device error: {0}")]
    Device(String),

    #[error("overlay font error: {0}")]
    Font(String),
}

/// A drawing back end.
///
/// Object safe so the runtime can pick an implementation at startup.
pub trait Renderer {
    /// Short back end name for logs and the window title.
    fn name(&self) -> &str;

    /// Decode the bitmap at `path` and keep it for the rest of the run.
    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, RendererError>;

    /// Produce a new image holding `image` rotated by `degrees`.
    ///
    /// Only called while building the rotation cache, never per frame.
    fn rotate_image(&mut self, image: ImageHandle, degrees: f32) -> Result<ImageHandle, RendererError>;

    /// Pixel width and height of a loaded image.
    fn image_size(&self, image: ImageHandle) -> Option<(u32, u32)>;

    /// Start a frame (clear the target).
    fn begin_frame(&mut self) -> Result<(), RendererError>;

    /// Draw `image` centered at `position`, rotated by `angle_degrees`.
    fn draw_image(
        &mut self,
        image: ImageHandle,
        position: Vec2,
        angle_degrees: f32,
    ) -> Result<(), RendererError>;

    /// Show the stats line for this frame.
    fn draw_overlay(&mut self, text: &str) -> Result<(), RendererError>;

    /// Finish the frame and put it on screen.
    fn present(&mut self) -> Result<(), RendererError>;

    /// The output surface changed size (physical pixels).
    fn resize(&mut self, _width: u32, _height: u32) -> Result<(), RendererError> {
        Ok(())
    }
}

/// The stats line shown every frame.
pub fn overlay_text(fps: f64, sprites: usize) -> String {
    format!("{fps:.0} FPS | {sprites} SPRITES")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_text() {
        assert_eq!(overlay_text(59.6, 6), "60 FPS | 6 SPRITES");
        assert_eq!(overlay_text(0.0, 0), "0 FPS | 0 SPRITES");
    }

    #[test]
    fn test_handle_index() {
        assert_eq!(ImageHandle::from_index(7).index(), 7);
        assert!(ImageHandle::from_index(1) < ImageHandle::from_index(2));
    }
}
