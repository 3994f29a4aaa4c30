//! CPU software back end
//!
//! Decodes with the `image` crate and alpha-blits into an RGBA framebuffer.
//! Non-zero angles are rotated at draw time, every frame, with no caching:
//! this is the path the rotation cache exists to speed up. The overlay is
//! rasterized into the top-left corner of the frame.

use crate::raster::{blit_centered, rotate_rgba};
use crate::text::{OverlayFont, OVERLAY_BACKGROUND, OVERLAY_PX, OVERLAY_TEXT};
use glam::Vec2;
use image::{Rgba, RgbaImage};
use std::path::Path;
use storm_core::{ImageHandle, Renderer, RendererError};

pub struct SoftwareRenderer {
    frame: RgbaImage,
    clear_color: Rgba<u8>,
    images: Vec<RgbaImage>,
    overlay: String,
    // Loaded on the first overlay so headless setup stays infallible.
    font: Option<OverlayFont>,
    frames_presented: u64,
    draws_this_frame: usize,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        let clear_color = Rgba([0, 0, 0, 255]);
        Self {
            frame: RgbaImage::from_pixel(width, height, clear_color),
            clear_color,
            images: Vec::new(),
            overlay: String::new(),
            font: None,
            frames_presented: 0,
            draws_this_frame: 0,
        }
    }

    /// Take ownership of an already decoded image.
    pub fn insert_image(&mut self, image: RgbaImage) -> ImageHandle {
        self.images.push(image);
        ImageHandle::from_index(self.images.len() as u32 - 1)
    }

    pub fn image(&self, handle: ImageHandle) -> Option<&RgbaImage> {
        self.images.get(handle.index())
    }

    /// The framebuffer as of the last draw.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Most recent overlay text.
    pub fn overlay(&self) -> &str {
        &self.overlay
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn draws_this_frame(&self) -> usize {
        self.draws_this_frame
    }

    fn overlay_font(&mut self) -> Result<&OverlayFont, RendererError> {
        match &mut self.font {
            Some(font) => Ok(font),
            empty => Ok(empty.insert(OverlayFont::embedded(OVERLAY_PX)?)),
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn name(&self) -> &str {
        "software"
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, RendererError> {
        let decoded = image::open(path).map_err(|e| RendererError::ImageLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(self.insert_image(decoded.to_rgba8()))
    }

    fn rotate_image(&mut self, image: ImageHandle, degrees: f32) -> Result<ImageHandle, RendererError> {
        let rotated = rotate_rgba(self.image(image).ok_or(RendererError::UnknownImage(image))?, degrees);
        Ok(self.insert_image(rotated))
    }

    fn image_size(&self, image: ImageHandle) -> Option<(u32, u32)> {
        self.image(image).map(RgbaImage::dimensions)
    }

    fn begin_frame(&mut self) -> Result<(), RendererError> {
        let clear = self.clear_color;
        self.frame.pixels_mut().for_each(|p| *p = clear);
        self.draws_this_frame = 0;
        Ok(())
    }

    fn draw_image(&mut self, image: ImageHandle, position: Vec2, angle_degrees: f32) -> Result<(), RendererError> {
        let src = self.images.get(image.index()).ok_or(RendererError::UnknownImage(image))?;
        if angle_degrees == 0.0 {
            blit_centered(&mut self.frame, src, position);
        } else {
            blit_centered(&mut self.frame, &rotate_rgba(src, angle_degrees), position);
        }
        self.draws_this_frame += 1;
        Ok(())
    }

    fn draw_overlay(&mut self, text: &str) -> Result<(), RendererError> {
        self.overlay.clear();
        self.overlay.push_str(text);

        let label = self.overlay_font()?.render_label(text, OVERLAY_TEXT, OVERLAY_BACKGROUND);
        let center = Vec2::new(label.width() as f32, label.height() as f32) * 0.5;
        blit_centered(&mut self.frame, &label, center);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RendererError> {
        self.frames_presented += 1;
        Ok(())
    }
}
