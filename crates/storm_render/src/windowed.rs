//! CPU rendering shown in a window
//!
//! Sprites are rasterized by [`SoftwareRenderer`]; on present the whole
//! framebuffer, overlay included, is uploaded as one texture and drawn by the
//! GPU presenter.

use crate::gpu::{GpuRenderer, GpuSettings};
use crate::software::SoftwareRenderer;
use glam::Vec2;
use std::path::Path;
use std::sync::Arc;
use storm_core::{ImageHandle, Renderer, RendererError};
use winit::window::Window;

pub struct WindowedSoftwareRenderer {
    cpu: SoftwareRenderer,
    presenter: GpuRenderer,
    frame_texture: ImageHandle,
    center: Vec2,
}

impl WindowedSoftwareRenderer {
    /// The framebuffer covers `settings.view_size`.
    pub fn new(window: Arc<Window>, settings: &GpuSettings) -> Result<Self, RendererError> {
        let width = settings.view_size.x.max(1.0) as u32;
        let height = settings.view_size.y.max(1.0) as u32;

        let cpu = SoftwareRenderer::new(width, height);
        let mut presenter = GpuRenderer::new(window, settings)?;
        let frame_texture = presenter.upload_rgba(cpu.frame());

        Ok(Self {
            cpu,
            presenter,
            frame_texture,
            center: Vec2::new(width as f32, height as f32) * 0.5,
        })
    }
}

impl Renderer for WindowedSoftwareRenderer {
    fn name(&self) -> &str {
        "software"
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, RendererError> {
        self.cpu.load_image(path)
    }

    fn rotate_image(&mut self, image: ImageHandle, degrees: f32) -> Result<ImageHandle, RendererError> {
        self.cpu.rotate_image(image, degrees)
    }

    fn image_size(&self, image: ImageHandle) -> Option<(u32, u32)> {
        self.cpu.image_size(image)
    }

    fn begin_frame(&mut self) -> Result<(), RendererError> {
        self.cpu.begin_frame()
    }

    fn draw_image(&mut self, image: ImageHandle, position: Vec2, angle_degrees: f32) -> Result<(), RendererError> {
        self.cpu.draw_image(image, position, angle_degrees)
    }

    fn draw_overlay(&mut self, text: &str) -> Result<(), RendererError> {
        // The CPU frame already carries the label; the title is an extra.
        self.cpu.draw_overlay(text)?;
        self.presenter.update_title(text);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RendererError> {
        self.cpu.present()?;
        self.presenter.write_rgba(self.frame_texture, self.cpu.frame())?;
        self.presenter.begin_frame()?;
        self.presenter.draw_image(self.frame_texture, self.center, 0.0)?;
        self.presenter.present()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RendererError> {
        self.presenter.resize(width, height)
    }
}
