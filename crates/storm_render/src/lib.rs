//! Storm Render
//!
//! Back ends for the [`storm_core::Renderer`] contract:
//! - [`SoftwareRenderer`]: CPU rasterizer, no window needed (headless runs, tests)
//! - [`GpuRenderer`]: wgpu, one instanced quad per sprite
//! - [`WindowedSoftwareRenderer`]: the CPU rasterizer presented through wgpu

pub mod backend;
pub mod gpu;
pub mod raster;
pub mod software;
pub mod text;
pub mod window;
pub mod windowed;

pub use backend::{parse_backends, UnknownBackend};
pub use gpu::{GpuRenderer, GpuSettings};
pub use software::SoftwareRenderer;
pub use text::OverlayFont;
pub use window::{window_attributes, WindowConfig};
pub use windowed::WindowedSoftwareRenderer;

pub use wgpu;
pub use winit;
