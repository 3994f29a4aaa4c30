//! Window management
//!
//! Cross-platform window creation via winit

use winit::{dpi::PhysicalSize, window::Window};

pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Sprite Storm".to_string(),
            width: 1600,
            height: 900,
            resizable: false,
        }
    }
}

/// Create window attributes from config.
///
/// The size is physical so one window pixel matches one simulation unit on
/// every display scale.
pub fn window_attributes(config: &WindowConfig) -> winit::window::WindowAttributes {
    Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(config.resizable)
}
