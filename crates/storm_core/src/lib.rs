//! Storm Core
//!
//! The sprite simulation shared by every back end:
//! - Sprite kinematics (bounded bounce + continuous spin)
//! - Population control (batch add, LIFO batch remove)
//! - Rotation strategies (rotate on draw, precomputed cache)
//! - The renderer contract back ends implement

pub mod config;
pub mod math;
pub mod population;
pub mod render;
pub mod rotation;
pub mod sprite;

pub use config::{ConfigError, SimConfig};
pub use population::SpritePopulation;
pub use render::{overlay_text, ImageHandle, Renderer, RendererError};
pub use rotation::{RotationCache, RotationMode, RotationStrategy};
pub use sprite::SpriteUnit;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
