//! Simulation configuration
//!
//! One immutable value handed to the population at construction. Nothing in
//! the core reads process-wide state.

use crate::math::Vec2;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use thiserror::Error;

/// A configuration value the simulation cannot run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("window size must be positive and finite, got {width}x{height}")]
    WindowSize { width: f32, height: f32 },

    #[error("speed bound must be positive and finite, got {0}")]
    Speed(f32),

    #[error("batch size must be at least 1")]
    BatchSize,

    #[error("rotation cache needs at least one angle")]
    NumAngles,

    #[error("max frame dt must be positive and finite, got {0}")]
    MaxFrameDt(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Horizontal bound sprites bounce against, in pixels.
    pub window_width: f32,
    /// Vertical bound sprites bounce against, in pixels.
    pub window_height: f32,
    /// Per-axis speed bound (px/s), also the spin bound (deg/s).
    pub speed: f32,
    /// Sprites added or removed per pointer press.
    pub batch_size: usize,
    /// Discrete orientations per image in the rotation cache.
    pub num_angles: u32,
    /// Longest frame the physics will integrate in one step, in seconds.
    pub max_frame_dt: f32,
    /// Spread the update phase over the rayon pool.
    pub parallel_update: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            window_width: 1600.0,
            window_height: 900.0,
            speed: 400.0,
            batch_size: 500,
            num_angles: 36,
            max_frame_dt: 0.25,
            parallel_update: false,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if !positive(self.window_width) || !positive(self.window_height) {
            return Err(ConfigError::WindowSize {
                width: self.window_width,
                height: self.window_height,
            });
        }
        if !positive(self.speed) {
            return Err(ConfigError::Speed(self.speed));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::BatchSize);
        }
        if self.num_angles == 0 {
            return Err(ConfigError::NumAngles);
        }
        if !positive(self.max_frame_dt) {
            return Err(ConfigError::MaxFrameDt(self.max_frame_dt));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.window_width, self.window_height)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds() * 0.5
    }

    pub fn angle_resolution(&self) -> Result<NonZeroU32, ConfigError> {
        NonZeroU32::new(self.num_angles).ok_or(ConfigError::NumAngles)
    }

    /// Map a raw frame delta onto one the physics can integrate.
    ///
    /// Negative, NaN and infinite deltas become 0; stalls are clamped to
    /// `max_frame_dt`.
    pub fn sanitize_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            0.0
        } else {
            dt.min(self.max_frame_dt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.center(), Vec2::new(800.0, 450.0));
        assert_eq!(config.angle_resolution().map(NonZeroU32::get), Ok(36));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_window = SimConfig { window_width: 0.0, ..SimConfig::default() };
        assert!(matches!(bad_window.validate(), Err(ConfigError::WindowSize { .. })));

        let nan_speed = SimConfig { speed: f32::NAN, ..SimConfig::default() };
        assert!(matches!(nan_speed.validate(), Err(ConfigError::Speed(_))));

        let no_batch = SimConfig { batch_size: 0, ..SimConfig::default() };
        assert_eq!(no_batch.validate(), Err(ConfigError::BatchSize));

        let no_angles = SimConfig { num_angles: 0, ..SimConfig::default() };
        assert_eq!(no_angles.validate(), Err(ConfigError::NumAngles));
        assert_eq!(no_angles.angle_resolution(), Err(ConfigError::NumAngles));

        let no_dt = SimConfig { max_frame_dt: -1.0, ..SimConfig::default() };
        assert_eq!(no_dt.validate(), Err(ConfigError::MaxFrameDt(-1.0)));
    }

    #[test]
    fn test_sanitize_dt() {
        let config = SimConfig { max_frame_dt: 0.1, ..SimConfig::default() };
        assert_eq!(config.sanitize_dt(0.016), 0.016);
        assert_eq!(config.sanitize_dt(-0.5), 0.0);
        assert_eq!(config.sanitize_dt(f32::NAN), 0.0);
        assert_eq!(config.sanitize_dt(f32::INFINITY), 0.0);
        assert_eq!(config.sanitize_dt(3.0), 0.1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "batch_size": 5 }"#).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.num_angles, 36);
        assert_eq!(config.window_width, 1600.0);
    }
}
