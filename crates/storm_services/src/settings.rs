//! Settings management
//!
//! A JSON document; every field is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use storm_core::{ConfigError, RotationMode, SimConfig};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {} is not valid", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Which renderer draws the sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// wgpu, rotation in the vertex shader.
    #[default]
    Gpu,
    /// CPU rasterizer presented in a window (or headless).
    Software,
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimConfig,
    pub assets_dir: PathBuf,
    pub backend: BackendKind,
    pub rotation: RotationMode,
    pub vsync: bool,
    /// Driver preference list such as `"vulkan,gl"`. `None` lets wgpu pick.
    pub gpu_backends: Option<String>,
    pub title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulation: SimConfig::default(),
            assets_dir: PathBuf::from("assets"),
            backend: BackendKind::Gpu,
            rotation: RotationMode::Direct,
            vsync: false,
            gpu_backends: None,
            title: "Sprite Storm".to_string(),
        }
    }
}

impl Settings {
    /// Read a settings file. The result is not validated yet.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.simulation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "backend": "software", "rotation": "cached", "simulation": { "batch_size": 50 } }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.backend, BackendKind::Software);
        assert_eq!(settings.rotation, RotationMode::Cached);
        assert_eq!(settings.simulation.batch_size, 50);
        assert_eq!(settings.simulation.speed, 400.0);
        assert_eq!(settings.assets_dir, PathBuf::from("assets"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ backend: gpu").unwrap();

        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_unknown_backend_name_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "backend": "raytraced" }"#).unwrap();

        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_invalid_simulation() {
        let mut settings = Settings::default();
        settings.simulation.num_angles = 0;

        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid(ConfigError::NumAngles))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            gpu_backends: Some("vulkan,gl".to_string()),
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
