//! Storm Asset Pipeline
//!
//! Finds the sprite bitmaps under a directory and loads each one exactly once
//! through the active renderer. Decoding belongs to the renderer; this crate
//! only decides *which* files and in *what order*.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use storm_core::{ImageHandle, Renderer, RendererError};
use thiserror::Error;
use tracing::{debug, info};

/// File extensions treated as sprite bitmaps (compared case-insensitively).
pub const SPRITE_EXTENSIONS: &[&str] = &["png", "bmp"];

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("asset directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("cannot read asset directory {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no sprite images found under {}", .0.display())]
    Empty(PathBuf),

    #[error("failed to decode {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: RendererError,
    },
}

/// The sprite images for a run, in a stable order.
///
/// Never empty: [`AssetSet::load`] refuses a directory without images, so
/// every sprite can pick an image index from `0..count()`.
#[derive(Debug)]
pub struct AssetSet {
    root: PathBuf,
    paths: Vec<PathBuf>,
    images: Vec<ImageHandle>,
    count: NonZeroUsize,
}

impl AssetSet {
    /// Recursively list sprite files under `dir`, sorted by path.
    pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, AssetLoadError> {
        if !dir.is_dir() {
            return Err(AssetLoadError::MissingDirectory(dir.to_path_buf()));
        }

        let mut found = Vec::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            let unreadable = |source| AssetLoadError::Unreadable {
                path: current.clone(),
                source,
            };

            for entry in fs::read_dir(&current).map_err(unreadable)? {
                let entry = entry.map_err(unreadable)?;
                let path = entry.path();
                let file_type = entry.file_type().map_err(unreadable)?;

                if file_type.is_dir() {
                    pending.push(path);
                } else if path.is_file() && is_sprite_file(&path) {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    /// Discover and load every sprite under `dir`.
    pub fn load<R: Renderer + ?Sized>(dir: &Path, renderer: &mut R) -> Result<Self, AssetLoadError> {
        let paths = Self::discover(dir)?;
        let count = NonZeroUsize::new(paths.len()).ok_or_else(|| AssetLoadError::Empty(dir.to_path_buf()))?;

        let mut images = Vec::with_capacity(paths.len());
        for path in &paths {
            let image = renderer.load_image(path).map_err(|source| AssetLoadError::Decode {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), ?image, size = ?renderer.image_size(image), "sprite loaded");
            images.push(image);
        }

        info!(dir = %dir.display(), count = images.len(), renderer = renderer.name(), "sprite images loaded");

        Ok(Self {
            root: dir.to_path_buf(),
            paths,
            images,
            count,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source files, parallel to [`AssetSet::images`].
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn images(&self) -> &[ImageHandle] {
        &self.images
    }

    pub fn count(&self) -> NonZeroUsize {
        self.count
    }
}

fn is_sprite_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SPRITE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}
