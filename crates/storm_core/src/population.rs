//! The live sprite population
//!
//! An ordered `Vec` of sprites. Order only matters for drawing (later sprites
//! overlap earlier ones) and for removal, which is LIFO: the newest batch
//! goes first.

use crate::config::{ConfigError, SimConfig};
use crate::math::Vec2;
use crate::render::{Renderer, RendererError};
use crate::rotation::RotationStrategy;
use crate::sprite::SpriteUnit;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::num::NonZeroUsize;
use tracing::debug;

pub struct SpritePopulation<R = StdRng> {
    config: SimConfig,
    image_count: NonZeroUsize,
    sprites: Vec<SpriteUnit>,
    rng: R,
}

impl SpritePopulation<StdRng> {
    /// A population of one sprite at the window center, seeded from the OS.
    pub fn new(config: SimConfig, image_count: NonZeroUsize) -> Result<Self, ConfigError> {
        Self::with_rng(config, image_count, StdRng::from_entropy())
    }
}

impl<R: Rng> SpritePopulation<R> {
    /// A population of one sprite at the window center.
    ///
    /// Fails if `config` does not pass [`SimConfig::validate`]; spawning
    /// needs a positive, finite speed bound.
    pub fn with_rng(config: SimConfig, image_count: NonZeroUsize, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut population = Self {
            config,
            image_count,
            sprites: Vec::new(),
            rng,
        };
        let center = population.config.center();
        population.add(center.x, center.y, 1);
        Ok(population)
    }

    /// Append `count` freshly randomized sprites at `(x, y)`.
    pub fn add(&mut self, x: f32, y: f32, count: usize) {
        let position = Vec2::new(x, y);
        let speed = self.config.speed;
        let image_count = self.image_count;
        let rng = &mut self.rng;

        self.sprites.reserve(count);
        self.sprites
            .extend((0..count).map(|_| SpriteUnit::spawn(&mut *rng, position, speed, image_count)));

        debug!(x, y, added = count, total = self.sprites.len(), "sprites added");
    }

    /// Add one configured batch at `(x, y)`.
    pub fn add_batch(&mut self, x: f32, y: f32) {
        self.add(x, y, self.config.batch_size);
    }
}

impl<R> SpritePopulation<R> {
    /// Remove up to `count` of the most recently added sprites.
    ///
    /// Returns how many were removed; an empty population stays empty.
    pub fn remove(&mut self, count: usize) -> usize {
        let keep = self.sprites.len().saturating_sub(count);
        let removed = self.sprites.len() - keep;
        self.sprites.truncate(keep);

        debug!(removed, total = self.sprites.len(), "sprites removed");
        removed
    }

    /// Remove one configured batch.
    pub fn remove_batch(&mut self) -> usize {
        self.remove(self.config.batch_size)
    }

    /// Advance every sprite by `dt` seconds.
    ///
    /// `dt` goes through [`SimConfig::sanitize_dt`] first. Sprites never read
    /// each other, so the parallel path needs no locking; it returns only
    /// once every sprite is updated.
    pub fn update(&mut self, dt: f32) {
        let dt = self.config.sanitize_dt(dt);
        if dt == 0.0 {
            return;
        }

        let bounds = self.config.bounds();
        if self.config.parallel_update {
            self.sprites
                .par_iter_mut()
                .for_each(|sprite| sprite.update(dt, bounds));
        } else {
            for sprite in &mut self.sprites {
                sprite.update(dt, bounds);
            }
        }
    }

    /// Send every sprite to the renderer in population order.
    ///
    /// Read-only with respect to the simulation.
    pub fn draw<D: Renderer + ?Sized>(
        &self,
        renderer: &mut D,
        strategy: &RotationStrategy,
    ) -> Result<(), RendererError> {
        for sprite in &self.sprites {
            let image_index = sprite.image_index();
            let (image, angle) = strategy
                .resolve(image_index, sprite.render_angle())
                .ok_or(RendererError::MissingVariant { image_index })?;
            renderer.draw_image(image, sprite.position(), angle)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn sprites(&self) -> &[SpriteUnit] {
        &self.sprites
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpriteUnit> {
        self.sprites.iter()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

}
