//! A single bouncing, spinning sprite

use crate::math::{wrap_degrees, Vec2};
use rand::Rng;
use std::num::NonZeroUsize;

/// Kinematic state of one sprite.
///
/// Only the position and angle change every frame. Velocity components
/// change sign on a wall bounce; spin and image choice never change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteUnit {
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    angular_velocity: f32,
    image_index: usize,
}

impl SpriteUnit {
    pub fn new(position: Vec2, velocity: Vec2, angular_velocity: f32, image_index: usize) -> Self {
        Self {
            position,
            velocity,
            angle: 0.0,
            angular_velocity,
            image_index,
        }
    }

    /// A sprite at `position` with velocity and spin drawn uniformly from
    /// `[-speed, speed)` and a uniformly chosen image.
    ///
    /// `speed` must be positive.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        position: Vec2,
        speed: f32,
        image_count: NonZeroUsize,
    ) -> Self {
        let velocity = Vec2::new(rng.gen_range(-speed..speed), rng.gen_range(-speed..speed));
        let angular_velocity = rng.gen_range(-speed..speed);
        let image_index = rng.gen_range(0..image_count.get());
        Self::new(position, velocity, angular_velocity, image_index)
    }

    /// Integrate one frame of `dt` seconds inside `[0, bounds]`.
    ///
    /// The position is moved first and the velocity reflected afterwards,
    /// so a sprite can sit up to one frame's displacement past a wall. A
    /// component only flips while the sprite is outside and still heading
    /// away, which keeps it to one flip per crossing.
    #[inline]
    pub fn update(&mut self, dt: f32, bounds: Vec2) {
        self.angle += self.angular_velocity * dt;
        self.position += self.velocity * dt;

        if heading_out(self.position.x, self.velocity.x, bounds.x) {
            self.velocity.x = -self.velocity.x;
        }
        if heading_out(self.position.y, self.velocity.y, bounds.y) {
            self.velocity.y = -self.velocity.y;
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Unwrapped angle accumulator in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Angle in `[0, 360)` as used for drawing and cache lookup.
    pub fn render_angle(&self) -> f32 {
        wrap_degrees(self.angle)
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }
}

#[inline]
fn heading_out(pos: f32, vel: f32, max: f32) -> bool {
    (pos < 0.0 && vel < 0.0) || (pos > max && vel > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BOUNDS: Vec2 = Vec2::new(100.0, 50.0);

    #[test]
    fn test_update_integrates_position_and_angle() {
        let mut sprite = SpriteUnit::new(Vec2::new(10.0, 10.0), Vec2::new(20.0, -10.0), 90.0, 0);
        sprite.update(0.5, BOUNDS);

        assert_eq!(sprite.position(), Vec2::new(20.0, 5.0));
        assert_eq!(sprite.angle(), 45.0);
        assert_eq!(sprite.velocity(), Vec2::new(20.0, -10.0));
    }

    #[test]
    fn test_angle_accumulates_unwrapped() {
        let mut sprite = SpriteUnit::new(Vec2::new(50.0, 25.0), Vec2::ZERO, 300.0, 0);
        sprite.update(1.0, BOUNDS);
        sprite.update(1.0, BOUNDS);

        assert_eq!(sprite.angle(), 600.0);
        assert_eq!(sprite.render_angle(), 240.0);
    }

    #[test]
    fn test_bounce_overshoots_then_flips() {
        let mut sprite = SpriteUnit::new(Vec2::new(98.0, 25.0), Vec2::new(10.0, 0.0), 0.0, 0);
        sprite.update(0.5, BOUNDS);

        // Position is not corrected, only the velocity reflects.
        assert_eq!(sprite.position().x, 103.0);
        assert_eq!(sprite.velocity().x, -10.0);
    }

    #[test]
    fn test_bounce_flips_once_per_crossing() {
        // One big step leaves the sprite well outside the wall.
        let mut sprite = SpriteUnit::new(Vec2::new(95.0, 25.0), Vec2::new(40.0, 0.0), 0.0, 0);
        sprite.update(0.5, BOUNDS);
        assert_eq!(sprite.position().x, 115.0);
        assert_eq!(sprite.velocity().x, -40.0);

        // Still outside next frame, but already heading back: no second flip.
        sprite.update(0.25, BOUNDS);
        assert_eq!(sprite.position().x, 105.0);
        assert_eq!(sprite.velocity().x, -40.0);

        sprite.update(0.25, BOUNDS);
        assert_eq!(sprite.position().x, 95.0);
        assert_eq!(sprite.velocity().x, -40.0);
    }

    #[test]
    fn test_bounce_on_low_edges() {
        let mut sprite = SpriteUnit::new(Vec2::new(1.0, 1.0), Vec2::new(-4.0, -4.0), 0.0, 0);
        sprite.update(1.0, BOUNDS);
        assert_eq!(sprite.velocity(), Vec2::new(4.0, 4.0));
    }

    #[test]
    fn test_zero_dt_is_identity() {
        let before = SpriteUnit::new(Vec2::new(30.0, 30.0), Vec2::new(5.0, 5.0), 12.0, 2);
        let mut after = before;
        after.update(0.0, BOUNDS);
        assert_eq!(before, after);
    }

    #[test]
    fn test_spawn_respects_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let images = NonZeroUsize::new(3).unwrap();

        for _ in 0..1000 {
            let sprite = SpriteUnit::spawn(&mut rng, Vec2::new(4.0, 2.0), 50.0, images);
            assert_eq!(sprite.position(), Vec2::new(4.0, 2.0));
            assert_eq!(sprite.angle(), 0.0);
            assert!((-50.0..50.0).contains(&sprite.velocity().x));
            assert!((-50.0..50.0).contains(&sprite.velocity().y));
            assert!((-50.0..50.0).contains(&sprite.angular_velocity()));
            assert!(sprite.image_index() < 3);
        }
    }
}
