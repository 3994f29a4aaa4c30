//! Math utilities
//!
//! Re-exports glam with the angle helpers the sprite code needs

pub use glam::*;

/// Wrap an unbounded angle accumulator into `[0, 360)` degrees.
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Discretize an angle into one of `num_angles` equal slots covering a turn.
///
/// `bucket = floor(num_angles * (angle mod 360) / 360)`, clamped to the last
/// slot so float rounding can never produce `num_angles`.
#[inline]
pub fn angle_bucket(angle: f32, num_angles: u32) -> u32 {
    if num_angles == 0 {
        return 0;
    }
    let slot = (num_angles as f32 * wrap_degrees(angle) / 360.0).floor() as u32;
    slot.min(num_angles - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
        assert!(wrap_degrees(-1e-6) < 360.0);
    }

    #[test]
    fn test_angle_bucket_boundaries() {
        assert_eq!(angle_bucket(0.0, 36), 0);
        assert_eq!(angle_bucket(9.99, 36), 0);
        assert_eq!(angle_bucket(10.0, 36), 1);
        assert_eq!(angle_bucket(359.99, 36), 35);
        assert_eq!(angle_bucket(360.0, 36), 0);
        assert_eq!(angle_bucket(-5.0, 36), 35);
        // Rounds to a full turn in f32, which is slot 0 again.
        assert_eq!(angle_bucket(-1e-6, 36), 0);
    }

    #[test]
    fn test_angle_bucket_single_slot() {
        assert_eq!(angle_bucket(123.0, 1), 0);
        assert_eq!(angle_bucket(-720.5, 1), 0);
    }
}
