use std::f32::consts::TAU;

use fastrand::Rng;
use glam::{Vec2, Vec3};

/// Uniform value in `[min, max)`; returns `min` for an empty range.
pub fn random_f32_range(rng: &mut Rng, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range < f32::EPSILON {
        return min;
    }
    min + rng.f32() * range
}

/// Uniform value in `[-half, half)`.
pub fn random_signed(rng: &mut Rng, half: f32) -> f32 {
    random_f32_range(rng, -half, half)
}

/// Each component uniform in `[-half, half)`.
pub fn random_vec3_signed(rng: &mut Rng, half: f32) -> Vec3 {
    Vec3::new(
        random_signed(rng, half),
        random_signed(rng, half),
        random_signed(rng, half),
    )
}

/// Uniformly distributed point inside a disk of `radius`.
pub fn random_in_disk(rng: &mut Rng, radius: f32) -> Vec2 {
    if radius <= 0.0 {
        return Vec2::ZERO;
    }
    let angle = rng.f32() * TAU;
    let r = radius * rng.f32().sqrt();
    Vec2::new(angle.cos(), angle.sin()) * r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_returns_min() {
        let mut rng = Rng::with_seed(7);
        assert_eq!(random_f32_range(&mut rng, 0.1, 0.1), 0.1);
    }

    #[test]
    fn disk_points_stay_inside() {
        let mut rng = Rng::with_seed(11);
        for _ in 0..500 {
            assert!(random_in_disk(&mut rng, 1.75).length() <= 1.75 + 1e-5);
        }
        assert_eq!(random_in_disk(&mut rng, 0.0), Vec2::ZERO);
    }
}
