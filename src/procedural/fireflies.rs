use std::sync::Arc;

use fastrand::Rng;
use glam::{Mat4, Vec3};

use crate::config::Color;
use crate::resources::geometry::Geometry;
use crate::resources::material::{BlendMode, MaterialParams};
use crate::resources::primitives::{SphereOptions, create_sphere};
use crate::scene::DrawItem;
use crate::scene::light::Light;
use crate::utils::random::{random_f32_range, random_vec3_signed};

pub const FIREFLY_COUNT: usize = 20;
/// Per-axis bounds; velocity on an axis is reversed and halved beyond them.
pub const BOUNDS: Vec3 = Vec3::new(30.0, 20.0, 15.0);
const WANDER: f32 = 0.0005;
const LIGHT_RANGE: f32 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Firefly {
    pub position: Vec3,
    pub velocity: Vec3,
    pub phase: f32,
    pub pulse_speed: f32,
    /// Current pulse factor in `[0.2, 1.0]`.
    pub pulse: f32,
}

/// Wandering glow points of the Ghost scenario.
#[derive(Debug)]
pub struct FireflySwarm {
    pub fireflies: Vec<Firefly>,
    pub speed: f32,
    pub glow_intensity: f32,
    core: Arc<Geometry>,
    halo: Arc<Geometry>,
    rng: Rng,
}

impl FireflySwarm {
    #[must_use]
    pub fn new(count: usize, speed: f32, glow_intensity: f32, seed: u64) -> Self {
        let mut rng = Rng::with_seed(seed);
        let fireflies = (0..count)
            .map(|_| Firefly {
                position: random_vec3_signed(&mut rng, 1.0) * Vec3::new(20.0, 15.0, 10.0),
                velocity: random_vec3_signed(&mut rng, speed * 0.5),
                phase: random_f32_range(&mut rng, 0.0, std::f32::consts::TAU),
                pulse_speed: random_f32_range(&mut rng, 2.0, 5.0),
                pulse: 1.0,
            })
            .collect();

        Self {
            fireflies,
            speed,
            glow_intensity,
            core: Arc::new(create_sphere(&SphereOptions {
                radius: 0.02,
                width_segments: 4,
                height_segments: 3,
            })),
            halo: Arc::new(create_sphere(&SphereOptions {
                radius: 0.08,
                width_segments: 8,
                height_segments: 8,
            })),
            rng,
        }
    }

    pub fn update(&mut self, time: f32) {
        for firefly in &mut self.fireflies {
            firefly.pulse = ((time + firefly.phase) * firefly.pulse_speed).sin() * 0.4 + 0.6;

            firefly.velocity += random_vec3_signed(&mut self.rng, WANDER);
            firefly.velocity = firefly.velocity.clamp_length_max(self.speed);
            firefly.position += firefly.velocity;

            let outside = firefly.position.abs().cmpgt(BOUNDS);
            for axis in 0..3 {
                if outside.test(axis) {
                    firefly.velocity[axis] *= -0.5;
                }
            }
        }
    }

    pub fn lights(&self, out: &mut Vec<Light>) {
        let color = Color::from_hex(0xffff_44);
        out.extend(self.fireflies.iter().map(|f| {
            Light::point(color, self.glow_intensity * 0.8 * f.pulse, f.position, LIGHT_RANGE)
        }));
    }

    pub fn draws(&self, out: &mut Vec<DrawItem>) {
        for firefly in &self.fireflies {
            let model = Mat4::from_translation(firefly.position);
            let core = MaterialParams::unlit(Color::from_hex(0xffff_44))
                .with_opacity((self.glow_intensity * 0.9 * firefly.pulse).min(1.0))
                .with_blend(BlendMode::Additive);
            let halo = MaterialParams::unlit(Color::from_hex(0xffff_88))
                .with_opacity((self.glow_intensity * 0.4 * firefly.pulse).min(1.0))
                .with_blend(BlendMode::Additive)
                .double_sided();
            out.push(DrawItem::new(Arc::clone(&self.core), core, model));
            out.push(DrawItem::new(Arc::clone(&self.halo), halo, model));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_stays_clamped() {
        let mut swarm = FireflySwarm::new(FIREFLY_COUNT, 0.04, 2.6, 3);
        for frame in 0..600 {
            swarm.update(frame as f32 * 0.01);
        }
        assert!(swarm.fireflies.iter().all(|f| f.velocity.length() <= 0.04 + 1e-6));
    }
}
