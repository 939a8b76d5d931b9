use std::sync::Arc;

use fastrand::Rng;
use glam::Vec3;

use crate::config::{Color, SceneConfig};
use crate::resources::geometry::Geometry;
use crate::resources::primitives::{PolyhedronKind, SphereOptions, create_polyhedron, create_sphere};
use crate::utils::random::{random_f32_range, random_in_disk, random_signed, random_vec3_signed};

/// Opacity as a fraction of remaining life.
const OPACITY_PER_LIFE: f32 = 0.85;
/// Simulation time advanced per second of frame time.
const TIME_SCALE: f32 = 0.6;
const SWIRL_FREQUENCY: f32 = 1.8;
const SWIRL_AMPLITUDE: f32 = 0.0008;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleShape {
    Sphere,
    Tetrahedron,
    Octahedron,
}

impl ParticleShape {
    pub const ALL: [ParticleShape; 3] = [
        ParticleShape::Sphere,
        ParticleShape::Tetrahedron,
        ParticleShape::Octahedron,
    ];
}

/// One geometry per shape, shared by every particle of that shape.
#[derive(Debug, Clone)]
pub struct ParticleShapes {
    pub sphere: Arc<Geometry>,
    pub tetrahedron: Arc<Geometry>,
    pub octahedron: Arc<Geometry>,
}

impl ParticleShapes {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sphere: Arc::new(create_sphere(&SphereOptions {
                radius: 0.05,
                width_segments: 6,
                height_segments: 6,
            })),
            tetrahedron: Arc::new(create_polyhedron(PolyhedronKind::Tetrahedron, 0.04)),
            octahedron: Arc::new(create_polyhedron(PolyhedronKind::Octahedron, 0.045)),
        }
    }

    #[must_use]
    pub fn get(&self, shape: ParticleShape) -> &Arc<Geometry> {
        match shape {
            ParticleShape::Sphere => &self.sphere,
            ParticleShape::Tetrahedron => &self.tetrahedron,
            ParticleShape::Octahedron => &self.octahedron,
        }
    }
}

impl Default for ParticleShapes {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSettings {
    /// Upper bound on live particles and on the arena.
    pub max_particles: usize,
    /// Particles allocated into the reserve up front.
    pub warm_up: usize,
    /// Life lost per tick before jitter.
    pub base_decay: f32,
    /// Extra decay drawn uniformly from `[0, decay_jitter)`.
    pub decay_jitter: f32,
    pub color: Color,
    /// Hue offset drawn uniformly from `[-hue_jitter, hue_jitter)`, in turns.
    pub hue_jitter: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            max_particles: 250,
            warm_up: 100,
            base_decay: 0.005,
            decay_jitter: 0.003,
            color: Color::from_hex(0xff45_00),
            hue_jitter: 0.05,
        }
    }
}

impl ParticleSettings {
    #[must_use]
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            max_particles: config.particle_count,
            base_decay: config.particle_decay_rate,
            color: config.particle_color,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
    pub rotation_speed: Vec3,
    pub scale: f32,
    /// Remaining life, starts at 1.
    pub life: f32,
    pub decay: f32,
    pub opacity: f32,
    pub shape: ParticleShape,
    /// Linear tint.
    pub color: Vec3,
    pub active: bool,
}

impl Particle {
    fn dormant(shape: ParticleShape) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            rotation_speed: Vec3::ZERO,
            scale: 1.0,
            life: 0.0,
            decay: 0.0,
            opacity: 0.0,
            shape,
            color: Vec3::ONE,
            active: false,
        }
    }
}

/// Arena of particles split into live and reserve index lists.
///
/// `live.len() + reserve.len() == allocated()` always holds, and
/// `allocated()` never exceeds `max_particles`.
#[derive(Debug)]
pub struct ParticlePool {
    settings: ParticleSettings,
    particles: Vec<Particle>,
    live: Vec<usize>,
    reserve: Vec<usize>,
    high_water_mark: usize,
    time: f32,
    rng: Rng,
}

impl ParticlePool {
    #[must_use]
    pub fn new(settings: ParticleSettings, seed: u64) -> Self {
        let mut pool = Self {
            settings,
            particles: Vec::with_capacity(settings.max_particles),
            live: Vec::with_capacity(settings.max_particles),
            reserve: Vec::with_capacity(settings.max_particles),
            high_water_mark: 0,
            time: 0.0,
            rng: Rng::with_seed(seed),
        };

        let warm_up = settings.warm_up.min(settings.max_particles);
        for _ in 0..warm_up {
            let index = pool.allocate();
            pool.reserve.push(index);
        }
        log::debug!("Particle pool warmed up with {warm_up} particles");
        pool
    }

    fn allocate(&mut self) -> usize {
        let shape = ParticleShape::ALL[self.rng.usize(..ParticleShape::ALL.len())];
        self.particles.push(Particle::dormant(shape));
        self.high_water_mark = self.high_water_mark.max(self.particles.len());
        self.particles.len() - 1
    }

    #[must_use]
    pub fn settings(&self) -> &ParticleSettings {
        &self.settings
    }

    /// Requests `count` particles around `origin`. Requests beyond the live
    /// limit are dropped.
    pub fn spawn(&mut self, origin: Vec3, scatter_radius: f32, count: usize) {
        for _ in 0..count {
            if self.live.len() >= self.settings.max_particles {
                return;
            }
            let index = match self.reserve.pop() {
                Some(index) => index,
                None if self.particles.len() < self.settings.max_particles => self.allocate(),
                None => return,
            };
            self.activate(index, origin, scatter_radius);
            self.live.push(index);
        }
    }

    fn activate(&mut self, index: usize, origin: Vec3, scatter_radius: f32) {
        let rng = &mut self.rng;
        let settings = &self.settings;

        let offset = random_in_disk(rng, scatter_radius);
        let scale = random_f32_range(rng, 0.6, 1.3);
        let rotation = Vec3::new(
            random_f32_range(rng, 0.0, std::f32::consts::TAU),
            random_f32_range(rng, 0.0, std::f32::consts::TAU),
            random_f32_range(rng, 0.0, std::f32::consts::TAU),
        );
        let rotation_speed = random_vec3_signed(rng, 0.0075);
        let velocity = random_vec3_signed(rng, 0.006) + Vec3::new(0.0, -0.002, -0.006);
        let decay = settings.base_decay + random_f32_range(rng, 0.0, settings.decay_jitter);
        let opacity = random_f32_range(rng, 0.0, 0.9);
        let hue = random_signed(rng, settings.hue_jitter);
        let color = settings.color.offset_hue(hue).to_linear();

        let Some(particle) = self.particles.get_mut(index) else {
            return;
        };
        particle.position = origin + offset.extend(0.0);
        particle.velocity = velocity;
        particle.rotation = rotation;
        particle.rotation_speed = rotation_speed;
        particle.scale = scale;
        particle.life = 1.0;
        particle.decay = decay;
        particle.opacity = opacity;
        particle.color = color;
        particle.active = true;
    }

    /// Applies one decay step to every live particle and retires the ones
    /// whose life reached zero. Returns how many were retired.
    pub fn tick(&mut self, dt: f32) -> usize {
        let t = self.time;
        let mut retired = 0;

        let mut i = 0;
        while i < self.live.len() {
            let index = self.live[i];
            let Some(particle) = self.particles.get_mut(index) else {
                self.live.swap_remove(i);
                continue;
            };

            particle.life -= particle.decay;
            particle.opacity = particle.life * OPACITY_PER_LIFE;
            particle.position += particle.velocity;
            particle.position.x += (t * SWIRL_FREQUENCY + particle.position.y).cos() * SWIRL_AMPLITUDE;
            particle.rotation += particle.rotation_speed;

            if particle.life <= 0.0 {
                particle.active = false;
                particle.opacity = 0.0;
                self.live.swap_remove(i);
                self.reserve.push(index);
                retired += 1;
            } else {
                i += 1;
            }
        }

        self.time += dt * TIME_SCALE;
        retired
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn reserve_count(&self) -> usize {
        self.reserve.len()
    }

    /// Particles ever created, live or not.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &Particle> {
        self.live.iter().filter_map(|&i| self.particles.get(i))
    }

    /// Returns every live particle to the reserve.
    pub fn clear(&mut self) {
        for index in self.live.drain(..) {
            if let Some(particle) = self.particles.get_mut(index) {
                particle.active = false;
                particle.opacity = 0.0;
            }
            self.reserve.push(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_up_is_clamped_to_limit() {
        let pool = ParticlePool::new(
            ParticleSettings {
                max_particles: 10,
                ..ParticleSettings::default()
            },
            1,
        );
        assert_eq!(pool.allocated(), 10);
        assert_eq!(pool.reserve_count(), 10);
    }
}
