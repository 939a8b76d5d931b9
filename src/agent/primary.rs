use fastrand::Rng;
use glam::{Quat, Vec2, Vec3};

use crate::config::SceneConfig;
use crate::resources::input::Input;
use crate::utils::random::random_f32_range;

use super::template::{AgentInstance, AgentTemplate, REFERENCE_SCALE};

/// Pointer moves older than this no longer count as "moving".
pub const MOVE_RECENCY: f32 = 0.08;
/// Minimum gap between two particle bursts, in seconds.
pub const EMIT_INTERVAL: f32 = 0.1;
pub const EMIT_MOVEMENT_THRESHOLD: f32 = 0.005;
pub const EMIT_SCATTER_RADIUS: f32 = 1.75;
const TILT_DECAY: f32 = 0.95;
/// Floor for the bob divisor when a config skipped validation.
const MIN_FOLLOW_SPEED: f32 = 0.01;

/// Tunables of the primary agent, lifted out of [`SceneConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentBehavior {
    pub follow_speed: f32,
    pub eye_glow_decay: f32,
    pub eye_glow_response: f32,
    pub movement_threshold: f32,
    pub wobble_amount: f32,
    pub float_speed: f32,
    pub pulse_speed: f32,
    pub pulse_intensity: f32,
    pub emissive_intensity: f32,
    pub target_extent: Vec2,
    pub creation_rate: u32,
    pub only_when_moving: bool,
}

impl AgentBehavior {
    #[must_use]
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            follow_speed: config.follow_speed,
            eye_glow_decay: config.eye_glow_decay,
            eye_glow_response: config.eye_glow_response,
            movement_threshold: config.movement_threshold,
            wobble_amount: config.wobble_amount,
            float_speed: config.float_speed,
            pulse_speed: config.pulse_speed,
            pulse_intensity: config.pulse_intensity,
            emissive_intensity: config.emissive_intensity,
            target_extent: config.target_extent,
            creation_rate: config.particle_creation_rate,
            only_when_moving: config.particles_only_when_moving,
        }
    }
}

impl Default for AgentBehavior {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

/// The pointer state one agent update reads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub ndc: Vec2,
    /// Length of the last NDC step.
    pub speed: f32,
    pub moved_recently: bool,
}

impl PointerSample {
    #[must_use]
    pub fn from_input(input: &Input) -> Self {
        Self {
            ndc: input.pointer_ndc(),
            speed: input.pointer_speed(),
            moved_recently: input.moved_within(MOVE_RECENCY),
        }
    }
}

/// A burst the particle pool should spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitRequest {
    pub origin: Vec3,
    pub scatter_radius: f32,
    pub count: usize,
}

/// The pointer-reactive agent.
#[derive(Debug, Clone)]
pub struct PrimaryAgent {
    pub instance: AgentInstance,
    pub behavior: AgentBehavior,
    start_position: Vec3,
    target: Vec3,
    current_movement: f32,
    eye_opacity: f32,
    /// Filtered tilt about x and z.
    tilt: Vec2,
    last_emit: Option<f32>,
    rng: Rng,
}

impl PrimaryAgent {
    #[must_use]
    pub fn new(template: &AgentTemplate, config: &SceneConfig, seed: u64) -> Self {
        let instance = AgentInstance::new(template, Vec3::ZERO, config.scale / REFERENCE_SCALE);
        Self::with_behavior(instance, AgentBehavior::from_config(config), seed)
    }

    #[must_use]
    pub fn with_behavior(instance: AgentInstance, behavior: AgentBehavior, seed: u64) -> Self {
        let start_position = instance.position();
        Self {
            instance,
            behavior,
            start_position,
            target: start_position,
            current_movement: 0.0,
            eye_opacity: 0.0,
            tilt: Vec2::ZERO,
            last_emit: None,
            rng: Rng::with_seed(seed),
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.instance.position()
    }

    /// Teleports the agent without registering movement.
    pub fn set_position(&mut self, position: Vec3) {
        self.instance.transform.position = position;
    }

    #[must_use]
    pub fn start_position(&self) -> Vec3 {
        self.start_position
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[must_use]
    pub fn current_movement(&self) -> f32 {
        self.current_movement
    }

    #[must_use]
    pub fn eye_opacity(&self) -> f32 {
        self.eye_opacity
    }

    /// World-space point the pointer maps to.
    #[must_use]
    pub fn target_for(&self, ndc: Vec2) -> Vec3 {
        (ndc * self.behavior.target_extent).extend(self.start_position.z)
    }

    /// One frame of pointer tracking.
    ///
    /// `time` is simulation time, `elapsed` wall-clock seconds (used for
    /// the emission throttle).
    pub fn update(&mut self, pointer: &PointerSample, time: f32, elapsed: f32) -> Option<EmitRequest> {
        let target = self.target_for(pointer.ndc);
        self.track(target, pointer, time, elapsed)
    }

    /// Like [`update`](Self::update) with an explicit target.
    pub fn track(&mut self, target: Vec3, pointer: &PointerSample, time: f32, elapsed: f32) -> Option<EmitRequest> {
        self.target = target;
        let movement = self.step_towards(target);

        let decay = self.behavior.eye_glow_decay;
        self.current_movement = self.current_movement * decay + movement * (1.0 - decay);

        self.update_eye_glow();
        self.deform(time);
        self.emit(pointer, elapsed)
    }

    /// Exponential follow step. Returns the distance moved.
    pub fn step_towards(&mut self, target: Vec3) -> f32 {
        let previous = self.instance.transform.position;
        let next = previous + (target - previous) * self.behavior.follow_speed;
        self.instance.transform.position = next;
        previous.distance(next)
    }

    fn update_eye_glow(&mut self) {
        let moving = self.current_movement > self.behavior.movement_threshold;
        let (goal, rate) = if moving {
            (1.0, self.behavior.eye_glow_response * 2.0)
        } else {
            (0.0, self.behavior.eye_glow_response)
        };
        self.eye_opacity += (goal - self.eye_opacity) * rate.min(1.0);
        self.instance.set_eye_glow(self.eye_opacity);
    }

    fn deform(&mut self, time: f32) {
        let b = &self.behavior;
        let position = self.instance.transform.position;
        let dir = (self.target.truncate() - position.truncate()).normalize_or_zero();

        let lean = 0.1 * b.wobble_amount * 0.05;
        self.tilt.x = self.tilt.x * TILT_DECAY + dir.y * lean;
        self.tilt.y = self.tilt.y * TILT_DECAY - dir.x * lean;
        let sway = (time * 1.4).sin() * 0.05 * b.wobble_amount;
        self.instance.body.rotation = Quat::from_euler(glam::EulerRot::XYZ, self.tilt.x, sway, self.tilt.y);

        let pulse = (time * b.pulse_speed).sin() * b.pulse_intensity;
        let breathe = (1.0 + (time * 2.1).sin() * 0.025 * b.wobble_amount + pulse * 0.015)
            * (1.0 + (time * 0.8).sin() * 0.012);
        self.instance.body.scale = Vec3::splat(breathe);

        let fs = b.float_speed;
        let bob = (time * fs * 1.5).sin() * 0.03 + (time * fs * 0.7).cos() * 0.018 + (time * fs * 2.3).sin() * 0.008;
        // Steady-state displacement of a per-frame bob under exponential follow.
        self.instance.float_offset = Vec3::new(0.0, bob / b.follow_speed.max(MIN_FOLLOW_SPEED), 0.0);

        self.instance.body_material.emissive_intensity = b.emissive_intensity + pulse + (time * 0.6).sin() * 0.12;
    }

    fn emit(&mut self, pointer: &PointerSample, elapsed: f32) -> Option<EmitRequest> {
        if self.current_movement <= EMIT_MOVEMENT_THRESHOLD {
            return None;
        }
        if self.behavior.only_when_moving && !pointer.moved_recently {
            return None;
        }
        if self.last_emit.is_some_and(|last| elapsed - last <= EMIT_INTERVAL) {
            return None;
        }
        self.last_emit = Some(elapsed);

        let burst = ((pointer.speed * 8.0 * 3.0).floor() as usize).max(1);
        let count = burst.min(self.behavior.creation_rate as usize);

        let back = 0.8 + random_f32_range(&mut self.rng, 0.0, 0.6);
        Some(EmitRequest {
            origin: self.position() + Vec3::new(0.0, -0.8, -back),
            scatter_radius: EMIT_SCATTER_RADIUS,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_at_least_one_and_capped() {
        let template = AgentTemplate::from_config(&SceneConfig::default());
        let mut agent = PrimaryAgent::new(&template, &SceneConfig::default(), 1);
        let pointer = PointerSample {
            ndc: Vec2::new(1.0, 0.0),
            speed: 10.0,
            moved_recently: true,
        };
        let request = agent.update(&pointer, 0.0, 0.0).expect("first move emits");
        assert_eq!(request.count, 5);
        assert!(agent.update(&pointer, 0.01, 0.05).is_none());
    }
}
