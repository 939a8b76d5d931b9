use glam::{Vec2, Vec3};

use crate::config::SceneConfig;

/// Size of the square overlay plane.
pub const OVERLAY_SIZE: f32 = 300.0;
/// Depth the overlay sits at.
pub const OVERLAY_DEPTH: f32 = -50.0;

/// Dark full-screen plane that turns transparent around the primary agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOverlay {
    pub radius: f32,
    pub fade_strength: f32,
    pub base_opacity: f32,
    pub reveal_opacity: f32,
    /// Agent position in the overlay's XY plane.
    pub center: Vec2,
    pub time: f32,
}

impl RevealOverlay {
    #[must_use]
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            radius: config.reveal_radius,
            fade_strength: config.fade_strength,
            base_opacity: config.base_opacity,
            reveal_opacity: config.reveal_opacity,
            center: Vec2::ZERO,
            time: 0.0,
        }
    }

    pub fn update(&mut self, time: f32, agent_position: Vec3) {
        self.time = time;
        self.center = agent_position.truncate();
    }

    /// Radius after the slow breathing pulse.
    #[must_use]
    pub fn dynamic_radius(&self) -> f32 {
        self.radius + (self.time * 2.0).sin() * 5.0
    }

    /// Overlay opacity at `point`, matching the fragment shader.
    #[must_use]
    pub fn opacity_at(&self, point: Vec2) -> f32 {
        let radius = self.dynamic_radius();
        let dist = point.distance(self.center);
        let reveal = smoothstep(radius * 0.2, radius, dist).powf(self.fade_strength);
        self.reveal_opacity + (self.base_opacity - self.reveal_opacity) * reveal
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
