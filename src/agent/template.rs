use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::config::{Color, SceneConfig};
use crate::procedural::agent_body::{BodyShape, agent_body};
use crate::resources::geometry::Geometry;
use crate::resources::material::{BlendMode, MaterialParams};
use crate::resources::primitives::{SphereOptions, create_sphere};
use crate::scene::DrawItem;
use crate::scene::transform::Transform;

/// Config `scale` that renders the agent at its modelled size.
pub const REFERENCE_SCALE: f32 = 2.4;

pub const SOCKET_OFFSETS: [Vec3; 2] = [Vec3::new(-0.7, 0.6, 1.9), Vec3::new(0.7, 0.6, 1.9)];
pub const SOCKET_SCALE: Vec3 = Vec3::new(1.1, 1.0, 0.6);
pub const EYE_OFFSETS: [Vec3; 2] = [Vec3::new(-0.7, 0.6, 2.0), Vec3::new(0.7, 0.6, 2.0)];
pub const GLOW_OFFSETS: [Vec3; 2] = [Vec3::new(-0.7, 0.6, 1.95), Vec3::new(0.7, 0.6, 1.95)];

/// Geometry and base materials every agent instance shares.
#[derive(Debug, Clone)]
pub struct AgentTemplate {
    pub body: Arc<Geometry>,
    pub socket: Arc<Geometry>,
    pub eye: Arc<Geometry>,
    pub outer_glow: Arc<Geometry>,

    pub body_material: MaterialParams,
    pub socket_material: MaterialParams,
    pub eye_material: MaterialParams,
    pub glow_material: MaterialParams,
}

impl AgentTemplate {
    #[must_use]
    pub fn from_config(config: &SceneConfig) -> Self {
        let sphere = |radius: f32, segments: u32| {
            Arc::new(create_sphere(&SphereOptions {
                radius,
                width_segments: segments,
                height_segments: segments,
            }))
        };

        Self {
            body: Arc::new(agent_body(&BodyShape::default())),
            socket: sphere(0.45, 16),
            eye: sphere(0.3, 12),
            outer_glow: sphere(0.525, 12),

            body_material: MaterialParams::lit(config.body_color)
                .with_emissive(config.glow_color, config.emissive_intensity)
                .with_opacity(config.opacity)
                .double_sided(),
            socket_material: MaterialParams::unlit(Color::BLACK),
            eye_material: MaterialParams::unlit(config.eye_glow_color)
                .with_emissive(config.eye_glow_color, config.eye_glow_intensity)
                .with_blend(BlendMode::Transparent)
                .with_opacity(0.0),
            glow_material: MaterialParams::unlit(config.eye_glow_color)
                .with_blend(BlendMode::Transparent)
                .with_opacity(0.0)
                .double_sided(),
        }
    }
}

/// Per-instance state over a shared template.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInstance {
    /// Tracked position, yaw and overall size.
    pub transform: Transform,
    /// Tilt, wobble and breathing of the body mesh only.
    pub body: Transform,
    /// Visual bob applied to the whole figure but never to `transform`.
    pub float_offset: Vec3,

    pub body_material: MaterialParams,
    pub eye_material: MaterialParams,
    pub glow_material: MaterialParams,
}

impl AgentInstance {
    #[must_use]
    pub fn new(template: &AgentTemplate, position: Vec3, scale: f32) -> Self {
        Self {
            transform: Transform::from_trs(position, Quat::IDENTITY, Vec3::splat(scale)),
            body: Transform::new(),
            float_offset: Vec3::ZERO,
            body_material: template.body_material,
            eye_material: template.eye_material,
            glow_material: template.glow_material,
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Sets eye opacity; the outer glow follows at 30 %.
    pub fn set_eye_glow(&mut self, opacity: f32) {
        self.eye_material.opacity = opacity;
        self.glow_material.opacity = opacity * 0.3;
    }

    pub fn draws(&self, template: &AgentTemplate, out: &mut Vec<DrawItem>) {
        let figure = Mat4::from(self.transform.compose()) * Mat4::from_translation(self.float_offset);

        out.push(DrawItem::new(
            Arc::clone(&template.body),
            self.body_material,
            figure * Mat4::from(self.body.compose()),
        ));

        for side in 0..2 {
            out.push(DrawItem::new(
                Arc::clone(&template.socket),
                template.socket_material,
                figure * Mat4::from_scale_rotation_translation(SOCKET_SCALE, Quat::IDENTITY, SOCKET_OFFSETS[side]),
            ));
            if self.eye_material.opacity > 0.0 {
                out.push(DrawItem::new(
                    Arc::clone(&template.eye),
                    self.eye_material,
                    figure * Mat4::from_translation(EYE_OFFSETS[side]),
                ));
                out.push(DrawItem::new(
                    Arc::clone(&template.outer_glow),
                    self.glow_material,
                    figure * Mat4::from_translation(GLOW_OFFSETS[side]),
                ));
            }
        }
    }
}
