use glam::Vec3;

use crate::config::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Light arriving along `direction` (pointing from the light).
    Directional { direction: Vec3 },
    Point { position: Vec3, range: f32 },
    Spot {
        position: Vec3,
        direction: Vec3,
        range: f32,
        /// Outer cone half-angle in radians.
        angle: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Linear color.
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self {
            color: color.to_linear(),
            intensity,
            kind: LightKind::Ambient,
        }
    }

    /// Directional light shining from `from` toward the origin.
    #[must_use]
    pub fn directional(color: Color, intensity: f32, from: Vec3) -> Self {
        Self {
            color: color.to_linear(),
            intensity,
            kind: LightKind::Directional {
                direction: (-from).normalize_or_zero(),
            },
        }
    }

    #[must_use]
    pub fn point(color: Color, intensity: f32, position: Vec3, range: f32) -> Self {
        Self {
            color: color.to_linear(),
            intensity,
            kind: LightKind::Point { position, range },
        }
    }

    #[must_use]
    pub fn spot(color: Color, intensity: f32, position: Vec3, target: Vec3, range: f32, angle: f32) -> Self {
        Self {
            color: color.to_linear(),
            intensity,
            kind: LightKind::Spot {
                position,
                direction: (target - position).normalize_or_zero(),
                range,
                angle,
            },
        }
    }
}

/// Exponential-squared fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub density: f32,
}

impl Fog {
    #[must_use]
    pub fn exp2(color: Color, density: f32) -> Self {
        Self {
            color: color.to_linear(),
            density,
        }
    }
}
