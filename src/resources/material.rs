use glam::Vec3;

use crate::config::Color;

/// How a surface is shaded by the scene pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingModel {
    /// Lambert diffuse from the scene lights plus emissive.
    #[default]
    Lit,
    /// Flat color, ignores lights.
    Unlit,
    /// Full-screen darkening overlay whose opacity dips around the primary
    /// agent (see [`RevealOverlay`](crate::procedural::RevealOverlay)).
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    /// Premultiplied-style alpha blending, no depth writes.
    Transparent,
    /// Additive glow, no depth writes.
    Additive,
}

/// Per-instance material parameters.
///
/// Instances copy a template value and override fields in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    /// Linear base color.
    pub color: Vec3,
    /// Linear emissive color.
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub shading: ShadingModel,
    pub blend: BlendMode,
    pub double_sided: bool,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            emissive: Vec3::ZERO,
            emissive_intensity: 0.0,
            opacity: 1.0,
            shading: ShadingModel::Lit,
            blend: BlendMode::Opaque,
            double_sided: false,
        }
    }
}

impl MaterialParams {
    #[must_use]
    pub fn lit(color: Color) -> Self {
        Self {
            color: color.to_linear(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn unlit(color: Color) -> Self {
        Self {
            color: color.to_linear(),
            shading: ShadingModel::Unlit,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_emissive(mut self, emissive: Color, intensity: f32) -> Self {
        self.emissive = emissive.to_linear();
        self.emissive_intensity = intensity;
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        if self.blend == BlendMode::Opaque && opacity < 1.0 {
            self.blend = BlendMode::Transparent;
        }
        self
    }

    #[must_use]
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    #[must_use]
    pub fn with_shading(mut self, shading: ShadingModel) -> Self {
        self.shading = shading;
        self
    }

    #[must_use]
    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.blend != BlendMode::Opaque
    }
}
