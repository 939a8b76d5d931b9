use std::f32::consts::TAU;

use glam::Vec3;

use crate::resources::geometry::Geometry;

/// Torus lying in the XY plane around the Z axis.
pub struct TorusOptions {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
}

impl Default for TorusOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube: 0.4,
            radial_segments: 12,
            tubular_segments: 48,
        }
    }
}

#[must_use]
pub fn create_torus(options: &TorusOptions) -> Geometry {
    let radial = options.radial_segments.max(3);
    let tubular = options.tubular_segments.max(3);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for j in 0..=radial {
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let v = j as f32 / radial as f32 * TAU;

            let vertex = Vec3::new(
                (options.radius + options.tube * v.cos()) * u.cos(),
                (options.radius + options.tube * v.cos()) * u.sin(),
                options.tube * v.sin(),
            );
            let center = Vec3::new(options.radius * u.cos(), options.radius * u.sin(), 0.0);

            positions.push(vertex.to_array());
            normals.push((vertex - center).normalize_or_zero().to_array());
            uvs.push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    for j in 1..=radial {
        for i in 1..=tubular {
            let a = (tubular + 1) * j + i - 1;
            let b = (tubular + 1) * (j - 1) + i - 1;
            let c = (tubular + 1) * (j - 1) + i;
            let d = (tubular + 1) * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    super::assemble(&positions, &normals, &uvs, &indices)
}
