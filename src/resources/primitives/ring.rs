use std::f32::consts::TAU;

use crate::resources::geometry::Geometry;

/// Flat annulus in the XY plane facing +Z.
pub struct RingOptions {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub theta_segments: u32,
}

impl Default for RingOptions {
    fn default() -> Self {
        Self {
            inner_radius: 0.5,
            outer_radius: 1.0,
            theta_segments: 32,
        }
    }
}

#[must_use]
pub fn create_ring(options: &RingOptions) -> Geometry {
    let segments = options.theta_segments.max(3);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for radius in [options.inner_radius, options.outer_radius] {
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let (x, y) = (radius * cos, radius * sin);
            positions.push([x, y, 0.0]);
            normals.push([0.0, 0.0, 1.0]);
            uvs.push([
                (x / options.outer_radius + 1.0) * 0.5,
                (y / options.outer_radius + 1.0) * 0.5,
            ]);
        }
    }

    let stride = segments + 1;
    for i in 0..segments {
        let inner = i;
        let outer = i + stride;
        indices.extend_from_slice(&[inner, outer, outer + 1, inner, outer + 1, inner + 1]);
    }

    super::assemble(&positions, &normals, &uvs, &indices)
}
