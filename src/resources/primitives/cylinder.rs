use std::f32::consts::TAU;

use crate::resources::geometry::Geometry;

/// Open-ended tapered cylinder along Y, centred on the origin.
pub struct CylinderOptions {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
}

impl Default for CylinderOptions {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 16,
        }
    }
}

#[must_use]
pub fn create_cylinder(options: &CylinderOptions) -> Geometry {
    let segments = options.radial_segments.max(3);
    let half_height = options.height * 0.5;
    // Slope of the side wall, folded into the normal's y component
    let slope = (options.radius_bottom - options.radius_top) / options.height.max(f32::EPSILON);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for (row, (y, radius)) in [
        (half_height, options.radius_top),
        (-half_height, options.radius_bottom),
    ]
    .into_iter()
    .enumerate()
    {
        for x in 0..=segments {
            let u = x as f32 / segments as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            positions.push([radius * sin, y, radius * cos]);
            let n = glam::Vec3::new(sin, slope, cos).normalize();
            normals.push(n.to_array());
            uvs.push([u, 1.0 - row as f32]);
        }
    }

    let stride = segments + 1;
    for x in 0..segments {
        let a = x;
        let b = x + stride;
        let c = x + stride + 1;
        let d = x + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    super::assemble(&positions, &normals, &uvs, &indices)
}
