use crate::resources::geometry::Geometry;

pub struct PlaneOptions {
    pub width: f32,
    pub height: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            width_segments: 1,
            height_segments: 1,
        }
    }
}

/// A plane in XY facing +Z, centred on the origin. Row 0 is the top edge.
#[must_use]
pub fn create_plane(options: &PlaneOptions) -> Geometry {
    let columns = options.width_segments.max(1);
    let rows = options.height_segments.max(1);
    let vertex_count = ((columns + 1) * (rows + 1)) as usize;

    let mut positions = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);
    for row in 0..=rows {
        let v = row as f32 / rows as f32;
        for column in 0..=columns {
            let u = column as f32 / columns as f32;
            positions.push([(u - 0.5) * options.width, (0.5 - v) * options.height, 0.0]);
            uvs.push([u, 1.0 - v]);
        }
    }
    let normals = vec![[0.0, 0.0, 1.0]; vertex_count];

    let stride = columns + 1;
    let mut indices = Vec::with_capacity((columns * rows * 6) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let top_left = row * stride + column;
            let bottom_left = top_left + stride;
            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_left + 1,
                bottom_left,
                bottom_left + 1,
                top_left + 1,
            ]);
        }
    }

    super::assemble(&positions, &normals, &uvs, &indices)
}
