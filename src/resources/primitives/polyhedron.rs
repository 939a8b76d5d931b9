use glam::Vec3;

use crate::resources::geometry::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyhedronKind {
    Tetrahedron,
    Octahedron,
}

/// Flat-shaded regular polyhedron with every vertex at `radius`.
#[must_use]
pub fn create_polyhedron(kind: PolyhedronKind, radius: f32) -> Geometry {
    let (vertices, faces): (&[[f32; 3]], &[[usize; 3]]) = match kind {
        PolyhedronKind::Tetrahedron => (
            &[[1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [1.0, -1.0, -1.0]],
            &[[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]],
        ),
        PolyhedronKind::Octahedron => (
            &[
                [1.0, 0.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, -1.0],
            ],
            &[
                [0, 2, 4],
                [0, 4, 3],
                [0, 3, 5],
                [0, 5, 2],
                [1, 2, 5],
                [1, 5, 3],
                [1, 3, 4],
                [1, 4, 2],
            ],
        ),
    };

    let mut positions = Vec::with_capacity(faces.len() * 3);
    let mut normals = Vec::with_capacity(faces.len() * 3);
    let mut uvs = Vec::with_capacity(faces.len() * 3);

    for face in faces {
        let corners = face.map(|i| Vec3::from_array(vertices[i]).normalize() * radius);
        let normal = (corners[1] - corners[0])
            .cross(corners[2] - corners[0])
            .normalize_or_zero();
        for (corner, uv) in corners.iter().zip([[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]) {
            positions.push(corner.to_array());
            normals.push(normal.to_array());
            uvs.push(uv);
        }
    }
    let indices: Vec<u32> = (0..positions.len() as u32).collect();

    super::assemble(&positions, &normals, &uvs, &indices)
}
