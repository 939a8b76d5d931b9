mod box_shape;
mod cylinder;
mod plane;
mod polyhedron;
mod ring;
mod sphere;
mod torus;

pub use box_shape::{BoxOptions, create_box};
pub use cylinder::{CylinderOptions, create_cylinder};
pub use plane::{PlaneOptions, create_plane};
pub use polyhedron::{PolyhedronKind, create_polyhedron};
pub use ring::{RingOptions, create_ring};
pub use sphere::{SphereOptions, create_sphere};
pub use torus::{TorusOptions, create_torus};

use wgpu::VertexFormat;

use crate::resources::geometry::{Attribute, Geometry};

/// Assembles a geometry from the buffers every builder produces.
pub(crate) fn assemble(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 2]],
    indices: &[u32],
) -> Geometry {
    let mut geo = Geometry::new();
    geo.set_attribute("position", Attribute::new_planar(positions, VertexFormat::Float32x3));
    geo.set_attribute("normal", Attribute::new_planar(normals, VertexFormat::Float32x3));
    geo.set_attribute("uv", Attribute::new_planar(uvs, VertexFormat::Float32x2));
    geo.set_indices_auto(indices);
    geo.compute_bounding_volume();
    geo
}
