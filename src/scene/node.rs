use std::sync::Arc;

use glam::Affine3A;

use crate::resources::geometry::Geometry;
use crate::resources::material::MaterialParams;
use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// Renderable attached to a node: shared geometry plus its own material.
#[derive(Debug, Clone)]
pub struct MeshRef {
    pub geometry: Arc<Geometry>,
    pub material: MaterialParams,
}

impl MeshRef {
    #[must_use]
    pub fn new(geometry: Arc<Geometry>, material: MaterialParams) -> Self {
        Self { geometry, material }
    }
}

/// A scene-graph node of the imported model.
///
/// Nodes form a tree through `parent`/`children`; keep both sides in sync by
/// going through [`NodeGraph::attach`](crate::scene::NodeGraph::attach).
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,
    pub mesh: Option<MeshRef>,
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            mesh: None,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshRef) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}
