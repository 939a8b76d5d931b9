//! Externally supplied scene assets
//!
//! A [`SceneAsset`] is what the host hands over once avatar content is ready:
//! a node hierarchy (some nodes carrying meshes) plus any animation clips
//! embedded in the file. Fetching and decoding are the host's business.

use glam::{Affine3A, Vec3};

use crate::animation::AnimationClip;
use crate::resources::geometry::BoundingBox;
use crate::scene::NodeHandle;
use crate::scene::graph::NodeGraph;
use crate::scene::node::{MeshRef, Node};
use crate::scene::transform::Transform;

/// One node of an imported hierarchy.
#[derive(Debug, Clone, Default)]
pub struct AssetNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshRef>,
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
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

    #[must_use]
    pub fn with_child(mut self, child: AssetNode) -> Self {
        self.children.push(child);
        self
    }

    fn accumulate_bounds(&self, parent: Affine3A, out: &mut BoundingBox) {
        let world = parent * self.transform.compose();
        if let Some(bbox) = self.mesh.as_ref().and_then(|m| m.geometry.bounding_box) {
            *out = out.union(&bbox.transform(&world));
        }
        for child in &self.children {
            child.accumulate_bounds(world, out);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneAsset {
    pub root: AssetNode,
    pub clips: Vec<AnimationClip>,
}

impl SceneAsset {
    #[must_use]
    pub fn new(root: AssetNode) -> Self {
        Self {
            root,
            clips: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_clip(mut self, clip: AnimationClip) -> Self {
        self.clips.push(clip);
        self
    }

    /// An asset whose root has neither children nor a mesh has nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && self.root.mesh.is_none()
    }

    /// Local-space bounds of every mesh in the hierarchy.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox = BoundingBox::empty();
        self.root.accumulate_bounds(Affine3A::IDENTITY, &mut bbox);
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Copies the hierarchy into `graph` under `parent`. Returns the handle
    /// of the copied root.
    pub fn instantiate(&self, graph: &mut NodeGraph, parent: NodeHandle) -> NodeHandle {
        let mut pending: Vec<(&AssetNode, NodeHandle)> = vec![(&self.root, parent)];
        let mut copied_root = None;

        while let Some((asset_node, parent_handle)) = pending.pop() {
            let mut node = Node::new(asset_node.name.clone()).with_transform(asset_node.transform.clone());
            node.mesh.clone_from(&asset_node.mesh);
            let handle = graph.add(node);
            graph.attach(parent_handle, handle);
            copied_root.get_or_insert(handle);
            for child in asset_node.children.iter().rev() {
                pending.push((child, handle));
            }
        }

        copied_root.unwrap_or(parent)
    }
}

/// Where an imported model is placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPlacement {
    /// World position the model's bounding-box centre is moved to.
    pub anchor: Vec3,
    /// The model is uniformly scaled so its tallest axis matches this.
    pub target_size: f32,
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self {
            anchor: Vec3::new(0.0, -1.0, 4.0),
            target_size: 6.0,
        }
    }
}

impl ModelPlacement {
    /// Transform for the wrapper node that frames `bbox` at the anchor.
    #[must_use]
    pub fn frame(&self, bbox: Option<BoundingBox>) -> Transform {
        let Some(bbox) = bbox else {
            return Transform::from_position(self.anchor);
        };
        let max_dim = bbox.size().max_element();
        let scale = if max_dim > f32::EPSILON { self.target_size / max_dim } else { 1.0 };
        Transform::from_trs(
            self.anchor - bbox.center() * scale,
            glam::Quat::IDENTITY,
            Vec3::splat(scale),
        )
    }
}

/// Lifecycle of the model slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelState {
    /// No asset supplied yet; only ambient content is shown.
    #[default]
    Pending,
    Ready { root: NodeHandle },
    /// Terminal. The message is what the host should show.
    Failed(String),
}
