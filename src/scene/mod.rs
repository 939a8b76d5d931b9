pub mod camera;
pub mod graph;
pub mod light;
pub mod model;
pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform;

pub use camera::Camera;
pub use graph::NodeGraph;
pub use light::{Fog, Light, LightKind};
pub use model::{AssetNode, ModelPlacement, ModelState, SceneAsset};
pub use node::{MeshRef, Node};
pub use scene::{DrawItem, Scene, Topology};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a node in a [`NodeGraph`].
    pub struct NodeHandle;
}
