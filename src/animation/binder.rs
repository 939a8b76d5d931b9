use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::NodeHandle;
use crate::scene::graph::NodeGraph;

/// Outcome of resolving a clip against a node hierarchy.
#[derive(Debug, Clone, Default)]
pub struct BindResult {
    pub bindings: Vec<PropertyBinding>,
    /// Node names the clip references that do not exist under the root.
    pub unresolved: Vec<String>,
}

pub struct Binder;

impl Binder {
    /// Resolves each track's node name under `root` (inclusive).
    #[must_use]
    pub fn bind(graph: &NodeGraph, root: NodeHandle, clip: &AnimationClip) -> BindResult {
        let mut result = BindResult {
            bindings: Vec::with_capacity(clip.tracks.len()),
            unresolved: Vec::new(),
        };

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let name = &track.meta.node_name;
            match graph.find_by_name(root, name) {
                Some(node) => result.bindings.push(PropertyBinding {
                    track_index,
                    node,
                    target: track.meta.target,
                }),
                None => {
                    if !result.unresolved.contains(name) {
                        result.unresolved.push(name.clone());
                    }
                }
            }
        }

        result
    }
}
