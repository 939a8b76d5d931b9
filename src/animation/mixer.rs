use std::sync::Arc;

use crate::animation::action::AnimationAction;
use crate::animation::clip::AnimationClip;
use crate::scene::graph::NodeGraph;

/// Drives a set of actions against one node graph.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    time: f32,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: AnimationAction) {
        self.actions.push(action);
    }

    /// Removes every action. Node transforms keep their last applied values.
    pub fn stop_all(&mut self) {
        self.actions.clear();
    }

    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut [AnimationAction] {
        &mut self.actions
    }

    /// The action playing `clip`, if any.
    #[must_use]
    pub fn action_for(&self, clip: &Arc<AnimationClip>) -> Option<&AnimationAction> {
        self.actions.iter().find(|a| Arc::ptr_eq(a.clip(), clip))
    }

    /// Total time this mixer has advanced.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn update(&mut self, dt: f32, graph: &mut NodeGraph) {
        self.time += dt;

        for action in &mut self.actions {
            action.update(dt);
            action.apply(graph);
        }
    }
}
