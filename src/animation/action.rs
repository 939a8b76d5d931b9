use std::sync::Arc;

use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;
use crate::scene::graph::NodeGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// Playback state of one clip: time, looping and the resolved bindings.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    /// With `LoopMode::Once`, keep the last frame applied after the end.
    pub clamp_when_finished: bool,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    finished: bool,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            clamp_when_finished: false,
            paused: false,
            enabled: true,
            bindings: Vec::new(),
            finished: false,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: Vec<PropertyBinding>) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.clamp_when_finished = true;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// A `Once` action that reached either end of its clip.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances local time according to the loop mode.
    pub fn update(&mut self, dt: f32) {
        if self.paused || !self.enabled || self.finished {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.finished = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.finished = true;
                }
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                let double_duration = duration * 2.0;
                let t = self.time.rem_euclid(double_duration);
                self.time = if t > duration { double_duration - t } else { t };
            }
        }
    }

    fn should_apply(&self) -> bool {
        self.enabled && self.weight > 0.0 && (!self.finished || self.clamp_when_finished)
    }

    /// Writes the sampled values of every bound track into `graph`.
    /// Bindings whose node no longer exists are skipped.
    pub(crate) fn apply(&mut self, graph: &mut NodeGraph) {
        if !self.should_apply() {
            return;
        }
        let weight = self.weight.min(1.0);

        for binding in &self.bindings {
            let Some(track) = self.clip.tracks.get(binding.track_index) else {
                continue;
            };
            let Some(cursor) = self.track_cursors.get_mut(binding.track_index) else {
                continue;
            };
            let Some(node) = graph.get_mut(binding.node) else {
                continue;
            };
            let transform = &mut node.transform;

            match (&track.data, binding.target) {
                (TrackData::Vector3(t), TargetPath::Translation) => {
                    if let Some(value) = t.sample_with_cursor(self.time, cursor) {
                        transform.position = transform.position.lerp(value, weight);
                    }
                }
                (TrackData::Vector3(t), TargetPath::Scale) => {
                    if let Some(value) = t.sample_with_cursor(self.time, cursor) {
                        transform.scale = transform.scale.lerp(value, weight);
                    }
                }
                (TrackData::Quaternion(t), TargetPath::Rotation) => {
                    if let Some(value) = t.sample_with_cursor(self.time, cursor) {
                        transform.rotation = transform.rotation.slerp(value, weight);
                    }
                }
                _ => {}
            }
        }
    }
}
