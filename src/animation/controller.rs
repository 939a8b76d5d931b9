//! Animation Clip Controller
//!
//! Owns the mixer for the attached model and the small state machine on top
//! of it: a looping idle clip, one-shot clips that fall back to idle when
//! they finish, and manual stop/return commands. Completion is evaluated once
//! per frame by comparing action time against the clip duration.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::action::{AnimationAction, LoopMode};
use crate::animation::binder::Binder;
use crate::animation::clip::AnimationClip;
use crate::animation::mixer::AnimationMixer;
use crate::animation::procedural::{self, ONE_SHOT_CLIPS, RestPose};
use crate::config::IdleClip;
use crate::scene::NodeHandle;
use crate::scene::graph::NodeGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationState {
    /// No model attached.
    Inactive,
    /// A clip looping indefinitely.
    Idle { clip: String },
    /// A clip playing once; idle resumes when it ends.
    OneShot { clip: String },
    Stopped,
}

/// Imperative requests queued by a control handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationCommand {
    PlayHi,
    PlayJump,
    ReturnToIdle,
    Play(String),
    Stop,
}

/// Reported by [`AnimationController::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    /// A one-shot clip reached its end and idle was resumed.
    Finished { clip: String },
}

#[derive(Debug)]
pub struct AnimationController {
    mixer: AnimationMixer,
    state: AnimationState,
    idle_clip: IdleClip,
    time_scale: f32,

    root: Option<NodeHandle>,
    rest: RestPose,
    embedded: Vec<Arc<AnimationClip>>,
    procedural: Vec<Arc<AnimationClip>>,
    unresolved: FxHashMap<String, Vec<String>>,

    /// Clip whose channels are currently perturbed.
    active: Option<Arc<AnimationClip>>,
}

impl AnimationController {
    #[must_use]
    pub fn new(idle_clip: IdleClip) -> Self {
        Self {
            mixer: AnimationMixer::new(),
            state: AnimationState::Inactive,
            idle_clip,
            time_scale: 1.0,
            root: None,
            rest: RestPose::default(),
            embedded: Vec::new(),
            procedural: Vec::new(),
            unresolved: FxHashMap::default(),
            active: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Applies to the running action and every action started later.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
        for action in self.mixer.actions_mut() {
            action.time_scale = time_scale;
        }
    }

    /// Names of the nodes `clip` references that the attached model lacks.
    /// Empty for unknown clips or fully resolved ones.
    #[must_use]
    pub fn unresolved_targets(&self, clip: &str) -> &[String] {
        self.unresolved.get(clip).map(Vec::as_slice).unwrap_or_default()
    }

    /// Names of every clip that can be played, embedded ones first.
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.embedded.iter().chain(&self.procedural).map(|c| c.name.as_str())
    }

    /// Takes control of the model under `root`, captures its rest pose,
    /// builds the procedural clips and starts the idle loop.
    pub fn attach(&mut self, graph: &mut NodeGraph, root: NodeHandle, embedded: Vec<AnimationClip>) {
        self.detach();

        self.root = Some(root);
        self.rest = RestPose::capture(graph, root);
        self.embedded = embedded.into_iter().map(Arc::new).collect();
        self.procedural = procedural::build_clips(&self.rest).into_iter().map(Arc::new).collect();

        for clip in self.embedded.iter().chain(&self.procedural) {
            let unresolved = Binder::bind(graph, root, clip).unresolved;
            if unresolved.is_empty() {
                continue;
            }
            log::warn!(
                "Animation clip '{}' targets nodes missing from the model: {}",
                clip.name,
                unresolved.join(", ")
            );
            self.unresolved.entry(clip.name.clone()).or_insert(unresolved);
        }

        log::info!(
            "Animation controller attached ({} embedded clips, {} procedural)",
            self.embedded.len(),
            self.procedural.len()
        );
        self.enter_idle(graph);
    }

    /// Releases the model. Node transforms are left as they are.
    pub fn detach(&mut self) {
        self.mixer.stop_all();
        self.root = None;
        self.rest = RestPose::default();
        self.embedded.clear();
        self.procedural.clear();
        self.unresolved.clear();
        self.active = None;
        self.state = AnimationState::Inactive;
    }

    /// Embedded clips shadow procedural ones of the same name.
    fn resolve(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.embedded
            .iter()
            .chain(&self.procedural)
            .find(|c| c.name == name)
            .cloned()
    }

    fn idle_name(&self) -> &'static str {
        match self.idle_clip {
            IdleClip::Breathing => procedural::IDLE,
            IdleClip::Wave => procedural::WAVE,
            IdleClip::Dance => procedural::DANCE,
        }
    }

    /// Resets whatever the active clip touched back to the rest pose.
    fn reset_active(&mut self, graph: &mut NodeGraph) {
        self.mixer.stop_all();
        if let (Some(clip), Some(root)) = (self.active.take(), self.root) {
            self.rest.restore(graph, root, &clip.perturbed_channels());
        }
    }

    fn start(&mut self, graph: &mut NodeGraph, clip: Arc<AnimationClip>, loop_mode: LoopMode) {
        let Some(root) = self.root else {
            return;
        };
        self.reset_active(graph);

        let bindings = Binder::bind(graph, root, &clip).bindings;
        let mut action = AnimationAction::new(Arc::clone(&clip))
            .with_bindings(bindings)
            .with_loop_mode(loop_mode);
        action.time_scale = self.time_scale;
        if loop_mode == LoopMode::Once {
            action = action.clamped();
        }
        self.mixer.add_action(action);

        let name = clip.name.clone();
        self.active = Some(clip);
        self.state = match loop_mode {
            LoopMode::Once => AnimationState::OneShot { clip: name },
            LoopMode::Loop | LoopMode::PingPong => AnimationState::Idle { clip: name },
        };
    }

    fn enter_idle(&mut self, graph: &mut NodeGraph) {
        let name = self.idle_name();
        if let Some(clip) = self.resolve(name) {
            self.start(graph, clip, LoopMode::Loop);
        } else {
            self.reset_active(graph);
            self.state = AnimationState::Idle { clip: name.to_string() };
        }
    }

    pub fn play_hi(&mut self, graph: &mut NodeGraph) {
        self.play_animation(graph, procedural::HI);
    }

    pub fn play_jump(&mut self, graph: &mut NodeGraph) {
        self.play_animation(graph, procedural::JUMP);
    }

    /// Plays `name`: `hi` and `jump` once, anything else looped. Unknown
    /// names leave the current animation running.
    pub fn play_animation(&mut self, graph: &mut NodeGraph, name: &str) {
        if self.state == AnimationState::Inactive {
            log::debug!("Ignoring animation '{name}': no model attached");
            return;
        }
        let Some(clip) = self.resolve(name) else {
            log::warn!("Unknown animation clip '{name}'");
            return;
        };
        let mode = if ONE_SHOT_CLIPS.contains(&name) { LoopMode::Once } else { LoopMode::Loop };
        self.start(graph, clip, mode);
    }

    /// Back to the idle loop from any state.
    pub fn return_to_idle(&mut self, graph: &mut NodeGraph) {
        if self.state == AnimationState::Inactive {
            return;
        }
        self.enter_idle(graph);
    }

    /// Stops every action and restores the rest pose.
    pub fn stop(&mut self, graph: &mut NodeGraph) {
        if self.state == AnimationState::Inactive {
            return;
        }
        self.reset_active(graph);
        self.state = AnimationState::Stopped;
    }

    pub fn handle(&mut self, command: AnimationCommand, graph: &mut NodeGraph) {
        match command {
            AnimationCommand::PlayHi => self.play_hi(graph),
            AnimationCommand::PlayJump => self.play_jump(graph),
            AnimationCommand::ReturnToIdle => self.return_to_idle(graph),
            AnimationCommand::Play(name) => self.play_animation(graph, &name),
            AnimationCommand::Stop => self.stop(graph),
        }
    }

    /// Advances playback and resolves one-shot completion.
    pub fn update(&mut self, dt: f32, graph: &mut NodeGraph) -> Option<AnimationEvent> {
        if matches!(self.state, AnimationState::Inactive | AnimationState::Stopped) {
            return None;
        }
        self.mixer.update(dt, graph);

        let AnimationState::OneShot { clip: name } = &self.state else {
            return None;
        };
        let done = match self.active.as_ref().and_then(|clip| self.mixer.action_for(clip)) {
            Some(action) => action.is_finished() || action.time >= action.clip().duration,
            None => true,
        };
        if !done {
            return None;
        }

        let clip = name.clone();
        log::debug!("One-shot clip '{clip}' finished, returning to idle");
        self.enter_idle(graph);
        Some(AnimationEvent::Finished { clip })
    }
}
