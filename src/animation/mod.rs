pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod controller;
pub mod mixer;
pub mod procedural;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode};
pub use binder::{BindResult, Binder};
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use controller::{AnimationCommand, AnimationController, AnimationEvent, AnimationState};
pub use mixer::AnimationMixer;
pub use procedural::RestPose;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
