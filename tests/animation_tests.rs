//! Animation Controller Tests
//!
//! Tests for:
//! - Keyframe sampling and action loop modes
//! - Idle loop on attach, one-shot playback and single completion event
//! - Rest pose restored by stop()
//! - Unresolved joint reporting for models missing named nodes
//! - Embedded clips shadowing procedural ones
//! - Commands before attach and unknown clip names

use std::sync::Arc;

use glam::{Quat, Vec3};

use specter::animation::action::{AnimationAction, LoopMode};
use specter::animation::clip::{AnimationClip, Track};
use specter::animation::procedural::{self, RestPose};
use specter::animation::tracks::KeyframeTrack;
use specter::animation::{AnimationController, AnimationEvent, AnimationState};
use specter::config::IdleClip;
use specter::scene::{AssetNode, NodeGraph, NodeHandle, SceneAsset, Transform};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Armature with every joint the procedural clips drive.
fn rigged_asset() -> SceneAsset {
    let fore_arm = AssetNode::new(procedural::RIGHT_FORE_ARM)
        .with_transform(Transform::from_position(Vec3::new(0.4, 0.0, 0.0)));
    let arm = AssetNode::new(procedural::RIGHT_ARM)
        .with_transform(Transform::from_position(Vec3::new(0.3, 1.4, 0.0)))
        .with_child(fore_arm);
    let head = AssetNode::new(procedural::HEAD).with_transform(Transform::from_position(Vec3::new(0.0, 1.7, 0.0)));
    let spine = AssetNode::new(procedural::SPINE)
        .with_transform(Transform::from_position(Vec3::new(0.0, 0.5, 0.0)))
        .with_child(arm)
        .with_child(head);
    let hips = AssetNode::new(procedural::HIPS).with_child(spine);
    SceneAsset::new(AssetNode::new("Armature").with_child(hips))
}

fn attached(asset: &SceneAsset, idle: IdleClip) -> (AnimationController, NodeGraph, NodeHandle) {
    let mut graph = NodeGraph::new();
    let wrapper = graph.add(specter::scene::Node::new("Wrapper"));
    let root = asset.instantiate(&mut graph, wrapper);
    let mut controller = AnimationController::new(idle);
    controller.attach(&mut graph, root, asset.clips.clone());
    (controller, graph, root)
}

fn rotation_of(graph: &NodeGraph, root: NodeHandle, name: &str) -> Quat {
    let handle = graph.find_by_name(root, name).expect("joint exists");
    graph.get(handle).expect("node exists").transform.rotation
}

fn idle_state(name: &str) -> AnimationState {
    AnimationState::Idle { clip: name.to_string() }
}

// ============================================================================
// Tracks and actions
// ============================================================================

#[test]
fn linear_track_interpolates_between_keys() {
    let track = KeyframeTrack::linear(vec![0.0, 2.0], vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)]);
    let mid = track.sample(1.0).expect("non-empty track");
    assert!(approx(mid.x, 2.0));
    assert_eq!(track.sample(5.0), Some(Vec3::new(4.0, 0.0, 0.0)), "samples clamp past the end");
}

#[test]
fn clip_duration_is_the_longest_track() {
    let clip = AnimationClip::new(
        "test",
        vec![
            Track::translation("A", KeyframeTrack::linear(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::ONE])),
            Track::scale("B", KeyframeTrack::linear(vec![0.0, 3.0], vec![Vec3::ONE, Vec3::ONE])),
        ],
    );
    assert!(approx(clip.duration, 3.0));
}

#[test]
fn once_action_clamps_and_finishes() {
    let clip = Arc::new(AnimationClip::new(
        "once",
        vec![Track::translation(
            "A",
            KeyframeTrack::linear(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::ONE]),
        )],
    ));
    let mut action = AnimationAction::new(clip).with_loop_mode(LoopMode::Once).clamped();
    action.update(0.6);
    assert!(!action.is_finished());
    action.update(0.6);
    assert!(action.is_finished());
    assert!(approx(action.time, 1.0));
}

#[test]
fn loop_action_wraps() {
    let clip = Arc::new(AnimationClip::new(
        "loop",
        vec![Track::translation(
            "A",
            KeyframeTrack::linear(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::ONE]),
        )],
    ));
    let mut action = AnimationAction::new(clip);
    action.update(1.25);
    assert!(!action.is_finished());
    assert!(approx(action.time, 0.25));
}

// ============================================================================
// State machine
// ============================================================================

#[test]
fn attach_starts_the_configured_idle() {
    let (controller, _, _) = attached(&rigged_asset(), IdleClip::Breathing);
    assert_eq!(controller.state(), &idle_state(procedural::IDLE));

    let (controller, _, _) = attached(&rigged_asset(), IdleClip::Dance);
    assert_eq!(controller.state(), &idle_state(procedural::DANCE));
}

#[test]
fn hi_returns_to_idle_exactly_once() {
    let (mut controller, mut graph, _) = attached(&rigged_asset(), IdleClip::Breathing);
    controller.play_hi(&mut graph);
    assert_eq!(
        controller.state(),
        &AnimationState::OneShot {
            clip: procedural::HI.to_string()
        }
    );

    let mut events = Vec::new();
    for _ in 0..60 {
        if let Some(event) = controller.update(0.1, &mut graph) {
            events.push(event);
        }
    }

    assert_eq!(
        events,
        vec![AnimationEvent::Finished {
            clip: procedural::HI.to_string()
        }]
    );
    assert_eq!(controller.state(), &idle_state(procedural::IDLE));
}

#[test]
fn one_shot_is_still_running_before_its_duration() {
    let (mut controller, mut graph, _) = attached(&rigged_asset(), IdleClip::Breathing);
    controller.play_jump(&mut graph);
    for _ in 0..14 {
        assert!(controller.update(0.1, &mut graph).is_none());
    }
    assert!(matches!(controller.state(), AnimationState::OneShot { .. }));
}

#[test]
fn return_to_idle_interrupts_a_one_shot_without_event() {
    let (mut controller, mut graph, _) = attached(&rigged_asset(), IdleClip::Wave);
    controller.play_jump(&mut graph);
    controller.update(0.2, &mut graph);
    controller.return_to_idle(&mut graph);
    assert_eq!(controller.state(), &idle_state(procedural::WAVE));

    for _ in 0..40 {
        assert!(controller.update(0.1, &mut graph).is_none());
    }
}

#[test]
fn looping_clips_never_finish() {
    let (mut controller, mut graph, _) = attached(&rigged_asset(), IdleClip::Breathing);
    controller.play_animation(&mut graph, procedural::DANCE);
    assert_eq!(controller.state(), &idle_state(procedural::DANCE));
    for _ in 0..100 {
        assert!(controller.update(0.1, &mut graph).is_none());
    }
}

#[test]
fn stop_restores_the_rest_pose() {
    let (mut controller, mut graph, root) = attached(&rigged_asset(), IdleClip::Breathing);
    let rest = rotation_of(&graph, root, procedural::RIGHT_ARM);

    controller.play_hi(&mut graph);
    controller.update(1.0, &mut graph);
    assert_ne!(rotation_of(&graph, root, procedural::RIGHT_ARM), rest, "arm is raised mid-clip");

    controller.stop(&mut graph);
    assert_eq!(controller.state(), &AnimationState::Stopped);
    assert_eq!(rotation_of(&graph, root, procedural::RIGHT_ARM), rest);
    assert!(controller.update(0.5, &mut graph).is_none());
    assert_eq!(rotation_of(&graph, root, procedural::RIGHT_ARM), rest);
}

#[test]
fn unknown_clip_keeps_the_current_animation() {
    let (mut controller, mut graph, _) = attached(&rigged_asset(), IdleClip::Breathing);
    controller.play_animation(&mut graph, "moonwalk");
    assert_eq!(controller.state(), &idle_state(procedural::IDLE));
}

#[test]
fn commands_before_attach_are_ignored() {
    let mut graph = NodeGraph::new();
    let mut controller = AnimationController::new(IdleClip::Breathing);
    controller.play_hi(&mut graph);
    controller.return_to_idle(&mut graph);
    controller.stop(&mut graph);
    assert_eq!(controller.state(), &AnimationState::Inactive);
    assert!(controller.update(0.1, &mut graph).is_none());
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn missing_joints_are_reported_not_fatal() {
    let asset = SceneAsset::new(AssetNode::new("Blob").with_child(AssetNode::new(procedural::HEAD)));
    let (mut controller, mut graph, _) = attached(&asset, IdleClip::Breathing);

    let missing = controller.unresolved_targets(procedural::HI);
    assert!(missing.contains(&procedural::RIGHT_ARM.to_string()));
    assert!(missing.contains(&procedural::RIGHT_FORE_ARM.to_string()));
    assert!(!missing.contains(&procedural::HEAD.to_string()));
    assert_eq!(
        controller.unresolved_targets(procedural::JUMP),
        [procedural::SPINE.to_string()],
        "jump drives the root plus the spine"
    );

    controller.play_hi(&mut graph);
    let finished = (0..30).filter_map(|_| controller.update(0.1, &mut graph)).count();
    assert_eq!(finished, 1);
}

#[test]
fn embedded_clip_shadows_procedural_one() {
    let embedded = AnimationClip::new(
        procedural::HI,
        vec![Track::translation(
            "Armature",
            KeyframeTrack::linear(vec![0.0, 0.5], vec![Vec3::ZERO, Vec3::Y]),
        )],
    );
    let asset = rigged_asset().with_clip(embedded);
    let (mut controller, mut graph, _) = attached(&asset, IdleClip::Breathing);

    let names: Vec<&str> = controller.clip_names().collect();
    assert_eq!(names.first(), Some(&procedural::HI));

    controller.play_hi(&mut graph);
    let finished_at = (1..=30).find(|_| controller.update(0.1, &mut graph).is_some());
    assert_eq!(finished_at, Some(5), "the 0.5 s embedded clip wins over the 2.5 s procedural one");
}

#[test]
fn rest_pose_captures_known_joints() {
    let asset = rigged_asset();
    let mut graph = NodeGraph::new();
    let wrapper = graph.add(specter::scene::Node::new("Wrapper"));
    let root = asset.instantiate(&mut graph, wrapper);

    let rest = RestPose::capture(&graph, root);
    assert_eq!(rest.root_name(), "Armature");
    assert_eq!(rest.get(procedural::RIGHT_ARM).position, Vec3::new(0.3, 1.4, 0.0));
    assert_eq!(rest.get("NotAJoint").rotation, Quat::IDENTITY);
}
