//! Scene and Configuration Tests
//!
//! Tests for:
//! - SceneConfig JSON parsing, defaults and validation
//! - Color parsing (hex, CSS string, palette name)
//! - Scene construction per background scenario
//! - Resize leaving world-space state untouched
//! - Model attachment, placement and the terminal failure state
//! - Draw extraction and clear()

use glam::{Vec2, Vec3};

use specter::config::{BackgroundKind, Color, IdleClip, SceneConfig};
use specter::errors::SpecterError;
use specter::resources::primitives::{BoxOptions, create_box};
use specter::resources::{Input, MaterialParams, PointerEvent};
use specter::scene::{AssetNode, MeshRef, ModelState, Scene, SceneAsset, Topology, Transform};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn boxed_asset() -> SceneAsset {
    let mesh = MeshRef::new(
        std::sync::Arc::new(create_box(&BoxOptions {
            width: 1.0,
            height: 3.0,
            depth: 1.0,
        })),
        MaterialParams::lit(Color::WHITE),
    );
    SceneAsset::new(
        AssetNode::new("Armature").with_child(
            AssetNode::new("Body")
                .with_transform(Transform::from_position(Vec3::new(5.0, 2.0, 0.0)))
                .with_mesh(mesh),
        ),
    )
}

fn run_frames(scene: &mut Scene, frames: usize) {
    let mut input = Input::new();
    input.inject_resize(800, 600);
    for _ in 0..frames {
        input.advance(0.016);
        scene.update(0.016, &input);
        input.start_frame();
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn json_overrides_only_named_fields() {
    let config = SceneConfig::from_json_str(
        r##"{
            "follow_speed": 0.1,
            "glow_color": "magenta",
            "body_color": "#102030",
            "particle_color": 16729344,
            "idle_clip": "dance",
            "background": "necropolis",
            "analog_decay": { "limbo": true }
        }"##,
    )
    .expect("valid config");

    assert!(approx(config.follow_speed, 0.1));
    assert_eq!(config.glow_color.to_hex(), 0xff00_ff);
    assert_eq!(config.body_color.to_hex(), 0x10_2030);
    assert_eq!(config.particle_color.to_hex(), 0xff45_00);
    assert_eq!(config.idle_clip, IdleClip::Dance);
    assert_eq!(config.background, BackgroundKind::Necropolis);
    assert!(config.analog_decay.limbo);
    assert!(approx(config.analog_decay.intensity, 0.6), "nested defaults survive");
    assert_eq!(config.particle_count, SceneConfig::default().particle_count);
}

#[test]
fn unknown_color_name_is_a_parse_error() {
    let err = SceneConfig::from_json_str(r#"{ "glow_color": "octarine" }"#).unwrap_err();
    assert!(matches!(err, SpecterError::JsonError(_)), "got {err:?}");
}

#[test]
fn out_of_range_values_fail_validation() {
    for json in [
        r#"{ "follow_speed": 1.5 }"#,
        r#"{ "follow_speed": 0.0 }"#,
        r#"{ "eye_glow_decay": 1.0 }"#,
        r#"{ "particle_decay_rate": -0.1 }"#,
        r#"{ "scale": 0.0 }"#,
    ] {
        let err = SceneConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, SpecterError::InvalidConfig(_)), "{json}: {err:?}");
    }
    assert!(SceneConfig::default().validate().is_ok());
}

#[test]
fn colors_convert_between_spaces() {
    assert_eq!(Color::named("ORANGE").map(Color::to_hex), Some(0xff45_00));
    assert_eq!(Color::from(0x00ff_80).to_hex(), 0x00ff_80);
    assert_eq!(Color::WHITE.to_linear(), Vec3::ONE);

    let shifted = Color::from_hex(0xff00_00).offset_hue(1.0 / 3.0);
    assert_eq!(shifted.to_hex(), 0x00ff_00);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn ghost_scene_has_agents_and_lights() {
    let config = SceneConfig::default();
    let scene = Scene::new(&config, 800, 600);

    assert_eq!(scene.primary.position(), Vec3::ZERO);
    assert_eq!(scene.secondaries.len(), 14);
    assert_eq!(scene.model, ModelState::Pending);
    assert!(approx(scene.camera.aspect, 800.0 / 600.0));
    assert!(!scene.lights.is_empty());
    assert_eq!(scene.particles.live_count(), 0);
    assert_eq!(scene.particles.reserve_count(), 100);
}

#[test]
fn necropolis_scene_draws_a_point_cloud() {
    let config = SceneConfig {
        background: BackgroundKind::Necropolis,
        ..SceneConfig::default()
    };
    let scene = Scene::new(&config, 1280, 720);
    assert_eq!(scene.clear_color, Color::from_hex(0x00_0811));

    let mut draws = Vec::new();
    scene.extract_draws(&mut draws);
    assert_eq!(draws.iter().filter(|d| d.topology == Topology::Points).count(), 1);
    assert!(draws.iter().any(|d| d.label.is_some()), "cards carry captions");
}

#[test]
fn same_seed_builds_the_same_scene() {
    let config = SceneConfig::default();
    let a = Scene::new(&config, 800, 600);
    let b = Scene::new(&config, 800, 600);
    let positions = |s: &Scene| s.secondaries.iter().map(|a| a.instance.position()).collect::<Vec<_>>();
    assert_eq!(positions(&a), positions(&b));
}

#[test]
fn unvalidated_zero_follow_speed_keeps_draws_finite() {
    let config = SceneConfig {
        follow_speed: 0.0,
        ..SceneConfig::default()
    };
    let mut scene = Scene::new(&config, 800, 600);
    run_frames(&mut scene, 30);

    let mut draws = Vec::new();
    scene.extract_draws(&mut draws);
    assert!(!draws.is_empty());
    assert!(draws.iter().all(|d| d.model.is_finite()));
}

// ============================================================================
// Update and resize
// ============================================================================

#[test]
fn pointer_drives_the_primary_agent() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    let mut input = Input::new();
    input.inject_resize(800, 600);
    input.apply(PointerEvent::Move { x: 800.0, y: 0.0 });

    for _ in 0..200 {
        input.advance(0.016);
        scene.update(0.016, &input);
        input.start_frame();
    }

    let target = scene.primary.target_for(Vec2::new(1.0, 1.0));
    assert!(scene.primary.position().distance(target) < 1e-2);
    assert!(scene.elapsed() > 3.0);
}

#[test]
fn resize_keeps_world_state() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    run_frames(&mut scene, 30);

    let primary = scene.primary.position();
    let secondaries: Vec<Vec3> = scene.secondaries.iter().map(|s| s.instance.position()).collect();
    let particles: Vec<Vec3> = scene.particles.iter_live().map(|p| p.position).collect();

    scene.resize(1024, 768);
    let camera_once = scene.camera.clone();
    scene.resize(1024, 768);

    assert_eq!(scene.camera, camera_once);
    assert!(approx(scene.camera.aspect, 1024.0 / 768.0));
    assert_eq!(scene.primary.position(), primary);
    assert_eq!(
        scene.secondaries.iter().map(|s| s.instance.position()).collect::<Vec<_>>(),
        secondaries
    );
    assert_eq!(scene.particles.iter_live().map(|p| p.position).collect::<Vec<_>>(), particles);
}

#[test]
fn zero_size_resize_is_ignored() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    let before = scene.camera.clone();
    scene.resize(0, 600);
    assert_eq!(scene.camera, before);
}

// ============================================================================
// Model slot
// ============================================================================

#[test]
fn attached_model_is_framed_at_the_anchor() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    let root = scene.attach_model(&boxed_asset()).expect("non-empty asset");
    assert_eq!(scene.model, ModelState::Ready { root });

    let body = scene.graph.find_by_name(root, "Body").expect("body node");
    let world = *scene.graph.get(body).expect("node").world_matrix();
    let centre = world.transform_point3(Vec3::ZERO);
    assert!((centre - scene.placement.anchor).length() < 1e-4, "centre {centre:?}");

    let height = world.transform_vector3(Vec3::Y * 3.0).length();
    assert!(approx(height, scene.placement.target_size));
}

#[test]
fn attaching_again_replaces_the_model() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    scene.attach_model(&boxed_asset()).expect("first");
    let nodes = scene.graph.len();
    scene.attach_model(&boxed_asset()).expect("second");
    assert_eq!(scene.graph.len(), nodes);
}

#[test]
fn empty_asset_fails_terminally() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    let err = scene.attach_model(&SceneAsset::new(AssetNode::new("Nothing"))).unwrap_err();
    assert!(matches!(err, SpecterError::AssetEmpty));
    assert!(matches!(scene.model, ModelState::Failed(_)));

    let err = scene.attach_model(&boxed_asset()).unwrap_err();
    assert!(matches!(err, SpecterError::AssetFailed(_)));
    assert!(scene.graph.is_empty());
}

#[test]
fn reported_failure_drops_the_model() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    scene.attach_model(&boxed_asset()).expect("attach");
    scene.fail_model("network error");

    assert_eq!(scene.model, ModelState::Failed("network error".to_string()));
    assert!(scene.graph.is_empty());
}

// ============================================================================
// Draw extraction
// ============================================================================

#[test]
fn draws_include_every_agent_and_the_model() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    let mut before = Vec::new();
    scene.extract_draws(&mut before);

    scene.attach_model(&boxed_asset()).expect("attach");
    let mut after = Vec::new();
    scene.extract_draws(&mut after);
    assert_eq!(after.len(), before.len() + 1);

    // body + two sockets per agent, eyes are dark at rest
    let agents = 1 + scene.secondaries.len();
    let agent_draws = before
        .iter()
        .filter(|d| std::sync::Arc::ptr_eq(&d.geometry, &scene.template.body))
        .count();
    assert_eq!(agent_draws, agents);
}

#[test]
fn clear_is_repeatable() {
    let mut scene = Scene::new(&SceneConfig::default(), 800, 600);
    scene.attach_model(&boxed_asset()).expect("attach");
    run_frames(&mut scene, 5);

    scene.clear();
    scene.clear();
    assert!(scene.graph.is_empty());
    assert!(scene.secondaries.is_empty());
    assert_eq!(scene.particles.live_count(), 0);
}
