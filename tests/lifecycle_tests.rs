//! Viewport Lifecycle Tests
//!
//! Tests for:
//! - Mount: surface checks, listener registration, first frame request
//! - Frame loop without a GPU
//! - Teardown idempotence (no duplicate removals, nothing left scheduled)
//! - Post-teardown calls degrading to no-ops
//! - Animation commands delivered through the control handle
//! - Resize idempotence

use glam::Vec3;

use specter::animation::{AnimationEvent, AnimationState};
use specter::config::SceneConfig;
use specter::engine::{FrameRequest, Host, LifecycleState, Viewport};
use specter::resources::ListenerKind;
use specter::scene::{AssetNode, SceneAsset};
use specter::{FrameOutcome, RendererSettings, SpecterError};

/// Records every call the viewport makes on its host.
#[derive(Debug, Default)]
struct MockHost {
    size: Option<(u32, u32)>,
    attachable: bool,
    attached: bool,
    next_id: u64,
    pending: Vec<FrameRequest>,
    listeners: Vec<ListenerKind>,
    duplicate_removals: usize,
    detach_calls: usize,
}

impl MockHost {
    fn with_surface(width: u32, height: u32) -> Self {
        Self {
            size: Some((width, height)),
            attachable: true,
            ..Self::default()
        }
    }
}

impl Host for MockHost {
    fn surface_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn attach_surface(&mut self) -> bool {
        self.attached = self.attachable;
        self.attachable
    }

    fn detach_surface(&mut self) {
        self.attached = false;
        self.detach_calls += 1;
    }

    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending.retain(|r| *r != request);
    }

    fn add_listener(&mut self, kind: ListenerKind) {
        self.listeners.push(kind);
    }

    fn remove_listener(&mut self, kind: ListenerKind) {
        match self.listeners.iter().position(|k| *k == kind) {
            Some(index) => {
                self.listeners.remove(index);
            }
            None => self.duplicate_removals += 1,
        }
    }
}

fn mounted() -> Viewport<MockHost> {
    match Viewport::mount(
        MockHost::with_surface(800, 600),
        SceneConfig::default(),
        RendererSettings::default(),
    ) {
        Ok(viewport) => viewport,
        Err(err) => panic!("mount failed: {err}"),
    }
}

/// Fires the host's pending frame callback, as a browser or event loop would.
fn fire(viewport: &mut Viewport<MockHost>, timestamp_ms: f64) -> Option<specter::FrameReport> {
    viewport.host_mut().pending.pop();
    viewport.on_frame(timestamp_ms)
}

fn rig() -> SceneAsset {
    SceneAsset::new(AssetNode::new("Armature").with_child(AssetNode::new("Hips")))
}

// ============================================================================
// Mount
// ============================================================================

#[test]
fn mount_registers_listeners_and_first_frame() {
    let viewport = mounted();
    assert_eq!(viewport.state(), LifecycleState::Mounted);
    assert!(viewport.host().attached);
    assert_eq!(viewport.host().listeners.len(), ListenerKind::ALL.len());
    assert_eq!(viewport.host().pending.len(), 1);
    assert_eq!(viewport.pending_frame(), viewport.host().pending.first().copied());
}

#[test]
fn mount_without_surface_fails() {
    let host = MockHost::default();
    let err = Viewport::mount(host, SceneConfig::default(), RendererSettings::default()).err();
    assert!(matches!(err, Some(SpecterError::SurfaceUnavailable(_))));

    let refusing = MockHost {
        attachable: false,
        ..MockHost::with_surface(800, 600)
    };
    let err = Viewport::mount(refusing, SceneConfig::default(), RendererSettings::default()).err();
    assert!(matches!(err, Some(SpecterError::SurfaceUnavailable(_))));
}

#[test]
fn invalid_config_is_rejected_at_mount() {
    let config = SceneConfig {
        follow_speed: 1.5,
        ..SceneConfig::default()
    };
    let err = Viewport::mount(MockHost::with_surface(800, 600), config, RendererSettings::default()).err();
    assert!(matches!(err, Some(SpecterError::InvalidConfig(_))));
}

// ============================================================================
// Frame loop
// ============================================================================

#[test]
fn frames_without_gpu_simulate_but_draw_nothing() {
    let mut viewport = mounted();
    let first = fire(&mut viewport, 0.0).expect("mounted");
    assert_eq!(first.outcome, FrameOutcome::Idle);

    for i in 1..=10 {
        fire(&mut viewport, f64::from(i) * 16.0);
    }
    assert_eq!(viewport.host().pending.len(), 1, "exactly one frame stays scheduled");
    assert!(viewport.scene().elapsed() > 0.15);
}

#[test]
fn long_gap_skips_simulation() {
    let mut viewport = mounted();
    fire(&mut viewport, 0.0);
    fire(&mut viewport, 16.0);
    let before = viewport.scene().elapsed();

    let report = fire(&mut viewport, 5_000.0).expect("mounted");
    assert_eq!(report.step, specter::FrameStep::Skip);
    assert_eq!(viewport.scene().elapsed(), before);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn teardown_twice_is_clean() {
    let mut viewport = mounted();
    fire(&mut viewport, 0.0);
    fire(&mut viewport, 16.0);

    viewport.teardown();
    viewport.teardown();

    let host = viewport.host();
    assert_eq!(viewport.state(), LifecycleState::TornDown);
    assert!(host.pending.is_empty(), "no frame left scheduled");
    assert!(host.listeners.is_empty());
    assert_eq!(host.duplicate_removals, 0);
    assert_eq!(host.detach_calls, 1);
    assert!(!host.attached);
    assert!(viewport.renderer().is_disposed());
}

#[test]
fn calls_after_teardown_are_no_ops() {
    let mut viewport = mounted();
    let controls = viewport.control_handle();
    viewport.teardown();

    assert!(viewport.on_frame(100.0).is_none());
    assert!(viewport.host().pending.is_empty());

    viewport.resize(1024, 768);
    viewport.report_model_error("late failure");
    controls.play_hi_animation();
    controls.play_animation("dance");

    assert!(matches!(viewport.attach_model(&rig()), Err(SpecterError::Unmounted)));
    assert_eq!(viewport.host().detach_calls, 1);
}

// ============================================================================
// Animation commands
// ============================================================================

#[test]
fn hi_command_finishes_once_and_returns_to_idle() {
    let mut viewport = mounted();
    viewport.attach_model(&rig()).expect("non-empty rig");
    viewport.control_handle().play_hi_animation();

    let mut finished = Vec::new();
    for i in 0..200 {
        if let Some(event) = fire(&mut viewport, f64::from(i) * 16.0).and_then(|r| r.event) {
            finished.push(event);
        }
    }

    assert_eq!(
        finished,
        vec![AnimationEvent::Finished { clip: "hi".to_string() }]
    );
    assert_eq!(
        viewport.scene().animation.state(),
        &AnimationState::Idle { clip: "idle".to_string() }
    );
}

#[test]
fn commands_without_a_model_are_ignored() {
    let mut viewport = mounted();
    viewport.control_handle().play_jump_animation();
    fire(&mut viewport, 0.0);
    assert_eq!(viewport.scene().animation.state(), &AnimationState::Inactive);
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn resize_is_idempotent() {
    let mut viewport = mounted();
    for i in 0..20 {
        fire(&mut viewport, f64::from(i) * 16.0);
    }
    let primary = viewport.scene().primary.position();
    let secondaries: Vec<Vec3> = viewport
        .scene()
        .secondaries
        .iter()
        .map(|s| s.instance.position())
        .collect();

    viewport.resize(1280, 720);
    let camera = viewport.scene().camera.clone();
    viewport.resize(1280, 720);

    assert_eq!(viewport.scene().camera, camera);
    assert_eq!(viewport.scene().primary.position(), primary);
    assert_eq!(
        viewport
            .scene()
            .secondaries
            .iter()
            .map(|s| s.instance.position())
            .collect::<Vec<_>>(),
        secondaries
    );
}

#[test]
fn zero_resize_is_ignored() {
    let mut viewport = mounted();
    let camera = viewport.scene().camera.clone();
    viewport.resize(0, 0);
    viewport.resize(1024, 0);
    assert_eq!(viewport.scene().camera, camera);
}
