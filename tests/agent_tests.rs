//! Agent Controller Tests
//!
//! Tests for:
//! - Exponential follow: single step, convergence, strictly decreasing distance
//! - Pointer NDC to world target mapping
//! - Eye glow response to sustained movement and its decay at rest
//! - Particle emission throttle and burst sizing
//! - Secondary agent layout and drift

use fastrand::Rng;
use glam::{Vec2, Vec3};

use specter::agent::{AgentBehavior, AgentInstance, AgentTemplate, PointerSample, PrimaryAgent, layout_secondaries};
use specter::config::{SceneConfig, SecondaryGridConfig};
use specter::scene::Camera;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn agent_at(position: Vec3, follow_speed: f32) -> PrimaryAgent {
    let template = AgentTemplate::from_config(&SceneConfig::default());
    let instance = AgentInstance::new(&template, position, 1.0);
    let behavior = AgentBehavior {
        follow_speed,
        ..AgentBehavior::default()
    };
    PrimaryAgent::with_behavior(instance, behavior, 1)
}

// ============================================================================
// Follow law
// ============================================================================

#[test]
fn single_step_covers_follow_fraction() {
    let mut agent = agent_at(Vec3::new(10.0, 0.0, 0.0), 0.1);
    let moved = agent.step_towards(Vec3::ZERO);

    assert!(approx(moved, 1.0));
    let p = agent.position();
    assert!(approx(p.x, 9.0) && approx(p.y, 0.0) && approx(p.z, 0.0), "got {p:?}");
}

#[test]
fn follow_decays_geometrically() {
    let mut agent = agent_at(Vec3::new(10.0, 0.0, 0.0), 0.1);
    for _ in 0..50 {
        agent.step_towards(Vec3::ZERO);
    }
    let expected = 10.0 * 0.9_f32.powi(50);
    assert!((agent.position().x - expected).abs() < 1e-4, "got {}", agent.position().x);

    for _ in 50..100 {
        agent.step_towards(Vec3::ZERO);
    }
    assert!(agent.position().length() < 1e-3, "got {:?}", agent.position());
}

#[test]
fn distance_strictly_decreases() {
    let target = Vec3::new(-3.0, 4.0, 0.0);
    let mut agent = agent_at(Vec3::new(7.0, -2.0, 0.0), 0.075);

    let mut previous = agent.position().distance(target);
    for _ in 0..100 {
        agent.step_towards(target);
        let distance = agent.position().distance(target);
        assert!(distance < previous, "{distance} >= {previous}");
        previous = distance;
    }
}

#[test]
fn at_target_stays_put() {
    let mut agent = agent_at(Vec3::new(2.0, 1.0, 0.0), 0.3);
    let moved = agent.step_towards(Vec3::new(2.0, 1.0, 0.0));
    assert_eq!(moved, 0.0);
    assert_eq!(agent.position(), Vec3::new(2.0, 1.0, 0.0));
}

// ============================================================================
// Pointer mapping
// ============================================================================

#[test]
fn ndc_maps_onto_target_extent() {
    let agent = agent_at(Vec3::ZERO, 0.075);
    let extent = agent.behavior.target_extent;

    assert_eq!(agent.target_for(Vec2::ZERO), Vec3::ZERO);
    assert_eq!(agent.target_for(Vec2::ONE), extent.extend(0.0));
    assert_eq!(agent.target_for(Vec2::new(-1.0, 0.5)), Vec3::new(-extent.x, extent.y * 0.5, 0.0));
}

#[test]
fn update_tracks_the_pointer_target() {
    let mut agent = agent_at(Vec3::ZERO, 0.075);
    let pointer = PointerSample {
        ndc: Vec2::new(0.5, -0.5),
        ..PointerSample::default()
    };
    let goal = agent.target_for(pointer.ndc);

    for frame in 0..400 {
        agent.update(&pointer, frame as f32 * 0.01, frame as f32 * 0.016);
    }
    assert_eq!(agent.target(), goal);
    assert!(agent.position().distance(goal) < 1e-3);
}

// ============================================================================
// Eye glow
// ============================================================================

#[test]
fn eyes_light_up_while_moving_and_fade_at_rest() {
    let mut agent = agent_at(Vec3::ZERO, 0.075);
    let pointer = PointerSample::default();
    assert_eq!(agent.eye_opacity(), 0.0);

    let far = Vec3::new(11.0, 0.0, 0.0);
    for frame in 0..10 {
        agent.track(far, &pointer, frame as f32 * 0.01, frame as f32 * 0.016);
    }
    assert!(agent.current_movement() > agent.behavior.movement_threshold);
    assert!(agent.eye_opacity() > 0.5, "eye opacity {}", agent.eye_opacity());

    for frame in 10..400 {
        let here = agent.position();
        agent.track(here, &pointer, frame as f32 * 0.01, frame as f32 * 0.016);
    }
    assert!(agent.eye_opacity() < 0.01, "eye opacity {}", agent.eye_opacity());
}

// ============================================================================
// Emission
// ============================================================================

#[test]
fn no_emission_without_recent_pointer_motion() {
    let mut agent = agent_at(Vec3::ZERO, 0.075);
    let idle_pointer = PointerSample {
        ndc: Vec2::ONE,
        speed: 1.0,
        moved_recently: false,
    };
    for frame in 0..30 {
        assert!(agent.update(&idle_pointer, frame as f32 * 0.01, frame as f32 * 0.016).is_none());
    }
}

#[test]
fn emission_is_throttled() {
    let mut agent = agent_at(Vec3::ZERO, 0.075);
    let pointer = PointerSample {
        ndc: Vec2::ONE,
        speed: 0.01,
        moved_recently: true,
    };

    let mut bursts = Vec::new();
    for frame in 0..60 {
        let elapsed = frame as f32 * 0.016;
        if let Some(request) = agent.update(&pointer, frame as f32 * 0.01, elapsed) {
            bursts.push((elapsed, request));
        }
    }

    assert!(bursts.len() >= 2);
    for pair in bursts.windows(2) {
        assert!(pair[1].0 - pair[0].0 > 0.1, "bursts at {} and {}", pair[0].0, pair[1].0);
    }
    for (_, request) in &bursts {
        assert_eq!(request.count, 1, "slow pointer emits the minimum burst");
        assert!(approx(request.scatter_radius, 1.75));
    }
}

// ============================================================================
// Secondary agents
// ============================================================================

#[test]
fn layout_skips_the_cell_nearest_the_primary() {
    let template = AgentTemplate::from_config(&SceneConfig::default());
    let camera = Camera::new_perspective(75.0, 16.0 / 9.0, 0.1, 1000.0);
    let grid = SecondaryGridConfig::default();
    let mut rng = Rng::with_seed(1);

    let agents = layout_secondaries(&template, &grid, &camera, 20.0, Vec3::ZERO, &mut rng);
    assert_eq!(agents.len(), (grid.columns * grid.rows - 1) as usize);
    assert!(
        agents
            .iter()
            .all(|a| a.instance.position().truncate().distance(Vec2::ZERO) > 1e-3),
        "the centre cell belongs to the primary agent"
    );
    let indices: Vec<usize> = agents.iter().map(|a| a.index).collect();
    assert_eq!(indices, (1..=agents.len()).collect::<Vec<_>>());
}

#[test]
fn empty_grid_has_no_secondaries() {
    let template = AgentTemplate::from_config(&SceneConfig::default());
    let camera = Camera::new_perspective(75.0, 1.0, 0.1, 1000.0);
    let grid = SecondaryGridConfig {
        columns: 0,
        ..SecondaryGridConfig::default()
    };
    let agents = layout_secondaries(&template, &grid, &camera, 20.0, Vec3::ZERO, &mut Rng::with_seed(2));
    assert!(agents.is_empty());
}

#[test]
fn secondaries_drift_without_following() {
    let template = AgentTemplate::from_config(&SceneConfig::default());
    let camera = Camera::new_perspective(75.0, 1.0, 0.1, 1000.0);
    let mut agents = layout_secondaries(
        &template,
        &SecondaryGridConfig::default(),
        &camera,
        20.0,
        Vec3::ZERO,
        &mut Rng::with_seed(3),
    );
    let start: Vec<Vec3> = agents.iter().map(|a| a.instance.position()).collect();

    for frame in 1..=100 {
        for agent in &mut agents {
            agent.update(frame as f32 * 0.01, 0.35);
        }
    }

    for (agent, start) in agents.iter().zip(&start) {
        let drift = agent.instance.position() - *start;
        assert_eq!(drift.z, 0.0, "drift stays in the view plane");
        assert!(drift.truncate().length() < 2.0);
        assert!(drift.truncate().length() > 0.0);
    }
}
