//! Procedural Geometry Tests
//!
//! Tests for:
//! - Primitive builders (vertex/triangle counts, bounds)
//! - Melted agent body displacement and recomputed normals
//! - Seeded determinism of fireflies and Necropolis set-pieces
//! - Reveal overlay opacity falloff
//! - Caption rasterization

use glam::{Vec2, Vec3};

use specter::config::{BackgroundKind, Color, SceneConfig};
use specter::procedural::{BackgroundScenario, BodyShape, FireflySwarm, RevealOverlay, agent_body};
use specter::resources::primitives::{
    BoxOptions, PlaneOptions, PolyhedronKind, SphereOptions, create_box, create_plane, create_polyhedron,
    create_sphere,
};
use specter::resources::{LabelTexture, rasterize_label};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Primitives
// ============================================================================

#[test]
fn sphere_counts_skip_pole_triangles() {
    let sphere = create_sphere(&SphereOptions {
        radius: 2.0,
        width_segments: 32,
        height_segments: 16,
    });
    assert_eq!(sphere.vertex_count(), 33 * 17);
    assert_eq!(sphere.triangle_count(), 2 * 32 * 15);

    let bbox = sphere.bounding_box.expect("bounds computed");
    assert!(approx(bbox.max.y, 2.0));
    assert!(approx(bbox.min.y, -2.0));
}

#[test]
fn box_has_flat_faces() {
    let geometry = create_box(&BoxOptions {
        width: 2.0,
        height: 1.0,
        depth: 4.0,
    });
    assert_eq!(geometry.vertex_count(), 24);
    assert_eq!(geometry.triangle_count(), 12);

    let bbox = geometry.bounding_box.expect("bounds computed");
    assert_eq!(bbox.size(), Vec3::new(2.0, 1.0, 4.0));
    assert!(geometry.normals().iter().all(|n| approx(n.length(), 1.0)));
}

#[test]
fn plane_faces_positive_z() {
    let plane = create_plane(&PlaneOptions {
        width: 300.0,
        height: 300.0,
        width_segments: 1,
        height_segments: 1,
    });
    assert_eq!(plane.vertex_count(), 4);
    assert_eq!(plane.triangle_count(), 2);
    assert!(plane.normals().iter().all(|n| *n == Vec3::Z));
    assert!(plane.positions().iter().all(|p| p.z == 0.0));
}

#[test]
fn polyhedra_sit_on_their_radius() {
    for kind in [PolyhedronKind::Tetrahedron, PolyhedronKind::Octahedron] {
        let geometry = create_polyhedron(kind, 0.5);
        assert!(
            geometry.positions().iter().all(|p| (p.length() - 0.5).abs() < 1e-4),
            "{kind:?} vertex off radius"
        );
    }
}

#[test]
fn every_geometry_gets_a_unique_id() {
    let a = create_sphere(&SphereOptions::default());
    let b = create_sphere(&SphereOptions::default());
    assert_ne!(a.id(), b.id());
    assert_ne!(a.id(), a.duplicate().id());
}

// ============================================================================
// Agent body
// ============================================================================

#[test]
fn body_hem_stays_within_noise_envelope() {
    let shape = BodyShape::default();
    let body = agent_body(&shape);
    assert_eq!(body.vertex_count(), 41 * 41);

    let envelope = shape.x_wave.amplitude + shape.z_wave.amplitude + shape.diagonal_wave.amplitude;
    let lowest = shape.hem_height - envelope;
    let highest_hem = shape.hem_height + envelope;

    for p in body.positions() {
        assert!(p.y >= lowest - 1e-4, "vertex below the hem: {p:?}");
        assert!(p.y <= shape.radius + 1e-4);
        if p.y < shape.melt_below {
            assert!(p.y <= highest_hem + 1e-4, "displaced vertex above the hem: {p:?}");
        }
    }
}

#[test]
fn body_normals_are_recomputed() {
    let body = agent_body(&BodyShape::default());
    let normals = body.normals();
    assert_eq!(normals.len(), body.vertex_count() as usize);

    let top = body
        .positions()
        .iter()
        .zip(&normals)
        .find(|(p, _)| approx(p.y, 2.0))
        .map(|(_, n)| *n)
        .expect("north pole vertex");
    assert!(top.y > 0.9, "pole normal should point up, got {top:?}");
}

#[test]
fn hem_is_deterministic() {
    let shape = BodyShape::default();
    assert_eq!(shape.hem_at(0.3, -0.7), shape.hem_at(0.3, -0.7));
    assert!(approx(
        shape.hem_at(0.0, 0.0),
        shape.hem_height + shape.z_wave.amplitude
    ));
}

// ============================================================================
// Seeded ambient content
// ============================================================================

#[test]
fn fireflies_depend_only_on_seed() {
    let a = FireflySwarm::new(20, 0.04, 2.6, 42);
    let b = FireflySwarm::new(20, 0.04, 2.6, 42);
    let c = FireflySwarm::new(20, 0.04, 2.6, 43);
    assert_eq!(a.fireflies, b.fireflies);
    assert_ne!(a.fireflies, c.fireflies);
}

#[test]
fn firefly_pulse_stays_in_range() {
    let mut swarm = FireflySwarm::new(20, 0.04, 2.6, 5);
    for frame in 0..300 {
        swarm.update(frame as f32 * 0.01);
        assert!(swarm.fireflies.iter().all(|f| (0.2 - 1e-5..=1.0 + 1e-5).contains(&f.pulse)));
    }
}

#[test]
fn necropolis_layout_depends_only_on_seed() {
    let config = SceneConfig {
        background: BackgroundKind::Necropolis,
        ..SceneConfig::default()
    };
    let positions = |config: &SceneConfig| match BackgroundScenario::generate(config) {
        BackgroundScenario::Necropolis(n) => n.pieces.iter().map(|p| p.transform.position).collect::<Vec<_>>(),
        BackgroundScenario::Ghost(_) => panic!("expected necropolis"),
    };

    assert_eq!(positions(&config), positions(&config));
    let reseeded = SceneConfig { seed: 7, ..config.clone() };
    assert_ne!(positions(&config), positions(&reseeded));
}

#[test]
fn scenario_selects_palette_and_camera() {
    let ghost = BackgroundScenario::generate(&SceneConfig::default());
    assert_eq!(ghost.kind(), BackgroundKind::Ghost);
    assert_eq!(ghost.clear_color(), Color::BLACK);
    assert!(ghost.reveal().is_some());

    let necropolis = BackgroundScenario::generate(&SceneConfig {
        background: BackgroundKind::Necropolis,
        ..SceneConfig::default()
    });
    assert_eq!(necropolis.kind(), BackgroundKind::Necropolis);
    assert!(necropolis.reveal().is_none());
    assert_eq!(necropolis.camera_position(), Vec3::new(0.0, 15.0, 30.0));
}

// ============================================================================
// Reveal overlay
// ============================================================================

#[test]
fn reveal_is_clear_at_agent_and_dark_far_away() {
    let mut overlay = RevealOverlay::from_config(&SceneConfig::default());
    overlay.update(0.0, Vec3::new(3.0, -2.0, 0.0));

    assert!(approx(overlay.dynamic_radius(), overlay.radius));
    assert!(approx(overlay.opacity_at(Vec2::new(3.0, -2.0)), overlay.reveal_opacity));
    assert!(approx(overlay.opacity_at(Vec2::new(200.0, 0.0)), overlay.base_opacity));

    let near = overlay.opacity_at(Vec2::new(3.0 + overlay.radius * 0.5, -2.0));
    assert!(near > overlay.reveal_opacity && near < overlay.base_opacity);
}

#[test]
fn reveal_radius_breathes() {
    let mut overlay = RevealOverlay::from_config(&SceneConfig::default());
    overlay.update(std::f32::consts::FRAC_PI_4, Vec3::ZERO);
    assert!(approx(overlay.dynamic_radius(), overlay.radius + 5.0));
}

// ============================================================================
// Labels
// ============================================================================

#[test]
fn caption_is_inked_in_its_color() {
    let img = rasterize_label("NEON SPIRITS", Color::from_hex(0x00ff_aa), 256, 64);
    let inked: Vec<_> = img.pixels().filter(|p| p.0[3] == 255).collect();
    assert!(!inked.is_empty());
    assert!(inked.iter().all(|p| p.0[..3] == [0x00, 0xff, 0xaa]));
}

#[test]
fn label_ids_are_unique() {
    let a = LabelTexture::new("A", Color::WHITE, 16, 16);
    let b = LabelTexture::new("A", Color::WHITE, 16, 16);
    assert_ne!(a.id(), b.id());
    assert_eq!(a.image.dimensions(), (16, 16));
}
