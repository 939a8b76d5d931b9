//! Post-Processing Pipeline Tests
//!
//! Tests for:
//! - Fixed pass order and per-frame uniform refresh
//! - Uniform block layouts shared with the WGSL shaders
//! - CPU rendition of the analog decay shader (identity, vignette, limbo)
//! - Output tone mapping curves

use glam::{Vec2, Vec3, Vec4};

use specter::config::AnalogDecayConfig;
use specter::renderer::post::analog::vsync_triggered;
use specter::renderer::post::{
    AnalogDecayUniforms, BloomUniforms, OutputSettings, OutputUniforms, PassKind, PostProcessPipeline,
    ToneMappingMode, aces_filmic, shade,
};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn only(config: AnalogDecayConfig) -> AnalogDecayUniforms {
    AnalogDecayUniforms::from_config(&config)
}

fn all_off() -> AnalogDecayConfig {
    AnalogDecayConfig {
        intensity: 0.6,
        grain: 0.0,
        bleeding: 0.0,
        vsync: 0.0,
        scanlines: 0.0,
        vignette: 0.0,
        jitter: 0.0,
        limbo: false,
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn passes_run_in_fixed_order() {
    let pipeline = PostProcessPipeline::default();
    assert_eq!(
        pipeline.passes(),
        &[
            PassKind::SceneRender,
            PassKind::Bloom,
            PassKind::AnalogDecay,
            PassKind::Output
        ]
    );
    assert_eq!(PassKind::AnalogDecay.name(), "Analog Decay");
}

#[test]
fn update_only_touches_time_and_resolution() {
    let mut pipeline = PostProcessPipeline::default();
    let before = *pipeline.analog();

    pipeline.update(1.5, Vec2::new(1920.0, 1080.0));
    let after = *pipeline.analog();

    assert!(approx(after.time, 1.5));
    assert_eq!(after.resolution, [1920.0, 1080.0]);
    assert_eq!(pipeline.resolution(), Vec2::new(1920.0, 1080.0));
    assert_eq!(pipeline.frames(), 1);
    assert_eq!(
        AnalogDecayUniforms {
            time: before.time,
            resolution: before.resolution,
            ..after
        },
        before
    );
}

#[test]
fn set_analog_keeps_the_clock() {
    let mut pipeline = PostProcessPipeline::default();
    pipeline.update(3.0, Vec2::new(800.0, 600.0));
    pipeline.set_analog(&AnalogDecayConfig {
        limbo: true,
        ..AnalogDecayConfig::default()
    });

    assert!(approx(pipeline.analog().time, 3.0));
    assert_eq!(pipeline.analog().resolution, [800.0, 600.0]);
    assert!(approx(pipeline.analog().limbo, 1.0));
}

// ============================================================================
// Uniform layouts
// ============================================================================

#[test]
fn uniform_blocks_are_16_byte_aligned() {
    assert_eq!(std::mem::size_of::<AnalogDecayUniforms>(), 48);
    assert_eq!(std::mem::size_of::<BloomUniforms>(), 32);
    assert_eq!(std::mem::size_of::<OutputUniforms>(), 16);
}

#[test]
fn output_uniforms_encode_mode() {
    let linear = OutputSettings {
        mode: ToneMappingMode::Linear,
        exposure: 1.2,
    };
    assert_eq!(linear.uniforms().mode, 0);
    assert_eq!(OutputSettings::default().uniforms().mode, 1);
    assert!(approx(linear.uniforms().exposure, 1.2));
}

// ============================================================================
// Analog decay shading
// ============================================================================

#[test]
fn zero_intensity_is_identity() {
    let mut uniforms = only(AnalogDecayConfig {
        intensity: 0.0,
        ..AnalogDecayConfig::default()
    });
    uniforms.time = 12.3;
    let sample = |uv: Vec2| Vec4::new(uv.x, uv.y, 0.5, 1.0);

    for uv in [Vec2::new(0.1, 0.2), Vec2::new(0.5, 0.5), Vec2::new(0.9, 0.7)] {
        assert_eq!(shade(&uniforms, uv, sample), sample(uv));
    }
}

#[test]
fn vignette_darkens_corners_only() {
    let uniforms = only(AnalogDecayConfig {
        vignette: 1.0,
        ..all_off()
    });
    let white = |_: Vec2| Vec4::ONE;

    let centre = shade(&uniforms, Vec2::splat(0.5), white);
    assert_eq!(centre, Vec4::ONE);

    let corner = shade(&uniforms, Vec2::ZERO, white);
    assert!(approx(corner.x, 1.0 - 2.0 * 0.3 * 0.6), "corner {corner:?}");
    assert!(approx(corner.w, 1.0), "alpha is untouched");
}

#[test]
fn limbo_desaturates() {
    let uniforms = only(AnalogDecayConfig { limbo: true, ..all_off() });
    let out = shade(&uniforms, Vec2::splat(0.5), |_| Vec4::new(1.0, 0.2, 0.0, 1.0));
    assert!(approx(out.x, out.y) && approx(out.y, out.z));
    assert!(approx(out.x, 0.299 + 0.2 * 0.587));
}

#[test]
fn grain_only_brightens() {
    let uniforms = only(AnalogDecayConfig { grain: 1.0, ..all_off() });
    for i in 0..20 {
        let uv = Vec2::new(i as f32 * 0.05, 0.3);
        let out = shade(&uniforms, uv, |_| Vec4::new(0.2, 0.2, 0.2, 1.0));
        assert!(out.x >= 0.2 - EPSILON && out.x <= 1.0);
    }
}

#[test]
fn vsync_roll_is_constant_within_quarter_seconds() {
    for k in 0..40 {
        let start = k as f32 * 0.25;
        let first = vsync_triggered(start + 0.01);
        assert_eq!(first, vsync_triggered(start + 0.2));
    }
}

// ============================================================================
// Tone mapping
// ============================================================================

#[test]
fn aces_maps_black_to_black_and_saturates_white() {
    assert_eq!(aces_filmic(Vec3::ZERO, 1.0), Vec3::ZERO);
    assert_eq!(aces_filmic(Vec3::splat(100.0), 1.0), Vec3::ONE);
}

#[test]
fn aces_is_monotonic_on_gray() {
    let mut previous = 0.0;
    for i in 1..50 {
        let v = aces_filmic(Vec3::splat(i as f32 * 0.05), 0.9).x;
        assert!(v >= previous, "{v} < {previous}");
        previous = v;
    }
}

#[test]
fn linear_mode_scales_and_clamps() {
    let settings = OutputSettings {
        mode: ToneMappingMode::Linear,
        exposure: 0.9,
    };
    assert!(approx(settings.apply(Vec3::splat(0.5)).x, 0.45));
    assert_eq!(settings.apply(Vec3::splat(4.0)), Vec3::ONE);
}
