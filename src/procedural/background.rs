use std::f32::consts::FRAC_PI_4;
use std::sync::Arc;

use fastrand::Rng;
use glam::{Mat4, Vec3};

use crate::config::{BackgroundKind, Color, SceneConfig};
use crate::procedural::fireflies::{FIREFLY_COUNT, FireflySwarm};
use crate::procedural::reveal::{OVERLAY_DEPTH, OVERLAY_SIZE, RevealOverlay};
use crate::procedural::set_pieces::{CLOUD_POINTS, PointCloud, SetPiece, generate_set_pieces};
use crate::resources::geometry::Geometry;
use crate::resources::material::{BlendMode, MaterialParams, ShadingModel};
use crate::resources::primitives::{PlaneOptions, create_plane};
use crate::scene::DrawItem;
use crate::scene::light::{Fog, Light};

/// Ambient content of the Ghost scenario.
#[derive(Debug)]
pub struct GhostBackground {
    pub fireflies: FireflySwarm,
    pub reveal: RevealOverlay,
    pub rim_light_intensity: f32,
    overlay: Arc<Geometry>,
}

impl GhostBackground {
    #[must_use]
    pub fn generate(config: &SceneConfig, seed: u64) -> Self {
        Self {
            fireflies: FireflySwarm::new(FIREFLY_COUNT, config.firefly_speed, config.firefly_glow_intensity, seed),
            reveal: RevealOverlay::from_config(config),
            rim_light_intensity: config.rim_light_intensity,
            overlay: Arc::new(create_plane(&PlaneOptions {
                width: OVERLAY_SIZE,
                height: OVERLAY_SIZE,
                width_segments: 1,
                height_segments: 1,
            })),
        }
    }
}

/// Ambient content of the Necropolis scenario.
#[derive(Debug)]
pub struct Necropolis {
    pub pieces: Vec<SetPiece>,
    pub cloud: PointCloud,
}

impl Necropolis {
    #[must_use]
    pub fn generate(seed: u64) -> Self {
        let mut rng = Rng::with_seed(seed);
        let pieces = generate_set_pieces(&mut rng);
        let cloud = PointCloud::generate(&mut rng, CLOUD_POINTS);
        Self { pieces, cloud }
    }
}

/// The ambient scene, chosen once when the scene is built.
#[derive(Debug)]
pub enum BackgroundScenario {
    Ghost(GhostBackground),
    Necropolis(Necropolis),
}

impl BackgroundScenario {
    #[must_use]
    pub fn generate(config: &SceneConfig) -> Self {
        let seed = config.seed ^ 0xb4c6_97d0;
        match config.background {
            BackgroundKind::Ghost => Self::Ghost(GhostBackground::generate(config, seed)),
            BackgroundKind::Necropolis => Self::Necropolis(Necropolis::generate(seed)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> BackgroundKind {
        match self {
            Self::Ghost(_) => BackgroundKind::Ghost,
            Self::Necropolis(_) => BackgroundKind::Necropolis,
        }
    }

    /// `elapsed` is wall-clock seconds, `sim_time` the scaled frame time the
    /// agent runs on.
    pub fn update(&mut self, elapsed: f32, sim_time: f32, agent_position: Vec3) {
        match self {
            Self::Ghost(ghost) => {
                ghost.fireflies.update(sim_time);
                ghost.reveal.update(sim_time, agent_position);
            }
            Self::Necropolis(necropolis) => {
                for piece in &mut necropolis.pieces {
                    piece.update(elapsed);
                }
                necropolis.cloud.update(elapsed);
            }
        }
    }

    #[must_use]
    pub fn clear_color(&self) -> Color {
        match self {
            Self::Ghost(_) => Color::BLACK,
            Self::Necropolis(_) => Color::from_hex(0x00_0811),
        }
    }

    #[must_use]
    pub fn fog(&self) -> Fog {
        match self {
            Self::Ghost(_) => Fog::exp2(Color::BLACK, 0.001),
            Self::Necropolis(_) => Fog::exp2(Color::from_hex(0x00_0811), 0.002),
        }
    }

    /// Where the orbit camera starts.
    #[must_use]
    pub fn camera_position(&self) -> Vec3 {
        match self {
            Self::Ghost(_) => Vec3::new(0.0, 0.0, 20.0),
            Self::Necropolis(_) => Vec3::new(0.0, 15.0, 30.0),
        }
    }

    #[must_use]
    pub fn reveal(&self) -> Option<&RevealOverlay> {
        match self {
            Self::Ghost(ghost) => Some(&ghost.reveal),
            Self::Necropolis(_) => None,
        }
    }

    pub fn lights(&self, out: &mut Vec<Light>) {
        match self {
            Self::Ghost(ghost) => {
                out.push(Light::ambient(Color::from_hex(0x0a_0a2e), 0.08));
                out.push(Light::directional(
                    Color::from_hex(0x4a90_e2),
                    ghost.rim_light_intensity,
                    Vec3::new(-8.0, 6.0, -4.0),
                ));
                out.push(Light::directional(
                    Color::from_hex(0x50e3_c2),
                    ghost.rim_light_intensity * 0.7,
                    Vec3::new(8.0, -4.0, -6.0),
                ));
                ghost.fireflies.lights(out);
            }
            Self::Necropolis(necropolis) => {
                out.push(Light::ambient(Color::from_hex(0x00_1122), 0.3));
                out.push(Light::spot(
                    Color::from_hex(0x00ff_aa),
                    1.0,
                    Vec3::new(0.0, 50.0, 0.0),
                    Vec3::ZERO,
                    100.0,
                    FRAC_PI_4,
                ));
                for piece in &necropolis.pieces {
                    piece.lights(out);
                }
            }
        }
    }

    pub fn draws(&self, out: &mut Vec<DrawItem>) {
        match self {
            Self::Ghost(ghost) => {
                let overlay = MaterialParams {
                    color: Vec3::new(0.001, 0.001, 0.002),
                    ..MaterialParams::default()
                }
                .with_shading(ShadingModel::Reveal)
                .with_opacity(ghost.reveal.base_opacity)
                .with_blend(BlendMode::Transparent);
                out.push(DrawItem::new(
                    Arc::clone(&ghost.overlay),
                    overlay,
                    Mat4::from_translation(Vec3::Z * OVERLAY_DEPTH),
                ));
                ghost.fireflies.draws(out);
            }
            Self::Necropolis(necropolis) => {
                for piece in &necropolis.pieces {
                    piece.draws(out);
                }
                necropolis.cloud.draws(out);
            }
        }
    }
}
