//! Ghost Viewer
//!
//! Opens a window with the default ghost scene and attaches a small
//! block-figure rig so the clip controller has joints to drive.
//!
//! Usage:
//!
//! ```text
//! cargo run --example ghost_viewer -- [config.json]
//! ```
//!
//! Controls:
//! - Move the pointer: the ghost follows
//! - Left drag / right drag / scroll: orbit, pan, zoom
//! - H: wave hi, J: jump, I: back to idle, S: stop

use std::sync::Arc;

use glam::Vec3;
use specter::app::winit::App;
use specter::config::{Color, SceneConfig};
use specter::resources::MaterialParams;
use specter::resources::primitives::{BoxOptions, SphereOptions, create_box, create_sphere};
use specter::scene::{AssetNode, MeshRef, SceneAsset, Transform};

fn block(width: f32, height: f32, depth: f32, color: u32) -> MeshRef {
    MeshRef::new(
        Arc::new(create_box(&BoxOptions { width, height, depth })),
        MaterialParams::lit(Color::from_hex(color)),
    )
}

fn block_figure() -> SceneAsset {
    let fore_arm = AssetNode::new("RightForeArm")
        .with_transform(Transform::from_position(Vec3::new(0.5, 0.0, 0.0)))
        .with_mesh(block(0.5, 0.15, 0.15, 0x00ff_aa));
    let arm = AssetNode::new("RightArm")
        .with_transform(Transform::from_position(Vec3::new(0.45, 0.55, 0.0)))
        .with_mesh(block(0.5, 0.18, 0.18, 0x00ff_aa))
        .with_child(fore_arm);
    let head = AssetNode::new("Head")
        .with_transform(Transform::from_position(Vec3::new(0.0, 0.9, 0.0)))
        .with_mesh(MeshRef::new(
            Arc::new(create_sphere(&SphereOptions {
                radius: 0.3,
                width_segments: 16,
                height_segments: 12,
            })),
            MaterialParams::lit(Color::from_hex(0xff14_93)),
        ));
    let spine = AssetNode::new("Spine")
        .with_transform(Transform::from_position(Vec3::new(0.0, 0.4, 0.0)))
        .with_mesh(block(0.7, 1.0, 0.35, 0x9400_d3))
        .with_child(arm)
        .with_child(head);
    let hips = AssetNode::new("Hips").with_mesh(block(0.6, 0.3, 0.3, 0x0080_ff)).with_child(spine);

    SceneAsset::new(AssetNode::new("Armature").with_child(hips))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            SceneConfig::from_json_file(&path)?
        }
        None => SceneConfig::default(),
    };

    App::new()
        .with_title("Specter Ghost Viewer")
        .with_config(config)
        .with_asset(block_figure())
        .run()?;
    Ok(())
}
