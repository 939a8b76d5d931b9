//! Necropolis set-pieces
//!
//! Bone antennas, neon totems and floating cards, each a small group of
//! meshes under one transform, plus the drifting point cloud.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use fastrand::Rng;
use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::Color;
use crate::resources::geometry::{Attribute, Geometry};
use crate::resources::label::LabelTexture;
use crate::resources::material::MaterialParams;
use crate::resources::primitives::{
    BoxOptions, CylinderOptions, PlaneOptions, RingOptions, SphereOptions, TorusOptions, create_box,
    create_cylinder, create_plane, create_ring, create_sphere, create_torus,
};
use crate::scene::light::{Light, LightKind};
use crate::scene::node::MeshRef;
use crate::scene::transform::Transform;
use crate::scene::{DrawItem, Topology};
use crate::utils::random::{random_f32_range, random_signed};

pub const ANTENNA_COUNT: usize = 14;
pub const TOTEM_COUNT: usize = 10;
pub const CARD_COUNT: usize = 8;
pub const CLOUD_POINTS: usize = 700;

pub const TOTEM_RING_COLORS: [u32; 4] = [0xff00_66, 0x00ff_aa, 0x6600_ff, 0xffaa_00];

pub const CARD_CAPTIONS: [&str; 5] = [
    "ERROR 404: HUMANITY NOT FOUND",
    "GHOST IN THE MACHINE SPEAKS",
    "DIGITAL TRIBAL COLLECTIVE",
    "NEON SPIRITS GUIDE US",
    "BINARY SHAMANS CALLING",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPieceKind {
    Antenna,
    Totem,
    Card,
}

/// One mesh of a set-piece, positioned relative to the piece.
#[derive(Debug, Clone)]
pub struct SetPiecePart {
    pub local: Transform,
    pub mesh: MeshRef,
    pub label: Option<LabelTexture>,
    /// Point light carried at the part's origin.
    pub light: Option<Light>,
}

impl SetPiecePart {
    fn new(local: Transform, geometry: Arc<Geometry>, material: MaterialParams) -> Self {
        Self {
            local,
            mesh: MeshRef::new(geometry, material),
            label: None,
            light: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SetPiece {
    pub kind: SetPieceKind,
    pub transform: Transform,
    pub parts: Vec<SetPiecePart>,
    /// Cards only.
    pub float_speed: f32,
    /// Cards only, radians per frame.
    pub rotate_speed: f32,
    index: usize,
    /// Receiver spin accumulated per frame (antennas).
    spin: f32,
}

impl SetPiece {
    fn new(kind: SetPieceKind, index: usize, transform: Transform, parts: Vec<SetPiecePart>) -> Self {
        Self {
            kind,
            transform,
            parts,
            float_speed: 0.0,
            rotate_speed: 0.0,
            index,
            spin: 0.0,
        }
    }

    /// Per-frame animation; `time` is wall-clock seconds.
    pub fn update(&mut self, time: f32) {
        let phase = self.index as f32;
        match self.kind {
            SetPieceKind::Antenna => {
                self.spin += 0.02;
                if let Some(receiver) = self.parts.last_mut() {
                    let tilt = (time + phase).sin() * 0.3;
                    receiver.local.rotation = Quat::from_euler(EulerRot::XYZ, tilt, self.spin, 0.0);
                }
            }
            SetPieceKind::Totem => {
                for (child, part) in self.parts.iter_mut().enumerate() {
                    if part.light.is_some() {
                        part.mesh.material.emissive_intensity =
                            0.3 + (time * 2.0 + phase + child as f32).sin() * 0.3;
                    }
                }
            }
            SetPieceKind::Card => {
                self.transform.position.y += (time * self.float_speed).sin() * 0.01;
                let (yaw, _, _) = self.transform.rotation.to_euler(EulerRot::YXZ);
                let roll = (time * 0.5).sin() * 0.1;
                self.transform.rotation = Quat::from_euler(EulerRot::YXZ, yaw + self.rotate_speed, 0.0, roll);
            }
        }
    }

    pub fn lights(&self, out: &mut Vec<Light>) {
        let world = self.transform.compose();
        for part in &self.parts {
            if let Some(mut light) = part.light {
                if let LightKind::Point { position, .. } = &mut light.kind {
                    *position = world.transform_point3(part.local.position);
                }
                out.push(light);
            }
        }
    }

    pub fn draws(&self, out: &mut Vec<DrawItem>) {
        let world = Mat4::from(self.transform.compose());
        for part in &self.parts {
            let model = world * Mat4::from(part.local.compose());
            let mut item = DrawItem::new(Arc::clone(&part.mesh.geometry), part.mesh.material, model);
            item.label.clone_from(&part.label);
            out.push(item);
        }
    }
}

/// Geometry shared by every instance of a set-piece kind.
#[derive(Debug, Clone)]
struct SharedMeshes {
    joint: Arc<Geometry>,
    receiver: Arc<Geometry>,
    column: Arc<Geometry>,
    totem_ring: Arc<Geometry>,
    card_face: Arc<Geometry>,
    card_eye: Arc<Geometry>,
    caption: Arc<Geometry>,
}

impl SharedMeshes {
    fn new() -> Self {
        let torus = |radius: f32| {
            Arc::new(create_torus(&TorusOptions {
                radius,
                tube: 0.1,
                radial_segments: 8,
                tubular_segments: 16,
            }))
        };
        let plane = |width: f32, height: f32| {
            Arc::new(create_plane(&PlaneOptions {
                width,
                height,
                width_segments: 1,
                height_segments: 1,
            }))
        };
        Self {
            joint: Arc::new(create_sphere(&SphereOptions {
                radius: 0.4,
                width_segments: 8,
                height_segments: 6,
            })),
            receiver: torus(1.0),
            column: Arc::new(create_box(&BoxOptions {
                width: 2.0,
                height: 10.0,
                depth: 2.0,
            })),
            totem_ring: torus(1.5),
            card_face: plane(3.0, 4.0),
            card_eye: Arc::new(create_ring(&RingOptions {
                inner_radius: 0.2,
                outer_radius: 0.4,
                theta_segments: 8,
            })),
            caption: plane(6.0, 1.5),
        }
    }
}

fn antenna(rng: &mut Rng, shared: &SharedMeshes, index: usize) -> SetPiece {
    let bone = MaterialParams::lit(Color::from_hex(0xcccc_aa)).with_opacity(0.8);
    let receiver = MaterialParams::lit(Color::from_hex(0x00ff_aa))
        .with_emissive(Color::from_hex(0x0044_33), 1.0)
        .with_opacity(0.7);

    let shaft = Arc::new(create_cylinder(&CylinderOptions {
        radius_top: 0.1,
        radius_bottom: 0.3,
        height: random_f32_range(rng, 8.0, 12.0),
        radial_segments: 6,
    }));

    let mut parts = vec![SetPiecePart::new(Transform::from_position(Vec3::Y * 4.0), shaft, bone)];
    for j in 0..3 {
        parts.push(SetPiecePart::new(
            Transform::from_position(Vec3::Y * (j as f32 * 3.0 + 1.0)),
            Arc::clone(&shared.joint),
            bone,
        ));
    }
    parts.push(SetPiecePart::new(
        Transform::from_position(Vec3::Y * 8.0),
        Arc::clone(&shared.receiver),
        receiver,
    ));

    let mut transform = Transform::from_position(Vec3::new(random_signed(rng, 50.0), 0.0, random_signed(rng, 50.0)));
    transform.rotation = Quat::from_euler(
        EulerRot::YXZ,
        random_f32_range(rng, 0.0, TAU),
        0.0,
        random_signed(rng, 0.15),
    );
    SetPiece::new(SetPieceKind::Antenna, index, transform, parts)
}

fn totem(rng: &mut Rng, shared: &SharedMeshes, index: usize) -> SetPiece {
    let column = MaterialParams::lit(Color::from_hex(0x3333_33)).with_opacity(0.6);
    let mut parts = vec![SetPiecePart::new(
        Transform::from_position(Vec3::Y * 5.0),
        Arc::clone(&shared.column),
        column,
    )];

    for (j, hex) in TOTEM_RING_COLORS.iter().enumerate() {
        let color = Color::from_hex(*hex);
        let position = Vec3::Y * (j as f32 * 2.5 + 2.0);
        let mut local = Transform::from_position(position);
        local.rotation = Quat::from_rotation_x(FRAC_PI_2);
        let material = MaterialParams::lit(color).with_emissive(color, 0.5).with_opacity(0.8);
        let mut ring = SetPiecePart::new(local, Arc::clone(&shared.totem_ring), material);
        ring.light = Some(Light::point(color, 0.5, position, 10.0));
        parts.push(ring);
    }

    let transform = Transform::from_position(Vec3::new(random_signed(rng, 40.0), 0.0, random_signed(rng, 40.0)));
    SetPiece::new(SetPieceKind::Totem, index, transform, parts)
}

fn card(rng: &mut Rng, shared: &SharedMeshes, index: usize) -> SetPiece {
    let face = MaterialParams::lit(Color::from_hex(0x2222_22)).with_opacity(0.7).double_sided();
    let eye_color = Color::from_hex(0xff00_66);
    let eye = MaterialParams::lit(eye_color).with_emissive(eye_color, 0.3).with_opacity(0.8);

    let mut parts = vec![SetPiecePart::new(Transform::new(), Arc::clone(&shared.card_face), face)];
    for x in [-0.6, 0.6] {
        parts.push(SetPiecePart::new(
            Transform::from_position(Vec3::new(x, 0.5, 0.01)),
            Arc::clone(&shared.card_eye),
            eye,
        ));
    }

    let caption_text = CARD_CAPTIONS[index % CARD_CAPTIONS.len()];
    let mut caption = SetPiecePart::new(
        Transform::from_position(Vec3::Y * -3.0),
        Arc::clone(&shared.caption),
        MaterialParams::unlit(Color::WHITE).with_opacity(0.8),
    );
    caption.label = Some(LabelTexture::new(caption_text, Color::from_hex(0x00ff_aa), 512, 128));
    parts.push(caption);

    let transform = Transform::from_position(Vec3::new(
        random_signed(rng, 30.0),
        random_f32_range(rng, 8.0, 18.0),
        random_signed(rng, 30.0),
    ));
    let mut piece = SetPiece::new(SetPieceKind::Card, index, transform, parts);
    piece.float_speed = random_f32_range(rng, 0.01, 0.03);
    piece.rotate_speed = random_f32_range(rng, 0.005, 0.015);
    piece
}

/// Generates every Necropolis set-piece: antennas, then totems, then cards.
#[must_use]
pub fn generate_set_pieces(rng: &mut Rng) -> Vec<SetPiece> {
    let shared = SharedMeshes::new();
    let mut pieces = Vec::with_capacity(ANTENNA_COUNT + TOTEM_COUNT + CARD_COUNT);
    pieces.extend((0..ANTENNA_COUNT).map(|i| antenna(rng, &shared, i)));
    pieces.extend((0..TOTEM_COUNT).map(|i| totem(rng, &shared, i)));
    pieces.extend((0..CARD_COUNT).map(|i| card(rng, &shared, i)));
    pieces
}

/// Slowly rotating cloud of tinted points.
#[derive(Debug, Clone)]
pub struct PointCloud {
    pub geometry: Arc<Geometry>,
    pub material: MaterialParams,
    pub rotation_y: f32,
    base_heights: Vec<f32>,
}

impl PointCloud {
    #[must_use]
    pub fn generate(rng: &mut Rng, count: usize) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push([
                random_signed(rng, 100.0),
                random_f32_range(rng, 0.0, 50.0),
                random_signed(rng, 100.0),
            ]);
            let tint = Color::from_hsl(random_f32_range(rng, 0.5, 0.8), 1.0, 0.5).to_linear();
            colors.push(tint.to_array());
        }

        let mut geometry = Geometry::new();
        geometry.set_attribute("position", Attribute::new_planar(&positions, wgpu::VertexFormat::Float32x3));
        geometry.set_attribute("color", Attribute::new_planar(&colors, wgpu::VertexFormat::Float32x3));
        geometry.compute_bounding_volume();

        Self {
            base_heights: positions.iter().map(|p| p[1]).collect(),
            geometry: Arc::new(geometry),
            material: MaterialParams::unlit(Color::WHITE).with_opacity(0.6),
            rotation_y: 0.0,
        }
    }

    /// Spins the cloud and bobs each point around its generated height.
    pub fn update(&mut self, time: f32) {
        self.rotation_y += 0.001;
        let mut positions = self.geometry.positions();
        for (i, (p, base)) in positions.iter_mut().zip(&self.base_heights).enumerate() {
            p.y = base + (time + (i * 3 + 1) as f32).sin() * 0.5;
        }
        Arc::make_mut(&mut self.geometry).set_positions(&positions);
    }

    pub fn draws(&self, out: &mut Vec<DrawItem>) {
        let model = Mat4::from_rotation_y(self.rotation_y);
        let mut item = DrawItem::new(Arc::clone(&self.geometry), self.material, model);
        item.topology = Topology::Points;
        out.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_layout_follow_the_scenario() {
        let mut rng = Rng::with_seed(42);
        let pieces = generate_set_pieces(&mut rng);
        let count = |kind| pieces.iter().filter(|p| p.kind == kind).count();
        assert_eq!(count(SetPieceKind::Antenna), ANTENNA_COUNT);
        assert_eq!(count(SetPieceKind::Totem), TOTEM_COUNT);
        assert_eq!(count(SetPieceKind::Card), CARD_COUNT);

        for piece in &pieces {
            let p = piece.transform.position;
            match piece.kind {
                SetPieceKind::Antenna => assert!(p.x.abs() <= 50.0 && p.z.abs() <= 50.0),
                SetPieceKind::Totem => {
                    assert!(p.x.abs() <= 40.0 && p.z.abs() <= 40.0);
                    assert_eq!(piece.parts.iter().filter(|part| part.light.is_some()).count(), 4);
                }
                SetPieceKind::Card => {
                    assert!((8.0..18.0).contains(&p.y));
                    assert!(piece.parts.iter().any(|part| part.label.is_some()));
                }
            }
        }
    }
}
