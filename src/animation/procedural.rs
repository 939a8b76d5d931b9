//! Procedural clips
//!
//! Short keyframe clips generated in code for models that ship without their
//! own animation. Every value is an offset from the pose captured when the
//! model was attached, so a clip never drags a node away from where the
//! asset placed it.

use glam::{EulerRot, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track, TrackMeta};
use crate::animation::tracks::KeyframeTrack;
use crate::scene::NodeHandle;
use crate::scene::graph::NodeGraph;

pub const IDLE: &str = "idle";
pub const WAVE: &str = "wave";
pub const DANCE: &str = "dance";
pub const HI: &str = "hi";
pub const JUMP: &str = "jump";

/// Clip names that play once and then fall back to idle.
pub const ONE_SHOT_CLIPS: [&str; 2] = [HI, JUMP];

pub const RIGHT_ARM: &str = "RightArm";
pub const RIGHT_FORE_ARM: &str = "RightForeArm";
pub const HEAD: &str = "Head";
pub const SPINE: &str = "Spine";
pub const HIPS: &str = "Hips";

pub const JOINTS: [&str; 5] = [RIGHT_ARM, RIGHT_FORE_ARM, HEAD, SPINE, HIPS];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for JointPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Local transforms of the model root and the known joints at attach time.
#[derive(Debug, Clone, Default)]
pub struct RestPose {
    root_name: String,
    poses: FxHashMap<String, JointPose>,
}

impl RestPose {
    /// Records the root plus every joint in [`JOINTS`] found under it.
    #[must_use]
    pub fn capture(graph: &NodeGraph, root: NodeHandle) -> Self {
        let mut rest = Self::default();
        if let Some(node) = graph.get(root) {
            rest.root_name.clone_from(&node.name);
            rest.poses.insert(node.name.clone(), pose_of(graph, root));
        }
        for joint in JOINTS {
            if let Some(handle) = graph.find_by_name(root, joint) {
                rest.poses.insert(joint.to_string(), pose_of(graph, handle));
            }
        }
        rest
    }

    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Rest pose of `name`, identity for joints the model lacks.
    #[must_use]
    pub fn get(&self, name: &str) -> JointPose {
        self.poses.get(name).copied().unwrap_or_default()
    }

    /// Writes the captured values back into the listed channels.
    pub fn restore(&self, graph: &mut NodeGraph, root: NodeHandle, channels: &[TrackMeta]) {
        for channel in channels {
            let Some(pose) = self.poses.get(&channel.node_name) else {
                continue;
            };
            let Some(handle) = graph.find_by_name(root, &channel.node_name) else {
                continue;
            };
            let Some(node) = graph.get_mut(handle) else {
                continue;
            };
            match channel.target {
                TargetPath::Translation => node.transform.position = pose.position,
                TargetPath::Rotation => node.transform.rotation = pose.rotation,
                TargetPath::Scale => node.transform.scale = pose.scale,
            }
        }
    }
}

fn pose_of(graph: &NodeGraph, handle: NodeHandle) -> JointPose {
    graph
        .get(handle)
        .map(|node| JointPose {
            position: node.transform.position,
            rotation: node.transform.rotation,
            scale: node.transform.scale,
        })
        .unwrap_or_default()
}

fn offset_track(rest: Vec3, times: &[f32], offsets: &[Vec3]) -> KeyframeTrack<Vec3> {
    KeyframeTrack::linear(times.to_vec(), offsets.iter().map(|o| rest + *o).collect())
}

fn scale_track(rest: Vec3, times: &[f32], factors: &[Vec3]) -> KeyframeTrack<Vec3> {
    KeyframeTrack::linear(times.to_vec(), factors.iter().map(|f| rest * *f).collect())
}

/// Euler offsets (XYZ, radians) applied on top of the rest rotation.
fn euler_track(rest: Quat, times: &[f32], eulers: &[Vec3]) -> KeyframeTrack<Quat> {
    KeyframeTrack::linear(
        times.to_vec(),
        eulers
            .iter()
            .map(|e| rest * Quat::from_euler(EulerRot::XYZ, e.x, e.y, e.z))
            .collect(),
    )
}

/// Slow breathing: root scale swell and a slight spine sway. 4 s.
fn idle_clip(rest: &RestPose) -> AnimationClip {
    let root = rest.root_name();
    let times = [0.0, 1.0, 2.0, 3.0, 4.0];
    let root_pose = rest.get(root);
    let spine = rest.get(SPINE);
    AnimationClip::new(
        IDLE,
        vec![
            Track::scale(
                root,
                scale_track(
                    root_pose.scale,
                    &times,
                    &[
                        Vec3::ONE,
                        Vec3::new(1.01, 1.02, 1.01),
                        Vec3::ONE,
                        Vec3::new(1.01, 1.02, 1.01),
                        Vec3::ONE,
                    ],
                ),
            ),
            Track::translation(
                root,
                offset_track(
                    root_pose.position,
                    &times,
                    &[Vec3::ZERO, Vec3::Y * 0.03, Vec3::ZERO, Vec3::Y * 0.03, Vec3::ZERO],
                ),
            ),
            Track::rotation(
                SPINE,
                euler_track(
                    spine.rotation,
                    &times,
                    &[Vec3::ZERO, Vec3::X * 0.03, Vec3::ZERO, Vec3::X * -0.03, Vec3::ZERO],
                ),
            ),
        ],
    )
}

/// Raised right arm waving from the elbow. 3 s.
fn wave_clip(rest: &RestPose) -> AnimationClip {
    let root = rest.root_name();
    let arm_times = [0.0, 0.4, 2.6, 3.0];
    let fore_times = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0];
    AnimationClip::new(
        WAVE,
        vec![
            Track::rotation(
                RIGHT_ARM,
                euler_track(
                    rest.get(RIGHT_ARM).rotation,
                    &arm_times,
                    &[Vec3::ZERO, Vec3::Z * -1.2, Vec3::Z * -1.2, Vec3::ZERO],
                ),
            ),
            Track::rotation(
                RIGHT_FORE_ARM,
                euler_track(
                    rest.get(RIGHT_FORE_ARM).rotation,
                    &fore_times,
                    &[
                        Vec3::ZERO,
                        Vec3::Z * 0.4,
                        Vec3::Z * -0.4,
                        Vec3::Z * 0.4,
                        Vec3::Z * -0.4,
                        Vec3::Z * 0.4,
                        Vec3::ZERO,
                    ],
                ),
            ),
            Track::rotation(
                root,
                euler_track(
                    rest.get(root).rotation,
                    &[0.0, 1.5, 3.0],
                    &[Vec3::ZERO, Vec3::Y * 0.1, Vec3::ZERO],
                ),
            ),
        ],
    )
}

/// Side-to-side sway with a bounce on every beat. 2 s.
fn dance_clip(rest: &RestPose) -> AnimationClip {
    let root = rest.root_name();
    let times = [0.0, 0.5, 1.0, 1.5, 2.0];
    AnimationClip::new(
        DANCE,
        vec![
            Track::translation(
                root,
                offset_track(
                    rest.get(root).position,
                    &times,
                    &[
                        Vec3::ZERO,
                        Vec3::new(0.1, 0.08, 0.0),
                        Vec3::ZERO,
                        Vec3::new(-0.1, 0.08, 0.0),
                        Vec3::ZERO,
                    ],
                ),
            ),
            Track::rotation(
                root,
                euler_track(
                    rest.get(root).rotation,
                    &times,
                    &[Vec3::ZERO, Vec3::Y * 0.25, Vec3::ZERO, Vec3::Y * -0.25, Vec3::ZERO],
                ),
            ),
            Track::rotation(
                HIPS,
                euler_track(
                    rest.get(HIPS).rotation,
                    &times,
                    &[Vec3::ZERO, Vec3::Z * 0.12, Vec3::ZERO, Vec3::Z * -0.12, Vec3::ZERO],
                ),
            ),
            Track::rotation(
                HEAD,
                euler_track(
                    rest.get(HEAD).rotation,
                    &times,
                    &[Vec3::ZERO, Vec3::Z * -0.15, Vec3::ZERO, Vec3::Z * 0.15, Vec3::ZERO],
                ),
            ),
        ],
    )
}

/// Greeting: arm up, three quick waves, head tilt. 2.5 s.
fn hi_clip(rest: &RestPose) -> AnimationClip {
    let root = rest.root_name();
    let fore_times = [0.0, 0.4, 0.7, 1.0, 1.3, 1.6, 1.9, 2.5];
    AnimationClip::new(
        HI,
        vec![
            Track::rotation(
                RIGHT_ARM,
                euler_track(
                    rest.get(RIGHT_ARM).rotation,
                    &[0.0, 0.3, 2.1, 2.5],
                    &[Vec3::ZERO, Vec3::new(0.0, 0.2, -1.4), Vec3::new(0.0, 0.2, -1.4), Vec3::ZERO],
                ),
            ),
            Track::rotation(
                RIGHT_FORE_ARM,
                euler_track(
                    rest.get(RIGHT_FORE_ARM).rotation,
                    &fore_times,
                    &[
                        Vec3::ZERO,
                        Vec3::Z * 0.5,
                        Vec3::Z * -0.3,
                        Vec3::Z * 0.5,
                        Vec3::Z * -0.3,
                        Vec3::Z * 0.5,
                        Vec3::Z * -0.3,
                        Vec3::ZERO,
                    ],
                ),
            ),
            Track::rotation(
                HEAD,
                euler_track(
                    rest.get(HEAD).rotation,
                    &[0.0, 0.5, 2.0, 2.5],
                    &[Vec3::ZERO, Vec3::Z * 0.12, Vec3::Z * 0.12, Vec3::ZERO],
                ),
            ),
            Track::rotation(
                root,
                euler_track(
                    rest.get(root).rotation,
                    &[0.0, 0.6, 1.25, 1.9, 2.5],
                    &[Vec3::ZERO, Vec3::X * 0.06, Vec3::ZERO, Vec3::X * 0.06, Vec3::ZERO],
                ),
            ),
        ],
    )
}

/// Crouch, hop and land with a squash. 1.5 s.
fn jump_clip(rest: &RestPose) -> AnimationClip {
    let root = rest.root_name();
    let root_pose = rest.get(root);
    let times = [0.0, 0.3, 0.75, 1.2, 1.5];
    AnimationClip::new(
        JUMP,
        vec![
            Track::translation(
                root,
                offset_track(
                    root_pose.position,
                    &times,
                    &[
                        Vec3::ZERO,
                        Vec3::Y * -0.15,
                        Vec3::Y * 1.2,
                        Vec3::Y * -0.1,
                        Vec3::ZERO,
                    ],
                ),
            ),
            Track::scale(
                root,
                scale_track(
                    root_pose.scale,
                    &times,
                    &[
                        Vec3::ONE,
                        Vec3::new(1.06, 0.9, 1.06),
                        Vec3::new(0.96, 1.06, 0.96),
                        Vec3::new(1.08, 0.88, 1.08),
                        Vec3::ONE,
                    ],
                ),
            ),
            Track::rotation(
                SPINE,
                euler_track(
                    rest.get(SPINE).rotation,
                    &times,
                    &[Vec3::ZERO, Vec3::X * 0.2, Vec3::X * -0.1, Vec3::X * 0.15, Vec3::ZERO],
                ),
            ),
        ],
    )
}

/// Every procedural clip, built against `rest`.
#[must_use]
pub fn build_clips(rest: &RestPose) -> Vec<AnimationClip> {
    vec![
        idle_clip(rest),
        wave_clip(rest),
        dance_clip(rest),
        hi_clip(rest),
        jump_clip(rest),
    ]
}
