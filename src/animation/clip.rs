use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::KeyframeTrack;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(track) => track.end_time(),
            TrackData::Quaternion(track) => track.end_time(),
        }
    }
}

/// Keyframes plus the node channel they drive.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    #[must_use]
    pub fn translation(node_name: impl Into<String>, track: KeyframeTrack<Vec3>) -> Self {
        Self::with_meta(node_name, TargetPath::Translation, TrackData::Vector3(track))
    }

    #[must_use]
    pub fn rotation(node_name: impl Into<String>, track: KeyframeTrack<Quat>) -> Self {
        Self::with_meta(node_name, TargetPath::Rotation, TrackData::Quaternion(track))
    }

    #[must_use]
    pub fn scale(node_name: impl Into<String>, track: KeyframeTrack<Vec3>) -> Self {
        Self::with_meta(node_name, TargetPath::Scale, TrackData::Vector3(track))
    }

    fn with_meta(node_name: impl Into<String>, target: TargetPath, data: TrackData) -> Self {
        Self {
            meta: TrackMeta {
                node_name: node_name.into(),
                target,
            },
            data,
        }
    }
}

/// A named, finite set of tracks. Duration is the latest keyframe time.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(|t| t.data.end_time()).fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Every `(node, channel)` pair this clip writes to, without duplicates.
    #[must_use]
    pub fn perturbed_channels(&self) -> Vec<TrackMeta> {
        let mut channels: Vec<TrackMeta> = Vec::with_capacity(self.tracks.len());
        for track in &self.tracks {
            if !channels.contains(&track.meta) {
                channels.push(track.meta.clone());
            }
        }
        channels
    }
}
