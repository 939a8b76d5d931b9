use fastrand::Rng;
use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::config::SecondaryGridConfig;
use crate::scene::camera::Camera;
use crate::utils::random::random_f32_range;

use super::template::{AgentInstance, AgentTemplate};

const YAW_DRIFT: f32 = 0.002;
const PHASE_STEP: f32 = 0.7;
const TILT_DECAY: f32 = 0.95;

/// Ambient copy of the agent that drifts instead of following the pointer.
#[derive(Debug, Clone)]
pub struct SecondaryAgent {
    pub instance: AgentInstance,
    /// 1-based; 0 is the primary agent.
    pub index: usize,
    yaw: f32,
    tilt: Vec2,
}

impl SecondaryAgent {
    #[must_use]
    pub fn new(instance: AgentInstance, index: usize) -> Self {
        Self {
            instance,
            index,
            yaw: 0.0,
            tilt: Vec2::ZERO,
        }
    }

    /// Per-frame drift amplitude multiplier, cycling over three values.
    #[must_use]
    pub fn drift_scale(&self) -> f32 {
        0.4 + (self.index % 3) as f32 * 0.2
    }

    #[must_use]
    pub fn phase(&self) -> f32 {
        self.index as f32 * PHASE_STEP
    }

    pub fn update(&mut self, time: f32, wobble_amount: f32) {
        let i = self.index as f32;
        let d = self.drift_scale();
        let step = Vec2::new(
            (time * (0.3 + 0.07 * i)).sin() * 0.01 * d,
            (time * (0.25 + 0.05 * i)).cos() * 0.012 * d,
        );
        self.instance.transform.position += step.extend(0.0);
        self.yaw += YAW_DRIFT;
        self.instance.transform.rotation = Quat::from_rotation_y(self.yaw);

        // Secondaries lean along their own drift.
        let dir = step.normalize_or_zero();
        let lean = 0.1 * wobble_amount * 0.05;
        self.tilt.x = self.tilt.x * TILT_DECAY + dir.y * lean;
        self.tilt.y = self.tilt.y * TILT_DECAY - dir.x * lean;

        let phase = self.phase();
        let sway = (time * 1.4 + phase).sin() * 0.05 * wobble_amount;
        self.instance.body.rotation = Quat::from_euler(EulerRot::XYZ, self.tilt.x, sway, self.tilt.y);
        let breathe = 1.0 + (time * 2.1 + phase).sin() * 0.025 * wobble_amount;
        self.instance.body.scale = Vec3::splat(breathe);
    }
}

/// Places secondaries on a grid covering the view rectangle at
/// `grid.depth`, leaving out the cell closest to `primary_start`.
#[must_use]
pub fn layout_secondaries(
    template: &AgentTemplate,
    grid: &SecondaryGridConfig,
    camera: &Camera,
    camera_z: f32,
    primary_start: Vec3,
    rng: &mut Rng,
) -> Vec<SecondaryAgent> {
    let (cols, rows) = (grid.columns, grid.rows);
    if cols == 0 || rows == 0 {
        return Vec::new();
    }

    let half = camera.visible_half_extents(camera_z - grid.depth);
    let axis = |index: u32, count: u32, half_extent: f32| {
        if count < 2 {
            0.0
        } else {
            -half_extent + index as f32 / (count - 1) as f32 * 2.0 * half_extent
        }
    };

    let cells: Vec<Vec2> = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (c, r)))
        .map(|(c, r)| Vec2::new(axis(c, cols, half.x), axis(r, rows, half.y)))
        .collect();
    let skipped = cells
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let start = primary_start.truncate();
            a.distance_squared(start).total_cmp(&b.distance_squared(start))
        })
        .map(|(i, _)| i);

    cells
        .into_iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skipped)
        .map(|(_, cell)| cell)
        .enumerate()
        .map(|(n, cell)| {
            let z = grid.depth - 4.0 - random_f32_range(rng, 0.0, 4.0);
            let scale = 0.9 + random_f32_range(rng, 0.0, 1.2);
            let instance = AgentInstance::new(template, cell.extend(z), scale);
            SecondaryAgent::new(instance, n + 1)
        })
        .collect()
}
