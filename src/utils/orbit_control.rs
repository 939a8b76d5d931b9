use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};

use crate::resources::input::{DragButton, Input};
use crate::scene::transform::Transform;

/// Spherical-coordinate camera controller: rotate-drag orbits, pan-drag
/// moves the center, the wheel zooms.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 1.0,
            max_distance: 1000.0,

            center,
            radius,
            theta: 0.0,
            phi: FRAC_PI_2,

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Controller that starts with the camera at `position`.
    #[must_use]
    pub fn looking_from(position: Vec3, center: Vec3) -> Self {
        let offset = position - center;
        let radius = offset.length().max(f32::EPSILON);
        let mut controls = Self::new(center, radius);
        controls.theta = offset.x.atan2(offset.z);
        controls.phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        controls
    }

    /// Where the camera sits for the current angles.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.center + Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta) * self.radius
    }

    pub fn update(&mut self, transform: &mut Transform, input: &Input, fov_radians: f32, dt: f32) {
        let screen_height = input.screen_size().y.max(1.0);
        let pointer_delta = input.pointer_delta();

        if input.is_dragging(DragButton::Rotate) {
            let rotate_per_pixel = TAU / screen_height;
            self.rotate_delta -= pointer_delta * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        const EPS: f32 = 0.0001;
        self.phi = self.phi.clamp(EPS, PI - EPS);

        let wheel = input.wheel_delta();
        if wheel != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(wheel.abs());
            if wheel > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        if input.is_dragging(DragButton::Pan) {
            let world_height = 2.0 * self.radius * (fov_radians * 0.5).tan();
            let pixels_to_world = world_height / screen_height;

            let forward = (self.center - self.eye()).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            self.center += (right * -pointer_delta.x + up * pointer_delta.y) * pixels_to_world * self.pan_speed;
        }

        transform.position = self.eye();
        transform.look_at(self.center, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_from_reproduces_position() {
        let controls = OrbitControls::looking_from(Vec3::new(0.0, 15.0, 30.0), Vec3::ZERO);
        assert!(controls.eye().distance(Vec3::new(0.0, 15.0, 30.0)) < 1e-4);
    }

    #[test]
    fn idle_input_keeps_the_camera_still() {
        let mut controls = OrbitControls::looking_from(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO);
        let mut transform = Transform::new();
        let input = Input::new();
        controls.update(&mut transform, &input, 75f32.to_radians(), 0.016);
        let first = transform.position;
        controls.update(&mut transform, &input, 75f32.to_radians(), 0.016);
        assert_eq!(first, transform.position);
        assert!(first.distance(Vec3::new(0.0, 0.0, 20.0)) < 1e-4);
    }
}
