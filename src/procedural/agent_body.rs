use glam::Vec3;

use crate::resources::geometry::Geometry;
use crate::resources::primitives::{SphereOptions, create_sphere};

/// One displacement term: `amplitude * wave(frequency * input)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseTerm {
    pub amplitude: f32,
    pub frequency: f32,
}

/// Parameters of the melted sphere. The default is the production ghost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyShape {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Vertices below this height are displaced.
    pub melt_below: f32,
    /// Height the displaced hem oscillates around.
    pub hem_height: f32,
    /// `sin(f·x)` term.
    pub x_wave: NoiseTerm,
    /// `cos(f·z)` term.
    pub z_wave: NoiseTerm,
    /// `sin(f·(x + z))` term.
    pub diagonal_wave: NoiseTerm,
}

impl Default for BodyShape {
    fn default() -> Self {
        Self {
            radius: 2.0,
            width_segments: 40,
            height_segments: 40,
            melt_below: -0.2,
            hem_height: -2.0,
            x_wave: NoiseTerm {
                amplitude: 0.35,
                frequency: 5.0,
            },
            z_wave: NoiseTerm {
                amplitude: 0.25,
                frequency: 4.0,
            },
            diagonal_wave: NoiseTerm {
                amplitude: 0.15,
                frequency: 3.0,
            },
        }
    }
}

impl BodyShape {
    /// Height of the hem at `(x, z)`.
    #[must_use]
    pub fn hem_at(&self, x: f32, z: f32) -> f32 {
        self.hem_height
            + (x * self.x_wave.frequency).sin() * self.x_wave.amplitude
            + (z * self.z_wave.frequency).cos() * self.z_wave.amplitude
            + ((x + z) * self.diagonal_wave.frequency).sin() * self.diagonal_wave.amplitude
    }
}

/// Sphere whose lower part is pulled down into a wavy hem, with normals
/// recomputed after displacement.
#[must_use]
pub fn agent_body(shape: &BodyShape) -> Geometry {
    let mut geometry = create_sphere(&SphereOptions {
        radius: shape.radius,
        width_segments: shape.width_segments,
        height_segments: shape.height_segments,
    });

    let displaced: Vec<Vec3> = geometry
        .positions()
        .into_iter()
        .map(|p| {
            if p.y < shape.melt_below {
                Vec3::new(p.x, shape.hem_at(p.x, p.z), p.z)
            } else {
                p
            }
        })
        .collect();

    geometry.set_positions(&displaced);
    geometry.compute_vertex_normals();
    geometry.compute_bounding_volume();
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_hemisphere_is_untouched() {
        let shape = BodyShape::default();
        let plain = create_sphere(&SphereOptions {
            radius: 2.0,
            width_segments: 40,
            height_segments: 40,
        });
        let body = agent_body(&shape);
        for (a, b) in plain.positions().iter().zip(body.positions()) {
            if a.y >= shape.melt_below {
                assert_eq!(*a, b);
            }
        }
    }
}
