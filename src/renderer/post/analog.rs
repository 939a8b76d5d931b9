//! Analog decay
//!
//! Uniform block of the analog decay pass and a CPU rendition of its
//! fragment shader (`shaders/analog_decay.wgsl`). Both must change together.

use glam::{Vec2, Vec3, Vec4};

use crate::config::AnalogDecayConfig;

/// Effects whose strength is at or below this are skipped entirely.
const ENABLE_EPSILON: f32 = 0.01;
/// Shader time runs faster than scene time.
const TIME_SCALE: f32 = 1.8;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AnalogDecayUniforms {
    pub time: f32,
    pub intensity: f32,
    pub grain: f32,
    pub bleeding: f32,

    pub vsync: f32,
    pub scanlines: f32,
    pub vignette: f32,
    pub jitter: f32,

    pub resolution: [f32; 2],
    /// 1.0 when the limbo desaturation is on.
    pub limbo: f32,
    pub __pad: f32,
}

impl AnalogDecayUniforms {
    #[must_use]
    pub fn from_config(config: &AnalogDecayConfig) -> Self {
        Self {
            time: 0.0,
            intensity: config.intensity,
            grain: config.grain,
            bleeding: config.bleeding,
            vsync: config.vsync,
            scanlines: config.scanlines,
            vignette: config.vignette,
            jitter: config.jitter,
            resolution: [1.0, 1.0],
            limbo: if config.limbo { 1.0 } else { 0.0 },
            __pad: 0.0,
        }
    }
}

impl Default for AnalogDecayUniforms {
    fn default() -> Self {
        Self::from_config(&AnalogDecayConfig::default())
    }
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn random2(st: Vec2) -> f32 {
    fract((st.dot(Vec2::new(12.9898, 78.233))).sin() * 43_758.545)
}

fn gaussian(z: f32, u: f32, o: f32) -> f32 {
    (1.0 / (o * (2.0 * 3.1415_f32).sqrt())) * (-((z - u) * (z - u)) / (2.0 * o * o)).exp()
}

fn grain(uv: Vec2, time: f32, intensity: f32) -> Vec3 {
    let seed = uv.dot(Vec2::new(12.9898, 78.233));
    let noise = fract(seed.sin() * 43_758.545 + time * 2.0);
    Vec3::splat(gaussian(noise, 0.0, 0.25) * intensity)
}

/// Whether the large-scale roll fires during the interval containing `time`
/// (shader time, already scaled).
#[must_use]
pub fn vsync_triggered(time: f32) -> bool {
    random2(Vec2::splat((time * 4.0).floor())) >= 0.95
}

/// Shades one output pixel at `uv`, reading the input image through
/// `sample`. Mirrors the fragment shader step for step.
pub fn shade(u: &AnalogDecayUniforms, uv: Vec2, sample: impl Fn(Vec2) -> Vec4) -> Vec4 {
    let time = u.time * TIME_SCALE;
    let mut jittered = uv;

    if u.jitter > ENABLE_EPSILON {
        let amount = u.jitter * u.intensity;
        jittered.x += (random2(Vec2::splat((time * 60.0).floor())) - 0.5) * 0.003 * amount;
        jittered.y += (random2(Vec2::splat((time * 30.0).floor() + 1.0)) - 0.5) * 0.001 * amount;
    }

    if u.vsync > ENABLE_EPSILON {
        let roll = (time * 2.0 + uv.y * 100.0).sin() * 0.02 * u.vsync * u.intensity;
        if vsync_triggered(time) {
            jittered.y += roll;
        }
    }

    let mut color = sample(jittered);

    if u.bleeding > ENABLE_EPSILON {
        let bleed = 0.012 * u.bleeding * u.intensity;
        let phase = time * 1.5 + uv.y * 20.0;
        let red = Vec2::new(phase.sin() * bleed, 0.0);
        let blue = Vec2::new(-(phase * 1.1).sin() * bleed * 0.8, 0.0);
        color = Vec4::new(
            sample(jittered + red).x,
            sample(jittered).y,
            sample(jittered + blue).z,
            color.w,
        );
    }

    let mut rgb = color.truncate();

    if u.grain > ENABLE_EPSILON {
        let effect = grain(uv, time, 0.075 * u.grain * u.intensity) * (Vec3::ONE - rgb);
        rgb += effect;
    }

    if u.scanlines > ENABLE_EPSILON {
        let frequency = 600.0 + u.scanlines * 400.0;
        let pattern = (uv.y * frequency).sin() * 0.5 + 0.5;
        rgb *= 1.0 - pattern * 0.1 * u.scanlines * u.intensity;
        let bands = (uv.y * frequency * 0.1).sin() * 0.02 * u.scanlines * u.intensity;
        rgb *= 1.0 - bands;
    }

    if u.vignette > ENABLE_EPSILON {
        let centered = (uv - 0.5) * 2.0;
        rgb *= 1.0 - centered.dot(centered) * 0.3 * u.vignette * u.intensity;
    }

    if u.limbo > 0.5 {
        let gray = rgb.dot(Vec3::new(0.299, 0.587, 0.114));
        rgb = Vec3::splat(gray);
    }

    rgb.extend(color.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_is_constant_within_an_interval() {
        assert_eq!(vsync_triggered(10.01), vsync_triggered(10.2));
        let r = random2(Vec2::splat(3.0));
        assert!((0.0..1.0).contains(&r));
    }
}
