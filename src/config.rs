//! Scene Configuration
//!
//! [`SceneConfig`] is the single record a host hands to
//! [`Viewport::mount`](crate::engine::Viewport::mount). Every field has a
//! production default, so a config file only needs to name the values it
//! changes:
//!
//! ```json
//! {
//!     "glow_color": "magenta",
//!     "follow_speed": 0.1,
//!     "analog_decay": { "limbo": true },
//!     "idle_clip": "dance",
//!     "background": "necropolis"
//! }
//! ```
//!
//! Colors accept a hex integer (`16729344`), a CSS-style string (`"#ff4500"`)
//! or a name from the fluorescent palette (`"orange"`).

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{Result, SpecterError};

// ============================================================================
// Color
// ============================================================================

/// Named fluorescent colors recognized by the config parser.
pub const FLUORESCENT_PALETTE: &[(&str, u32)] = &[
    ("cyan", 0x00ff_ff),
    ("lime", 0x00ff_00),
    ("magenta", 0xff00_ff),
    ("yellow", 0xffff_00),
    ("orange", 0xff45_00),
    ("pink", 0xff14_93),
    ("purple", 0x9400_d3),
    ("blue", 0x0080_ff),
    ("green", 0x00ff_80),
    ("red", 0xff00_40),
    ("teal", 0x00ff_aa),
    ("violet", 0x8a2b_e2),
];

/// An sRGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Looks a name up in [`FLUORESCENT_PALETTE`] (case-insensitive).
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        FLUORESCENT_PALETTE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, hex)| Self::from_hex(hex))
    }

    /// Parses `#rrggbb`, `0xrrggbb` or a palette name.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text
            .strip_prefix('#')
            .or_else(|| text.strip_prefix("0x"));
        match digits {
            Some(digits) if digits.len() == 6 => u32::from_str_radix(digits, 16).ok().map(Self::from_hex),
            Some(_) => None,
            None => Self::named(text),
        }
    }

    #[must_use]
    pub fn to_hex(self) -> u32 {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (c(self.r) << 16) | (c(self.g) << 8) | c(self.b)
    }

    /// Converts the sRGB components to linear space for shading.
    #[must_use]
    pub fn to_linear(self) -> Vec3 {
        let f = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        Vec3::new(f(self.r), f(self.g), f(self.b))
    }

    /// Returns `(hue, saturation, lightness)`, all in `[0, 1]`.
    #[must_use]
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let lightness = (max + min) * 0.5;
        if (max - min).abs() < f32::EPSILON {
            return (0.0, 0.0, lightness);
        }
        let delta = max - min;
        let saturation = if lightness > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };
        let hue = if (max - self.r).abs() < f32::EPSILON {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if (max - self.g).abs() < f32::EPSILON {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };
        (hue / 6.0, saturation, lightness)
    }

    #[must_use]
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hue = hue.rem_euclid(1.0);
        if saturation <= 0.0 {
            return Self::new(lightness, lightness, lightness);
        }
        let q = if lightness < 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let p = 2.0 * lightness - q;
        let channel = |mut t: f32| {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };
        Self::new(
            channel(hue + 1.0 / 3.0),
            channel(hue),
            channel(hue - 1.0 / 3.0),
        )
    }

    /// Shifts the hue by `offset` turns, keeping saturation and lightness.
    #[must_use]
    pub fn offset_hue(self, offset: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h + offset, s, l)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(u32),
            Text(String),
            Rgb { r: f32, g: f32, b: f32 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(hex) => Ok(Color::from_hex(hex)),
            Repr::Text(text) => Color::parse(&text)
                .ok_or_else(|| serde::de::Error::custom(format!("unrecognized color `{text}`"))),
            Repr::Rgb { r, g, b } => Ok(Color::new(r, g, b)),
        }
    }
}

// ============================================================================
// Enumerated options
// ============================================================================

/// Which looping clip the avatar falls back to between one-shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleClip {
    #[default]
    Breathing,
    Wave,
    Dance,
}

impl IdleClip {
    #[must_use]
    pub fn clip_name(self) -> &'static str {
        match self {
            IdleClip::Breathing => "idle",
            IdleClip::Wave => "wave",
            IdleClip::Dance => "dance",
        }
    }
}

/// Background scenario selector; see [`BackgroundScenario`](crate::procedural::BackgroundScenario).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Ghost,
    Necropolis,
}

// ============================================================================
// Sub-records
// ============================================================================

/// Analog decay post-process parameters. All strengths are in `[0, 1]`
/// except `bleeding`, which may exceed 1 for a stronger chromatic smear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalogDecayConfig {
    pub intensity: f32,
    pub grain: f32,
    pub bleeding: f32,
    pub vsync: f32,
    pub scanlines: f32,
    pub vignette: f32,
    pub jitter: f32,
    pub limbo: bool,
}

impl Default for AnalogDecayConfig {
    fn default() -> Self {
        Self {
            intensity: 0.6,
            grain: 0.4,
            bleeding: 1.0,
            vsync: 1.0,
            scanlines: 1.0,
            vignette: 1.0,
            jitter: 0.4,
            limbo: false,
        }
    }
}

/// Layout of the secondary agents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryGridConfig {
    pub columns: u32,
    pub rows: u32,
    /// View-space depth the grid is laid out at.
    pub depth: f32,
}

impl Default for SecondaryGridConfig {
    fn default() -> Self {
        Self {
            columns: 5,
            rows: 3,
            depth: 0.0,
        }
    }
}

// ============================================================================
// SceneConfig
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    // Agent appearance
    pub body_color: Color,
    pub glow_color: Color,
    pub eye_glow_color: Color,
    pub opacity: f32,
    pub scale: f32,
    pub emissive_intensity: f32,
    pub pulse_speed: f32,
    pub pulse_intensity: f32,
    pub eye_glow_intensity: f32,
    pub eye_glow_decay: f32,
    pub eye_glow_response: f32,
    pub rim_light_intensity: f32,

    // Agent behaviour
    pub follow_speed: f32,
    pub wobble_amount: f32,
    pub float_speed: f32,
    pub movement_threshold: f32,
    /// World-space half extents the pointer NDC range maps onto.
    pub target_extent: Vec2,

    // Particles
    pub particle_count: usize,
    pub particle_decay_rate: f32,
    pub particle_color: Color,
    pub particle_creation_rate: u32,
    pub particles_only_when_moving: bool,

    // Reveal overlay
    pub reveal_radius: f32,
    pub fade_strength: f32,
    pub base_opacity: f32,
    pub reveal_opacity: f32,

    // Fireflies
    pub firefly_glow_intensity: f32,
    pub firefly_speed: f32,

    pub analog_decay: AnalogDecayConfig,
    pub idle_clip: IdleClip,
    pub background: BackgroundKind,
    pub secondary_grid: SecondaryGridConfig,

    /// Seed for every procedural random source in the scene.
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            body_color: Color::from_hex(0x0f_2027),
            glow_color: Color::from_hex(0xff45_00),
            eye_glow_color: Color::from_hex(0x00ff_80),
            opacity: 0.88,
            scale: 2.4,
            emissive_intensity: 5.8,
            pulse_speed: 1.6,
            pulse_intensity: 0.6,
            eye_glow_intensity: 4.5,
            eye_glow_decay: 0.95,
            eye_glow_response: 0.31,
            rim_light_intensity: 1.8,

            follow_speed: 0.075,
            wobble_amount: 0.35,
            float_speed: 1.6,
            movement_threshold: 0.07,
            target_extent: Vec2::new(11.0, 7.0),

            particle_count: 250,
            particle_decay_rate: 0.005,
            particle_color: Color::from_hex(0xff45_00),
            particle_creation_rate: 5,
            particles_only_when_moving: true,

            reveal_radius: 43.0,
            fade_strength: 2.2,
            base_opacity: 0.35,
            reveal_opacity: 0.0,

            firefly_glow_intensity: 2.6,
            firefly_speed: 0.04,

            analog_decay: AnalogDecayConfig::default(),
            idle_clip: IdleClip::default(),
            background: BackgroundKind::default(),
            secondary_grid: SecondaryGridConfig::default(),

            seed: 0x5eed_0f_9057,
        }
    }
}

impl SceneConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every range the per-frame update relies on.
    ///
    /// The simulation itself never fails, so anything that would make it
    /// diverge (a follow speed outside `(0, 1)`, a decay outside `[0, 1)`) is
    /// rejected here instead.
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, msg: impl FnOnce() -> String) -> Result<()> {
            if ok { Ok(()) } else { Err(SpecterError::InvalidConfig(msg())) }
        }

        check(self.follow_speed > 0.0 && self.follow_speed < 1.0, || {
            format!("follow_speed must be in (0, 1), got {}", self.follow_speed)
        })?;
        check((0.0..1.0).contains(&self.eye_glow_decay), || {
            format!("eye_glow_decay must be in [0, 1), got {}", self.eye_glow_decay)
        })?;
        check(self.eye_glow_response > 0.0 && self.eye_glow_response <= 1.0, || {
            format!("eye_glow_response must be in (0, 1], got {}", self.eye_glow_response)
        })?;
        check((0.0..=1.0).contains(&self.opacity), || {
            format!("opacity must be in [0, 1], got {}", self.opacity)
        })?;
        check(self.scale > 0.0, || format!("scale must be positive, got {}", self.scale))?;
        check(self.particle_decay_rate > 0.0, || {
            format!("particle_decay_rate must be positive, got {}", self.particle_decay_rate)
        })?;
        check(self.reveal_radius > 0.0, || {
            format!("reveal_radius must be positive, got {}", self.reveal_radius)
        })?;
        check(self.target_extent.x >= 0.0 && self.target_extent.y >= 0.0, || {
            "target_extent must not be negative".to_string()
        })?;
        check(self.analog_decay.intensity >= 0.0, || {
            "analog_decay.intensity must not be negative".to_string()
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_round_trip_keeps_orange() {
        let orange = Color::from_hex(0xff4500);
        let (h, s, l) = orange.to_hsl();
        let back = Color::from_hsl(h, s, l);
        assert_eq!(back.to_hex(), 0xff4500);
    }

    #[test]
    fn parse_rejects_short_hex() {
        assert!(Color::parse("#fff").is_none());
        assert!(Color::parse("not-a-color").is_none());
        assert_eq!(Color::parse("0x00ffaa").map(Color::to_hex), Some(0x00ffaa));
    }
}
