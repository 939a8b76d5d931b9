//! Post-Processing Pipeline
//!
//! Pure-data description of the fixed pass chain and its uniforms. The GPU
//! side lives in [`renderer::passes`](crate::renderer::passes) and only reads
//! from here, so the pipeline can be built and updated without a device.
//!
//! ```text
//! SceneRender → Bloom → AnalogDecay → Output
//! ```

pub mod analog;
pub mod tone_mapping;

use glam::Vec2;

use crate::config::AnalogDecayConfig;

pub use analog::{AnalogDecayUniforms, shade};
pub use tone_mapping::{OutputSettings, OutputUniforms, ToneMappingMode, aces_filmic};

/// Stages of the chain, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    SceneRender,
    Bloom,
    AnalogDecay,
    Output,
}

impl PassKind {
    pub const ORDER: [PassKind; 4] = [
        PassKind::SceneRender,
        PassKind::Bloom,
        PassKind::AnalogDecay,
        PassKind::Output,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SceneRender => "Scene Render",
            Self::Bloom => "Bloom",
            Self::AnalogDecay => "Analog Decay",
            Self::Output => "Output",
        }
    }
}

/// Bloom parameters. Fixed for the lifetime of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub strength: f32,
    /// Blur spread, in multiples of the base kernel.
    pub radius: f32,
    /// Luminance below which pixels do not bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 0.3,
            radius: 1.25,
            threshold: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomUniforms {
    pub threshold: f32,
    pub strength: f32,
    pub radius: f32,
    /// 0 = horizontal blur, 1 = vertical blur.
    pub direction: f32,
    pub texel_size: [f32; 2],
    pub __pad: [f32; 2],
}

/// The post-processing chain: ordered passes plus their uniform sets.
///
/// Only [`update`](Self::update) runs per frame, and it writes nothing but
/// time and resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PostProcessPipeline {
    bloom: BloomSettings,
    analog: AnalogDecayUniforms,
    output: OutputSettings,
    resolution: Vec2,
    frames: u64,
}

impl PostProcessPipeline {
    #[must_use]
    pub fn new(analog: &AnalogDecayConfig) -> Self {
        log::debug!("Post-processing chain: {:?}", PassKind::ORDER.map(PassKind::name));
        Self {
            bloom: BloomSettings::default(),
            analog: AnalogDecayUniforms::from_config(analog),
            output: OutputSettings::default(),
            resolution: Vec2::ONE,
            frames: 0,
        }
    }

    #[must_use]
    pub fn passes(&self) -> &'static [PassKind] {
        &PassKind::ORDER
    }

    /// Per-frame uniform refresh.
    pub fn update(&mut self, time: f32, resolution: Vec2) {
        self.analog.time = time;
        self.analog.resolution = resolution.to_array();
        self.resolution = resolution;
        self.frames += 1;
    }

    /// Replaces the static analog parameters, keeping time and resolution.
    pub fn set_analog(&mut self, config: &AnalogDecayConfig) {
        let mut next = AnalogDecayUniforms::from_config(config);
        next.time = self.analog.time;
        next.resolution = self.analog.resolution;
        self.analog = next;
    }

    #[must_use]
    pub fn bloom(&self) -> &BloomSettings {
        &self.bloom
    }

    #[must_use]
    pub fn analog(&self) -> &AnalogDecayUniforms {
        &self.analog
    }

    #[must_use]
    pub fn output(&self) -> &OutputSettings {
        &self.output
    }

    #[must_use]
    pub fn resolution(&self) -> Vec2 {
        self.resolution
    }

    /// Number of [`update`](Self::update) calls so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for PostProcessPipeline {
    fn default() -> Self {
        Self::new(&AnalogDecayConfig::default())
    }
}
