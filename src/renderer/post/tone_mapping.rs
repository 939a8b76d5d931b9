use glam::{Mat3, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneMappingMode {
    Linear,
    #[default]
    AcesFilmic,
}

/// Final output pass parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSettings {
    pub mode: ToneMappingMode,
    pub exposure: f32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            mode: ToneMappingMode::AcesFilmic,
            exposure: 0.9,
        }
    }
}

impl OutputSettings {
    #[must_use]
    pub fn uniforms(&self) -> OutputUniforms {
        OutputUniforms {
            exposure: self.exposure,
            mode: match self.mode {
                ToneMappingMode::Linear => 0,
                ToneMappingMode::AcesFilmic => 1,
            },
            __pad: [0; 2],
        }
    }

    /// CPU rendition of the output shader.
    #[must_use]
    pub fn apply(&self, color: Vec3) -> Vec3 {
        match self.mode {
            ToneMappingMode::Linear => (color * self.exposure).clamp(Vec3::ZERO, Vec3::ONE),
            ToneMappingMode::AcesFilmic => aces_filmic(color, self.exposure),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OutputUniforms {
    pub exposure: f32,
    pub mode: u32,
    pub __pad: [u32; 2],
}

const ACES_INPUT: Mat3 = Mat3::from_cols_array(&[
    0.597_19, 0.076_00, 0.028_40, //
    0.354_58, 0.908_34, 0.133_83, //
    0.048_23, 0.015_66, 0.837_77,
]);

const ACES_OUTPUT: Mat3 = Mat3::from_cols_array(&[
    1.604_75, -0.102_08, -0.003_27, //
    -0.531_08, 1.108_13, -0.072_76, //
    -0.073_67, -0.006_05, 1.076_02,
]);

fn rrt_and_odt_fit(v: Vec3) -> Vec3 {
    let a = v * (v + 0.024_578_6) - 0.000_090_537;
    let b = v * (0.983_729 * v + 0.432_951) + 0.238_081;
    a / b
}

/// ACES filmic curve (Hill fit), matching `shaders/output.wgsl`.
#[must_use]
pub fn aces_filmic(color: Vec3, exposure: f32) -> Vec3 {
    let color = color * (exposure / 0.6);
    let color = ACES_OUTPUT * rrt_and_odt_fit(ACES_INPUT * color);
    color.clamp(Vec3::ZERO, Vec3::ONE)
}
