//! Renderer Settings
//!
//! GPU-side configuration consumed once by [`Renderer::init`](super::Renderer::init).
//! Everything that describes *what* is drawn (clear color, fog, post
//! parameters) comes from the scene instead.

/// Global configuration for renderer initialization.
///
/// | Field              | Description                        | Default           |
/// |--------------------|------------------------------------|-------------------|
/// | `vsync`            | Vertical sync enabled              | `true`            |
/// | `power_preference` | GPU adapter selection strategy     | `HighPerformance` |
/// | `required_features`| Required wgpu features             | Empty             |
/// | `required_limits`  | Required wgpu limits               | Default           |
/// | `depth_format`     | Depth buffer texture format        | `Depth32Float`    |
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// When `true`, presentation waits for the display refresh.
    pub vsync: bool,

    pub power_preference: wgpu::PowerPreference,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    pub depth_format: wgpu::TextureFormat,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}
