//! Renderer
//!
//! Owns every GPU resource. The renderer is created cold; [`Renderer::init`]
//! acquires a device for a window and [`Renderer::dispose`] releases it.
//! Until `init` succeeds, [`Renderer::render`] does nothing, which is how the
//! viewport runs headless.

pub mod context;
pub mod passes;
pub mod post;
pub mod settings;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::Result;
use crate::scene::{DrawItem, Scene};

use self::context::WgpuContext;
use self::passes::{AnalogPass, BloomPass, ExecuteContext, FrameTargets, OutputPass, PrepareContext, RenderNode, ScenePass};
use self::settings::RendererSettings;

/// Format of every intermediate color target.
pub const HDR_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

struct GpuState {
    context: WgpuContext,
    targets: FrameTargets,
    scene_pass: ScenePass,
    bloom_pass: BloomPass,
    analog_pass: AnalogPass,
    output_pass: OutputPass,
}

impl GpuState {
    fn new(context: WgpuContext) -> Self {
        let (width, height) = context.size();
        let device = &context.device;
        let targets = FrameTargets::new(device, width, height, context.depth_format);
        let scene_pass = ScenePass::new(device, &context.queue, context.depth_format);
        let bloom_pass = BloomPass::new(device);
        let analog_pass = AnalogPass::new(device);
        let output_pass = OutputPass::new(device, context.color_format());
        log::debug!(
            "Render passes ready: {}, {}, {}, {}",
            scene_pass.name(),
            bloom_pass.name(),
            analog_pass.name(),
            output_pass.name()
        );
        Self {
            context,
            targets,
            scene_pass,
            bloom_pass,
            analog_pass,
            output_pass,
        }
    }
}

/// Outcome of a single [`Renderer::render`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// Nothing was drawn: no GPU yet, or already disposed.
    Idle,
    /// The surface was lost or outdated and has been reconfigured.
    SurfaceReset,
    /// The surface could not provide a texture this frame.
    Skipped,
}

pub struct Renderer {
    settings: RendererSettings,
    gpu: Option<GpuState>,
    draws: Vec<DrawItem>,
    disposed: bool,
}

impl Renderer {
    #[must_use]
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            gpu: None,
            draws: Vec::new(),
            disposed: false,
        }
    }

    /// Acquires the GPU for `window`. Replaces any previous context.
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let context = WgpuContext::new(window, &self.settings, width, height).await?;
        self.gpu = Some(GpuState::new(context));
        self.disposed = false;
        Ok(())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Reconfigures the surface and reallocates frame targets.
    pub fn resize(&mut self, width: u32, height: u32) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if gpu.context.resize(width, height) {
            gpu.targets.resize(&gpu.context.device, width, height);
            log::debug!("Renderer resized to {width}x{height}");
        }
    }

    pub fn render(&mut self, scene: &Scene) -> FrameOutcome {
        let Some(gpu) = &mut self.gpu else {
            return FrameOutcome::Idle;
        };

        let output = match gpu.context.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                log::warn!("Surface lost, reconfiguring");
                gpu.context.surface.configure(&gpu.context.device, &gpu.context.config);
                return FrameOutcome::SurfaceReset;
            }
            e => {
                log::error!("Render error: {e:?}");
                return FrameOutcome::Skipped;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.draws.clear();
        scene.extract_draws(&mut self.draws);

        let GpuState {
            context,
            targets,
            scene_pass,
            bloom_pass,
            analog_pass,
            output_pass,
        } = gpu;
        let mut prepare = PrepareContext {
            wgpu: &*context,
            targets: &*targets,
            scene,
            draws: &self.draws,
        };
        scene_pass.prepare(&mut prepare);
        bloom_pass.prepare(&mut prepare);
        analog_pass.prepare(&mut prepare);
        output_pass.prepare(&mut prepare);

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Frame Encoder") });
        let execute = ExecuteContext {
            targets: &*targets,
            surface_view: &view,
        };
        let nodes: [&dyn RenderNode; 4] = [&*scene_pass, &*bloom_pass, &*analog_pass, &*output_pass];
        for node in nodes {
            node.run(&execute, &mut encoder);
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        FrameOutcome::Presented
    }

    /// Releases every GPU resource. Calling it again is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if self.gpu.take().is_some() {
            log::info!("Renderer disposed");
        }
        self.draws.clear();
        self.disposed = true;
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererSettings::default())
    }
}
