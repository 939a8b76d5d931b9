use crate::renderer::HDR_TEXTURE_FORMAT;

pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Intermediate textures of one frame, recreated on resize.
pub struct FrameTargets {
    pub width: u32,
    pub height: u32,
    /// Bumped on every reallocation so passes know to rebuild bind groups.
    pub generation: u64,

    pub scene_color: RenderTarget,
    pub depth: RenderTarget,
    /// Half-resolution ping-pong pair for the bloom blur.
    pub bloom: [RenderTarget; 2],
    pub composite: RenderTarget,
    pub analog: RenderTarget,
}

impl FrameTargets {
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32, depth_format: wgpu::TextureFormat) -> Self {
        Self::allocate(device, width, height, depth_format, 1)
    }

    fn allocate(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        depth_format: wgpu::TextureFormat,
        generation: u64,
    ) -> Self {
        let (half_w, half_h) = ((width / 2).max(1), (height / 2).max(1));
        log::debug!("Allocating frame targets {width}x{height} (generation {generation})");
        Self {
            width,
            height,
            generation,
            scene_color: RenderTarget::new(device, "Scene Color", width, height, HDR_TEXTURE_FORMAT),
            depth: RenderTarget::new(device, "Scene Depth", width, height, depth_format),
            bloom: [
                RenderTarget::new(device, "Bloom Ping", half_w, half_h, HDR_TEXTURE_FORMAT),
                RenderTarget::new(device, "Bloom Pong", half_w, half_h, HDR_TEXTURE_FORMAT),
            ],
            composite: RenderTarget::new(device, "Bloom Composite", width, height, HDR_TEXTURE_FORMAT),
            analog: RenderTarget::new(device, "Analog Decay", width, height, HDR_TEXTURE_FORMAT),
        }
    }

    /// Reallocates for a new size. Returns `false` when nothing changed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return false;
        }
        let depth_format = self.depth.texture.format();
        *self = Self::allocate(device, width, height, depth_format, self.generation + 1);
        true
    }

    #[must_use]
    pub fn bloom_texel_size(&self) -> [f32; 2] {
        let (w, h) = ((self.width / 2).max(1), (self.height / 2).max(1));
        [1.0 / w as f32, 1.0 / h as f32]
    }
}
