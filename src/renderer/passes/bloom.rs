//! Bloom pass
//!
//! Threshold into a half-resolution target, separable blur, then an
//! additive composite over the HDR scene color.
//!
//! Bind groups reference the frame targets only, so they are rebuilt when
//! [`FrameTargets::generation`] moves and reused otherwise.

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use super::{
    ExecuteContext, FrameTargets, PrepareContext, RenderNode, draw_fullscreen, fullscreen_pipeline, fullscreen_shader,
    linear_sampler, sampler_entry, texture_entry, uniform_entry,
};
use crate::renderer::HDR_TEXTURE_FORMAT;
use crate::renderer::post::{BloomSettings, BloomUniforms};

struct BloomBindGroups {
    generation: u64,
    threshold: wgpu::BindGroup,
    blur_horizontal: wgpu::BindGroup,
    blur_vertical: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

pub struct BloomPass {
    filter_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    threshold_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,

    /// Direction 0. Also read by threshold and composite.
    horizontal_uniforms: wgpu::Buffer,
    vertical_uniforms: wgpu::Buffer,
    settings: Option<(BloomSettings, [f32; 2])>,

    bind_groups: Option<BloomBindGroups>,
}

impl BloomPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = fullscreen_shader(device, "Bloom Shader", include_str!("../shaders/bloom.wgsl"));

        let filter_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Filter Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Composite Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT, false),
                texture_entry(3),
            ],
        });

        let threshold_pipeline = fullscreen_pipeline(
            device,
            "Bloom Threshold",
            &shader,
            "fs_threshold",
            &filter_layout,
            HDR_TEXTURE_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(device, "Bloom Blur", &shader, "fs_blur", &filter_layout, HDR_TEXTURE_FORMAT);
        let composite_pipeline = fullscreen_pipeline(
            device,
            "Bloom Composite",
            &shader,
            "fs_composite",
            &composite_layout,
            HDR_TEXTURE_FORMAT,
        );

        let uniform_buffer = |label: &str| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&BloomUniforms::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };

        Self {
            filter_layout,
            composite_layout,
            threshold_pipeline,
            blur_pipeline,
            composite_pipeline,
            sampler: linear_sampler(device, "Bloom Sampler"),
            horizontal_uniforms: uniform_buffer("Bloom Uniforms H"),
            vertical_uniforms: uniform_buffer("Bloom Uniforms V"),
            settings: None,
            bind_groups: None,
        }
    }

    fn filter_group(&self, device: &wgpu::Device, label: &str, source: &wgpu::TextureView, uniforms: &wgpu::Buffer) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.filter_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        })
    }

    fn build_bind_groups(&self, device: &wgpu::Device, targets: &FrameTargets) -> BloomBindGroups {
        let composite = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Composite BindGroup"),
            layout: &self.composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.scene_color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.horizontal_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&targets.bloom[0].view),
                },
            ],
        });

        BloomBindGroups {
            generation: targets.generation,
            threshold: self.filter_group(device, "Bloom Threshold BindGroup", &targets.scene_color.view, &self.horizontal_uniforms),
            blur_horizontal: self.filter_group(device, "Bloom Blur H BindGroup", &targets.bloom[0].view, &self.horizontal_uniforms),
            blur_vertical: self.filter_group(device, "Bloom Blur V BindGroup", &targets.bloom[1].view, &self.vertical_uniforms),
            composite,
        }
    }
}

impl RenderNode for BloomPass {
    fn name(&self) -> &'static str {
        "Bloom"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let settings = *ctx.scene.post.bloom();
        let texel_size = ctx.targets.bloom_texel_size();

        if self.settings != Some((settings, texel_size)) {
            let base = BloomUniforms {
                threshold: settings.threshold,
                strength: settings.strength,
                radius: settings.radius,
                direction: 0.0,
                texel_size,
                __pad: [0.0; 2],
            };
            let vertical = BloomUniforms { direction: 1.0, ..base };
            ctx.wgpu.queue.write_buffer(&self.horizontal_uniforms, 0, bytemuck::bytes_of(&base));
            ctx.wgpu.queue.write_buffer(&self.vertical_uniforms, 0, bytemuck::bytes_of(&vertical));
            self.settings = Some((settings, texel_size));
        }

        let stale = self
            .bind_groups
            .as_ref()
            .is_none_or(|groups| groups.generation != ctx.targets.generation);
        if stale {
            self.bind_groups = Some(self.build_bind_groups(&ctx.wgpu.device, ctx.targets));
        }
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let Some(groups) = &self.bind_groups else {
            return;
        };
        let [ping, pong] = &ctx.targets.bloom;
        draw_fullscreen(encoder, "Bloom Threshold", &ping.view, &self.threshold_pipeline, &groups.threshold);
        draw_fullscreen(encoder, "Bloom Blur H", &pong.view, &self.blur_pipeline, &groups.blur_horizontal);
        draw_fullscreen(encoder, "Bloom Blur V", &ping.view, &self.blur_pipeline, &groups.blur_vertical);
        draw_fullscreen(
            encoder,
            "Bloom Composite",
            &ctx.targets.composite.view,
            &self.composite_pipeline,
            &groups.composite,
        );
    }
}
