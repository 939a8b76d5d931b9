//! Analog Decay pass
//!
//! Single full-screen draw from the bloom composite into the analog target.
//! The uniform block is re-uploaded every frame since time always moves.

use super::{
    ExecuteContext, PrepareContext, RenderNode, draw_fullscreen, fullscreen_pipeline, fullscreen_shader, linear_sampler,
    sampler_entry, texture_entry, uniform_entry,
};
use crate::renderer::HDR_TEXTURE_FORMAT;
use crate::renderer::post::AnalogDecayUniforms;

pub struct AnalogPass {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    uniforms: wgpu::Buffer,
    bind_group: Option<(u64, wgpu::BindGroup)>,
}

impl AnalogPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = fullscreen_shader(device, "Analog Decay Shader", include_str!("../shaders/analog_decay.wgsl"));
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Analog Decay Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });
        let pipeline = fullscreen_pipeline(device, "Analog Decay", &shader, "fs_main", &layout, HDR_TEXTURE_FORMAT);
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Analog Decay Uniforms"),
            size: std::mem::size_of::<AnalogDecayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            layout,
            pipeline,
            sampler: linear_sampler(device, "Analog Decay Sampler"),
            uniforms,
            bind_group: None,
        }
    }
}

impl RenderNode for AnalogPass {
    fn name(&self) -> &'static str {
        "Analog Decay"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        ctx.wgpu
            .queue
            .write_buffer(&self.uniforms, 0, bytemuck::bytes_of(ctx.scene.post.analog()));

        let generation = ctx.targets.generation;
        if self.bind_group.as_ref().is_some_and(|(g, _)| *g == generation) {
            return;
        }
        let bind_group = ctx.wgpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Analog Decay BindGroup"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&ctx.targets.composite.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniforms.as_entire_binding(),
                },
            ],
        });
        self.bind_group = Some((generation, bind_group));
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        if let Some((_, bind_group)) = &self.bind_group {
            draw_fullscreen(encoder, "Analog Decay", &ctx.targets.analog.view, &self.pipeline, bind_group);
        }
    }
}
