//! Output pass: exposure, tone mapping and the write to the surface.

use super::{
    ExecuteContext, PrepareContext, RenderNode, draw_fullscreen, fullscreen_pipeline, fullscreen_shader, linear_sampler,
    sampler_entry, texture_entry, uniform_entry,
};
use crate::renderer::post::OutputUniforms;

pub struct OutputPass {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    uniforms: wgpu::Buffer,
    uploaded: Option<OutputUniforms>,
    bind_group: Option<(u64, wgpu::BindGroup)>,
}

impl OutputPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = fullscreen_shader(device, "Output Shader", include_str!("../shaders/output.wgsl"));
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Output Layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });
        let pipeline = fullscreen_pipeline(device, "Output", &shader, "fs_main", &layout, surface_format);
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Output Uniforms"),
            size: std::mem::size_of::<OutputUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            layout,
            pipeline,
            sampler: linear_sampler(device, "Output Sampler"),
            uniforms,
            uploaded: None,
            bind_group: None,
        }
    }
}

impl RenderNode for OutputPass {
    fn name(&self) -> &'static str {
        "Output"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let uniforms = ctx.scene.post.output().uniforms();
        if self.uploaded != Some(uniforms) {
            ctx.wgpu.queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));
            self.uploaded = Some(uniforms);
        }

        let generation = ctx.targets.generation;
        if self.bind_group.as_ref().is_some_and(|(g, _)| *g == generation) {
            return;
        }
        let bind_group = ctx.wgpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Output BindGroup"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&ctx.targets.analog.view),
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
            draw_fullscreen(encoder, "Output", ctx.surface_view, &self.pipeline, bind_group);
        }
    }
}
