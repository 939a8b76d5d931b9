//! GPU passes
//!
//! Each stage of [`PassKind::ORDER`](crate::renderer::post::PassKind::ORDER)
//! is a [`RenderNode`]: `prepare` uploads whatever changed and builds bind
//! groups, `run` only records commands.
//!
//! ```text
//! ScenePass → HDR ─┬─────────────── BloomPass → composite → AnalogPass → analog → OutputPass → surface
//!                  └ threshold → blur H → blur V ┘
//! ```

mod analog;
mod bloom;
mod output;
mod scene;
mod targets;

use std::borrow::Cow;

pub use analog::AnalogPass;
pub use bloom::BloomPass;
pub use output::OutputPass;
pub use scene::ScenePass;
pub use targets::{FrameTargets, RenderTarget};

use crate::renderer::context::WgpuContext;
use crate::scene::{DrawItem, Scene};

/// Data available while a pass prepares.
pub struct PrepareContext<'a> {
    pub wgpu: &'a WgpuContext,
    pub targets: &'a FrameTargets,
    pub scene: &'a Scene,
    pub draws: &'a [DrawItem],
}

/// Data available while a pass records.
pub struct ExecuteContext<'a> {
    pub targets: &'a FrameTargets,
    pub surface_view: &'a wgpu::TextureView,
}

pub trait RenderNode {
    fn prepare(&mut self, ctx: &mut PrepareContext);
    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);
    fn name(&self) -> &'static str;
}

pub(crate) const FULLSCREEN_WGSL: &str = include_str!("../shaders/fullscreen.wgsl");

/// Compiles a post shader with the shared full-screen vertex stage prepended.
pub(crate) fn fullscreen_shader(device: &wgpu::Device, label: &str, body: &str) -> wgpu::ShaderModule {
    let code = format!("{FULLSCREEN_WGSL}\n{body}");
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(code)),
    })
}

pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub(crate) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages, dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(crate) fn linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        ..Default::default()
    })
}

/// Full-screen pipeline writing one color target without blending.
pub(crate) fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[Some(layout)],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Records one full-screen draw into `target`.
pub(crate) fn draw_fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        ..Default::default()
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
