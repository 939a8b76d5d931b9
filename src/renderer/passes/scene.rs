//! Scene Render pass
//!
//! Draws every [`DrawItem`] into the HDR target. Opaque items go first in
//! extraction order, then blended items back to front.

use std::borrow::Cow;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use wgpu::util::DeviceExt;

use super::{ExecuteContext, PrepareContext, RenderNode, linear_sampler, sampler_entry, texture_entry, uniform_entry};
use crate::renderer::HDR_TEXTURE_FORMAT;
use crate::resources::geometry::Geometry;
use crate::resources::label::LabelTexture;
use crate::resources::material::{BlendMode, MaterialParams, ShadingModel};
use crate::scene::light::{Light, LightKind};
use crate::scene::{DrawItem, Scene, Topology};

pub const MAX_LIGHTS: usize = 64;
/// Floats per interleaved vertex: position, normal, uv, color.
const VERTEX_FLOATS: usize = 11;
const OBJECT_STRIDE: u64 = 256;
const INITIAL_OBJECT_CAPACITY: u64 = 256;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LightUniform {
    color: [f32; 4],
    position: [f32; 4],
    direction: [f32; 4],
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        let rgb = light.color * light.intensity;
        let (kind, position, direction) = match light.kind {
            LightKind::Ambient => (0.0, [0.0; 4], [0.0; 4]),
            LightKind::Directional { direction } => (1.0, [0.0; 4], direction.extend(0.0).to_array()),
            LightKind::Point { position, range } => (2.0, position.extend(range).to_array(), [0.0; 4]),
            LightKind::Spot {
                position,
                direction,
                range,
                angle,
            } => (
                3.0,
                position.extend(range).to_array(),
                direction.extend(angle.cos()).to_array(),
            ),
        };
        Self {
            color: rgb.extend(kind).to_array(),
            position,
            direction,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GlobalsUniform {
    view_projection: [[f32; 4]; 4],
    camera_position: [f32; 4],
    fog: [f32; 4],
    reveal: [f32; 4],
    reveal_params: [f32; 4],
    lights: [LightUniform; MAX_LIGHTS],
}

impl GlobalsUniform {
    fn from_scene(scene: &Scene) -> Self {
        let mut lights = [LightUniform::zeroed(); MAX_LIGHTS];
        let count = scene.lights.len().min(MAX_LIGHTS);
        for (slot, light) in lights.iter_mut().zip(&scene.lights) {
            *slot = LightUniform::from(light);
        }

        let (reveal, enabled, base, revealed) = match scene.background.reveal() {
            Some(overlay) => (
                [overlay.center.x, overlay.center.y, overlay.dynamic_radius(), overlay.fade_strength],
                1.0,
                overlay.base_opacity,
                overlay.reveal_opacity,
            ),
            None => ([0.0; 4], 0.0, 1.0, 1.0),
        };

        Self {
            view_projection: scene.camera.view_projection_matrix().to_cols_array_2d(),
            camera_position: scene.camera.position().extend(1.0).to_array(),
            fog: scene.fog.color.extend(scene.fog.density).to_array(),
            reveal,
            reveal_params: [base, revealed, enabled, count as f32],
            lights,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
    flags: [f32; 4],
}

impl ObjectUniform {
    fn new(model: &Mat4, material: &MaterialParams, has_label: bool) -> Self {
        let normal_matrix = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        let shading = match material.shading {
            ShadingModel::Lit => 0.0,
            ShadingModel::Unlit => 1.0,
            ShadingModel::Reveal => 2.0,
        };
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            color: material.color.extend(material.opacity).to_array(),
            emissive: material.emissive.extend(material.emissive_intensity).to_array(),
            flags: [
                shading,
                if has_label { 1.0 } else { 0.0 },
                if material.double_sided { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    blend: BlendMode,
    topology: Topology,
    double_sided: bool,
}

struct GpuGeometry {
    version: u64,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    index: Option<(wgpu::Buffer, wgpu::IndexFormat, u32)>,
}

impl GpuGeometry {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vertices = interleave(geometry);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = geometry.indices().filter(|i| !i.is_empty()).map(|indices| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Geometry Indices"),
                contents: indices.as_bytes(),
                usage: wgpu::BufferUsages::INDEX,
            });
            (buffer, indices.format(), indices.len() as u32)
        });
        Self {
            version: geometry.version(),
            vertex_buffer,
            vertex_count: geometry.vertex_count(),
            index,
        }
    }
}

/// Packs the planar attributes into one interleaved stream. Missing normals
/// and uvs read as zero, missing colors as white.
pub(crate) fn interleave(geometry: &Geometry) -> Vec<f32> {
    let count = geometry.vertex_count();
    let position = geometry.get_attribute("position");
    let normal = geometry.get_attribute("normal");
    let uv = geometry.get_attribute("uv");
    let color = geometry.get_attribute("color");

    let mut out = Vec::with_capacity(count as usize * VERTEX_FLOATS);
    for i in 0..count {
        let p = position.and_then(|a| a.read_vec3(i)).unwrap_or(Vec3::ZERO);
        let n = normal.and_then(|a| a.read_vec3(i)).unwrap_or(Vec3::ZERO);
        let t = uv.and_then(|a| a.read_vec2(i)).unwrap_or_default();
        let c = color.and_then(|a| a.read_vec3(i)).unwrap_or(Vec3::ONE);
        out.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, t.x, t.y, c.x, c.y, c.z]);
    }
    out
}

struct DrawCall {
    pipeline: PipelineKey,
    geometry: u64,
    label: Option<u64>,
    offset: u32,
    topology: Topology,
}

pub struct ScenePass {
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: FxHashMap<PipelineKey, wgpu::RenderPipeline>,
    depth_format: wgpu::TextureFormat,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,

    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_capacity: u64,
    object_bind_group: wgpu::BindGroup,
    object_staging: Vec<u8>,

    label_layout: wgpu::BindGroupLayout,
    label_sampler: wgpu::Sampler,
    default_label: wgpu::BindGroup,
    labels: FxHashMap<u64, wgpu::BindGroup>,

    geometries: FxHashMap<u64, GpuGeometry>,
    calls: Vec<DrawCall>,
    clear_color: wgpu::Color,
}

impl ScenePass {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, depth_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("../shaders/scene.wgsl"))),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Globals Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT, false)],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Object Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT, true)],
        });
        let label_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Label Layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(&globals_layout), Some(&object_layout), Some(&label_layout)],
            immediate_size: 0,
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Globals"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Globals BindGroup"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let (object_buffer, object_bind_group) = Self::create_object_buffer(device, &object_layout, INITIAL_OBJECT_CAPACITY);

        let label_sampler = linear_sampler(device, "Label Sampler");
        let white = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let default_label = Self::create_label_bind_group(device, queue, &label_layout, &label_sampler, &white);

        Self {
            shader,
            pipeline_layout,
            pipelines: FxHashMap::default(),
            depth_format,
            globals_buffer,
            globals_bind_group,
            object_layout,
            object_buffer,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            object_bind_group,
            object_staging: Vec::new(),
            label_layout,
            label_sampler,
            default_label,
            labels: FxHashMap::default(),
            geometries: FxHashMap::default(),
            calls: Vec::new(),
            clear_color: wgpu::Color::BLACK,
        }
    }

    fn create_object_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Objects"),
            size: capacity * OBJECT_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Objects BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_label_bind_group(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        image: &image::RgbaImage,
    ) -> wgpu::BindGroup {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Label Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        if width > 0 && height > 0 {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                size,
            );
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Label BindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn create_pipeline(&self, device: &wgpu::Device, key: PipelineKey) -> wgpu::RenderPipeline {
        let blend = match key.blend {
            BlendMode::Opaque => None,
            BlendMode::Transparent => Some(wgpu::BlendState::ALPHA_BLENDING),
            BlendMode::Additive => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
        };
        let topology = match key.topology {
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::Points => wgpu::PrimitiveTopology::PointList,
        };

        let attributes = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
            3 => Float32x3,
        ];

        log::debug!("Creating scene pipeline {key:?}");
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (VERTEX_FLOATS * std::mem::size_of::<f32>()) as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_TEXTURE_FORMAT,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: if key.double_sided || key.topology == Topology::Points {
                    None
                } else {
                    Some(wgpu::Face::Back)
                },
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.depth_format,
                depth_write_enabled: Some(key.blend == BlendMode::Opaque),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    /// Opaque items keep their order; blended ones follow, farthest first.
    fn draw_order(draws: &[DrawItem], eye: Vec3) -> Vec<usize> {
        let (mut opaque, mut blended): (Vec<usize>, Vec<usize>) =
            (0..draws.len()).partition(|&i| !draws[i].material.is_transparent());
        let depth = |i: usize| eye.distance_squared(draws[i].model.w_axis.truncate());
        blended.sort_by(|&a, &b| depth(b).total_cmp(&depth(a)));
        opaque.extend(blended);
        opaque
    }

    fn ensure_object_capacity(&mut self, device: &wgpu::Device, count: u64) {
        if count <= self.object_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        log::info!("Growing scene object buffer to {capacity} entries");
        let (buffer, bind_group) = Self::create_object_buffer(device, &self.object_layout, capacity);
        self.object_buffer = buffer;
        self.object_bind_group = bind_group;
        self.object_capacity = capacity;
    }

    fn prepare_label(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, label: &LabelTexture) {
        if self.labels.contains_key(&label.id()) {
            return;
        }
        let bind_group =
            Self::create_label_bind_group(device, queue, &self.label_layout, &self.label_sampler, &label.image);
        self.labels.insert(label.id(), bind_group);
    }

    /// Number of GPU geometries currently resident.
    #[must_use]
    pub fn cached_geometries(&self) -> usize {
        self.geometries.len()
    }
}

impl RenderNode for ScenePass {
    fn name(&self) -> &'static str {
        "Scene Render"
    }

    fn prepare(&mut self, ctx: &mut PrepareContext) {
        let device = &ctx.wgpu.device;
        let queue = &ctx.wgpu.queue;

        let globals = GlobalsUniform::from_scene(ctx.scene);
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let clear = ctx.scene.clear_color.to_linear();
        self.clear_color = wgpu::Color {
            r: f64::from(clear.x),
            g: f64::from(clear.y),
            b: f64::from(clear.z),
            a: 1.0,
        };

        self.calls.clear();
        self.object_staging.clear();
        let mut seen_geometries = FxHashSet::default();
        let mut seen_labels = FxHashSet::default();

        for index in Self::draw_order(ctx.draws, ctx.scene.camera.position()) {
            let item = &ctx.draws[index];
            if item.geometry.vertex_count() == 0 {
                continue;
            }

            let id = item.geometry.id();
            let stale = self
                .geometries
                .get(&id)
                .is_none_or(|gpu| gpu.version != item.geometry.version());
            if stale {
                self.geometries.insert(id, GpuGeometry::upload(device, &item.geometry));
            }
            seen_geometries.insert(id);

            if let Some(label) = &item.label {
                self.prepare_label(device, queue, label);
                seen_labels.insert(label.id());
            }

            let key = PipelineKey {
                blend: item.material.blend,
                topology: item.topology,
                double_sided: item.material.double_sided,
            };
            if !self.pipelines.contains_key(&key) {
                let pipeline = self.create_pipeline(device, key);
                self.pipelines.insert(key, pipeline);
            }

            let uniform = ObjectUniform::new(&item.model, &item.material, item.label.is_some());
            let offset = self.object_staging.len();
            self.object_staging.extend_from_slice(bytemuck::bytes_of(&uniform));
            self.object_staging.resize(offset + OBJECT_STRIDE as usize, 0);

            self.calls.push(DrawCall {
                pipeline: key,
                geometry: id,
                label: item.label.as_ref().map(LabelTexture::id),
                offset: offset as u32,
                topology: item.topology,
            });
        }

        self.geometries.retain(|id, _| seen_geometries.contains(id));
        self.labels.retain(|id, _| seen_labels.contains(id));

        self.ensure_object_capacity(device, self.calls.len() as u64);
        if !self.object_staging.is_empty() {
            queue.write_buffer(&self.object_buffer, 0, &self.object_staging);
        }
    }

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &ctx.targets.scene_color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.targets.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_bind_group(0, &self.globals_bind_group, &[]);

        for call in &self.calls {
            let (Some(pipeline), Some(geometry)) = (self.pipelines.get(&call.pipeline), self.geometries.get(&call.geometry))
            else {
                continue;
            };
            let label = call
                .label
                .and_then(|id| self.labels.get(&id))
                .unwrap_or(&self.default_label);

            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &self.object_bind_group, &[call.offset]);
            pass.set_bind_group(2, label, &[]);
            pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));

            match (&geometry.index, call.topology) {
                (Some((buffer, format, count)), Topology::Triangles) => {
                    pass.set_index_buffer(buffer.slice(..), *format);
                    pass.draw_indexed(0..*count, 0, 0..1);
                }
                _ => pass.draw(0..geometry.vertex_count, 0..1),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::primitives::{BoxOptions, create_box};

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 176);
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 128 + 48 * MAX_LIGHTS);
        assert!(std::mem::size_of::<ObjectUniform>() as u64 <= OBJECT_STRIDE);
    }

    #[test]
    fn interleave_fills_missing_colors_with_white() {
        let geometry = create_box(&BoxOptions::default());
        let data = interleave(&geometry);
        assert_eq!(data.len(), geometry.vertex_count() as usize * VERTEX_FLOATS);
        assert_eq!(&data[8..11], &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn spot_light_packs_cosine_of_angle() {
        let light = Light::spot(
            crate::config::Color::WHITE,
            2.0,
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::ZERO,
            10.0,
            std::f32::consts::FRAC_PI_3,
        );
        let packed = LightUniform::from(&light);
        assert_eq!(packed.color[3], 3.0);
        assert_eq!(packed.position[3], 10.0);
        assert!((packed.direction[3] - 0.5).abs() < 1e-5);
        assert!((packed.direction[1] + 1.0).abs() < 1e-5);
    }
}
