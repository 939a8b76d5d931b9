use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Affine3A, Vec2, Vec3};
use rustc_hash::FxHashMap;
use wgpu::VertexFormat;

/// Planar vertex attribute: one tightly packed array of a single format.
///
/// The bytes live behind an `Arc`, so cloning a [`Geometry`] to derive a
/// displaced variant only copies the attributes that are actually rewritten.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub data: Arc<Vec<u8>>,
    /// Data version for change detection on the GPU side.
    pub version: u64,
    pub format: VertexFormat,
    pub count: u32,
    pub stride: u64,
}

static NEXT_ATTR_VERSION: AtomicU64 = AtomicU64::new(1);
static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

impl Attribute {
    /// Creates a planar (non-interleaved) attribute.
    pub fn new_planar<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        Self {
            data: Arc::new(bytemuck::cast_slice(data).to_vec()),
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
            format,
            count: data.len() as u32,
            stride: std::mem::size_of::<T>() as u64,
        }
    }

    /// Rewrites the data in place (copy-on-write when shared).
    pub fn update_data<T: bytemuck::Pod>(&mut self, new_data: &[T]) {
        let vec = Arc::make_mut(&mut self.data);
        let bytes: &[u8] = bytemuck::cast_slice(new_data);
        vec.clear();
        vec.extend_from_slice(bytes);
        self.count = new_data.len() as u32;
        self.version = NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn read_vec3(&self, i: u32) -> Option<Vec3> {
        if self.format != VertexFormat::Float32x3 {
            return None;
        }
        let start = (i as usize) * self.stride as usize;
        let bytes: &[u8; 12] = self.data.get(start..start + 12)?.try_into().ok()?;
        let vals: [f32; 3] = bytemuck::cast(*bytes);
        Some(Vec3::from_array(vals))
    }

    #[must_use]
    pub fn read_vec2(&self, i: u32) -> Option<Vec2> {
        if self.format != VertexFormat::Float32x2 {
            return None;
        }
        let start = (i as usize) * self.stride as usize;
        let bytes: &[u8; 8] = self.data.get(start..start + 8)?.try_into().ok()?;
        let vals: [f32; 2] = bytemuck::cast(*bytes);
        Some(Vec2::from_array(vals))
    }

    /// Reads every element as a `Vec3`. Empty for non-`Float32x3` attributes.
    #[must_use]
    pub fn to_vec3s(&self) -> Vec<Vec3> {
        (0..self.count).filter_map(|i| self.read_vec3(i)).collect()
    }
}

/// Index buffer storage. `u16` is preferred; `u32` once vertices exceed it.
#[derive(Debug, Clone)]
pub enum Indices {
    U16(Arc<Vec<u16>>),
    U32(Arc<Vec<u32>>),
}

impl Indices {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Indices::U16(v) => Box::new(v.iter().map(|&i| u32::from(i))),
            Indices::U32(v) => Box::new(v.iter().copied()),
        }
    }

    #[must_use]
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            Indices::U16(_) => wgpu::IndexFormat::Uint16,
            Indices::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(v) => bytemuck::cast_slice(v.as_slice()),
            Indices::U32(v) => bytemuck::cast_slice(v.as_slice()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let mut out = Self::empty();
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.expand_by_point(matrix.transform_point3(corner));
        }
        out
    }
}

/// CPU-side triangle mesh.
///
/// Geometry is immutable once shared through an `Arc`; the renderer keys its
/// GPU buffers on [`Geometry::id`].
#[derive(Debug, Clone)]
pub struct Geometry {
    id: u64,
    attributes: FxHashMap<String, Attribute>,
    indices: Option<Indices>,
    pub bounding_box: Option<BoundingBox>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed),
            attributes: FxHashMap::default(),
            indices: None,
            bounding_box: None,
        }
    }

    /// Clones the data under a fresh id, for deriving a modified variant.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed),
            ..self.clone()
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        self.attributes.insert(name.to_string(), attr);
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    /// Highest attribute version; changes whenever any attribute is rewritten.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.attributes.values().map(|a| a.version).max().unwrap_or(0)
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.attributes.get("position").map_or(0, |a| a.count)
    }

    #[must_use]
    pub fn positions(&self) -> Vec<Vec3> {
        self.attributes
            .get("position")
            .map(Attribute::to_vec3s)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn normals(&self) -> Vec<Vec3> {
        self.attributes
            .get("normal")
            .map(Attribute::to_vec3s)
            .unwrap_or_default()
    }

    pub fn set_positions(&mut self, positions: &[Vec3]) {
        let raw: Vec<[f32; 3]> = positions.iter().map(|p| p.to_array()).collect();
        match self.attributes.get_mut("position") {
            Some(attr) => attr.update_data(&raw),
            None => self.set_attribute("position", Attribute::new_planar(&raw, VertexFormat::Float32x3)),
        }
    }

    pub fn set_indices(&mut self, indices: &[u16]) {
        self.indices = Some(Indices::U16(Arc::new(indices.to_vec())));
    }

    pub fn set_indices_u32(&mut self, indices: &[u32]) {
        self.indices = Some(Indices::U32(Arc::new(indices.to_vec())));
    }

    /// Picks the narrowest index width that fits `vertex_count`.
    pub fn set_indices_auto(&mut self, indices: &[u32]) {
        if self.vertex_count() <= u32::from(u16::MAX) {
            let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            self.set_indices(&narrow);
        } else {
            self.set_indices_u32(indices);
        }
    }

    #[must_use]
    pub fn indices(&self) -> Option<&Indices> {
        self.indices.as_ref()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(i) => i.len() / 3,
            None => self.vertex_count() as usize / 3,
        }
    }

    /// Recomputes smooth, area-weighted vertex normals.
    pub fn compute_vertex_normals(&mut self) {
        let positions = self.positions();
        if positions.is_empty() {
            return;
        }
        let count = positions.len();
        let mut normals = vec![Vec3::ZERO; count];

        let mut accumulate = |i0: usize, i1: usize, i2: usize| {
            if i0 >= count || i1 >= count || i2 >= count {
                return;
            }
            // |cross| is twice the triangle area, which gives the weighting.
            let face = (positions[i1] - positions[i0]).cross(positions[i2] - positions[i0]);
            normals[i0] += face;
            normals[i1] += face;
            normals[i2] += face;
        };

        if let Some(indices) = &self.indices {
            let flat: Vec<u32> = indices.iter().collect();
            for tri in flat.chunks_exact(3) {
                accumulate(tri[0] as usize, tri[1] as usize, tri[2] as usize);
            }
        } else {
            for i in (0..count.saturating_sub(2)).step_by(3) {
                accumulate(i, i + 1, i + 2);
            }
        }

        // Seam vertices of a UV sphere share a position but not an index;
        // merge their sums so the seam shades continuously.
        let mut by_position: FxHashMap<[i32; 3], Vec3> = FxHashMap::default();
        for (p, n) in positions.iter().zip(&normals) {
            *by_position.entry(position_key(*p)).or_insert(Vec3::ZERO) += *n;
        }
        let normals: Vec<[f32; 3]> = positions
            .iter()
            .map(|p| by_position[&position_key(*p)].normalize_or_zero().to_array())
            .collect();

        self.set_attribute("normal", Attribute::new_planar(&normals, VertexFormat::Float32x3));
    }

    pub fn compute_bounding_volume(&mut self) {
        let positions = self.positions();
        if positions.is_empty() {
            self.bounding_box = None;
            return;
        }

        let mut bbox = BoundingBox::empty();
        for p in &positions {
            bbox.expand_by_point(*p);
        }
        self.bounding_box = Some(bbox);
    }
}

fn position_key(p: Vec3) -> [i32; 3] {
    let q = (p * 1.0e5).round();
    [q.x as i32, q.y as i32, q.z as i32]
}
