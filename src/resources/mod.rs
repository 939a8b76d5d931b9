pub mod geometry;
pub mod input;
pub mod label;
pub mod material;
pub mod primitives;

pub use geometry::{Attribute, BoundingBox, Geometry, Indices};
pub use input::{DragButton, Input, InputHandle, ListenerKind, PointerEvent};
pub use label::{LabelTexture, rasterize_label};
pub use material::{BlendMode, MaterialParams, ShadingModel};
