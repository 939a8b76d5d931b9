//! # Specter
//!
//! A procedural, pointer-reactive scene engine on wgpu: a glowing ghost
//! agent follows the pointer through a generated backdrop, sheds pooled
//! particles while it moves, and the frame goes through bloom and an
//! analog-decay filter before it reaches the screen.
//!
//! Entry point is [`Viewport`], mounted on anything implementing [`Host`].
//! With the `winit` feature, [`app::winit::App`] provides a ready-made host.

pub mod agent;
pub mod animation;
pub mod app;
pub mod config;
pub mod engine;
pub mod errors;
pub mod particles;
pub mod procedural;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use agent::{AgentTemplate, PrimaryAgent, SecondaryAgent};
pub use animation::{AnimationClip, AnimationCommand, AnimationController, AnimationEvent, AnimationState, LoopMode};
pub use config::{Color, SceneConfig};
pub use engine::{ControlHandle, FrameReport, FrameRequest, Host, LifecycleState, Viewport};
pub use errors::{Result, SpecterError};
pub use particles::{ParticlePool, ParticleSettings};
pub use procedural::BackgroundScenario;
pub use renderer::post::{PassKind, PostProcessPipeline};
pub use renderer::settings::RendererSettings;
pub use renderer::{FrameOutcome, Renderer};
pub use resources::input::{DragButton, InputHandle, PointerEvent};
pub use resources::{Geometry, MaterialParams};
pub use scene::{AssetNode, ModelState, Scene, SceneAsset};
pub use utils::{FrameClock, FrameStep};
