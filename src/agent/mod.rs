//! Agent Controller
//!
//! One pointer-reactive primary agent plus a grid of ambient secondaries,
//! all instances of a single shared [`AgentTemplate`].

pub mod primary;
pub mod secondary;
pub mod template;

pub use primary::{AgentBehavior, EmitRequest, PointerSample, PrimaryAgent};
pub use secondary::{SecondaryAgent, layout_secondaries};
pub use template::{AgentInstance, AgentTemplate};
