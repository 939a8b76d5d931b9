//! Utility Module
//!
//! - [`OrbitControls`]: camera orbit controller driven by pointer drags
//! - [`time`]: host-timestamp frame clock
//! - [`random`]: seeded sampling helpers shared by the generators

pub mod orbit_control;
pub mod random;
pub mod time;

pub use orbit_control::OrbitControls;
pub use time::{FrameClock, FrameStep};
