//! Application frontends
//!
//! The engine core ([`Viewport`](crate::engine::Viewport)) is host-agnostic;
//! this module provides ready-made hosts.

#[cfg(feature = "winit")]
pub mod winit;
