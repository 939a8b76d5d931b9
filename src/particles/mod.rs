//! Particle Lifecycle Manager
//!
//! A bounded, pooled emitter. Particles live in an arena that only grows
//! while no inactive particle is available; dead particles go back to the
//! reserve and are reused by the next spawn.

mod pool;

pub use pool::{Particle, ParticlePool, ParticleSettings, ParticleShape, ParticleShapes};
