//! Procedural Geometry Generator
//!
//! Everything in the ambient scene is generated here from a seed: the
//! melted agent body, the Necropolis set-pieces and point cloud, the Ghost
//! scenario's fireflies and reveal overlay. Generation is pure; the same
//! seed always yields the same scene.

pub mod agent_body;
pub mod background;
pub mod fireflies;
pub mod reveal;
pub mod set_pieces;

pub use agent_body::{BodyShape, NoiseTerm, agent_body};
pub use background::{BackgroundScenario, GhostBackground, Necropolis};
pub use fireflies::{Firefly, FireflySwarm};
pub use reveal::RevealOverlay;
pub use set_pieces::{PointCloud, SetPiece, SetPieceKind, SetPiecePart};
