//! datavis3d-rs: renderer-agnostic core of a 3D bar/scatter/surface graph toolkit.
//!
//! Applications mutate the live scene description in [`core`]. The
//! controller in [`api`] copies pending changes into the renderer-facing
//! caches of [`render`] once per frame.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{GraphConfig, GraphController, GraphKind};
pub use error::{GraphError, GraphResult};
