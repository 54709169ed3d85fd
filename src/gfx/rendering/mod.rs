//! Frame rendering
//!
//! Owns the wgpu device, surface and pipelines, and draws the scene each frame.

pub mod render_engine;

pub use render_engine::{RenderEngine, RenderError};
