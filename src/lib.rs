// src/lib.rs
//! Furnish
//!
//! A room furnishing prototype built on wgpu, winit and Dear ImGui: place
//! furniture in a room, move, rotate and scale it with a gizmo, recolor it
//! and delete it.
//!
//! The interaction core ([`interaction::SceneController`]) runs without a
//! window or GPU, so the whole editing workflow can be driven from tests.

pub mod app;
pub mod assets;
pub mod color;
pub mod config;
pub mod furniture;
pub mod gfx;
pub mod interaction;
pub mod prelude;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::FurnishApp;
pub use config::AppConfig;
pub use interaction::SceneController;

/// Creates the application from `config/` and the environment
pub fn default() -> anyhow::Result<FurnishApp> {
    let config = AppConfig::load()?;
    FurnishApp::new(config)
}
