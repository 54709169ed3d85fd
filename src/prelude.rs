//! # Furnish Prelude
//!
//! Commonly used types for driving the editor programmatically.
//!
//! ```no_run
//! use furnish::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = furnish::default()?;
//!
//!     // Start with a table in the middle of the room
//!     app.controller_mut().add_furniture_at(FurnitureKind::Table, 0.0, 0.0);
//!     app.run()
//! }
//! ```

// Core application types
pub use crate::app::FurnishApp;
pub use crate::config::AppConfig;
pub use crate::interaction::{PointerAction, SceneController, Shortcut};

// Scene and furniture
pub use crate::color::Color;
pub use crate::furniture::{Furniture, FurnitureKind};
pub use crate::gfx::gizmos::TransformMode;
pub use crate::gfx::picking::Ray;
pub use crate::gfx::scene::{ItemId, PlacedItem, Room, Scene, Transform};

// Model loading
pub use crate::assets::{AssetLoader, ModelProvider, ObjDirectory};

// Common external types
pub use cgmath::Vector3;
