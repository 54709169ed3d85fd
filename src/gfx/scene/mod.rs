//! # Scene Management Module
//!
//! The scene is the room plus the furniture placed in it.
//!
//! ## Key Components
//!
//! - [`Scene`] - Item collection, id allocation and statistics
//! - [`Room`] - Room bounds, clamping and the shell geometry
//! - [`PlacedItem`] - A furniture item with transform, color and its owned [`Model`]
//! - [`Model`] / [`Mesh`] - CPU mesh data with lazily created GPU buffers
//! - [`Vertex3D`] - Vertex layout shared by every mesh
//!
//! ## Ownership
//!
//! Items own their model and GPU resources. Removing an item from the
//! [`Scene`] and dropping it releases everything it rendered with.

pub mod item;
pub mod model;
pub mod room;
pub mod scene;
pub mod vertex;

pub use item::{ItemId, ModelSource, PlacedItem, Transform};
pub use model::{DrawModel, Mesh, Model};
pub use room::Room;
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
