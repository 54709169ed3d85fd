//! # Scene Interaction
//!
//! [`SceneController`] owns the scene and is the only thing that mutates it.
//! Pointer rays, keyboard [`Shortcut`]s and panel commands all funnel through
//! it, which keeps selection, gizmo and item collection consistent.

pub mod controller;
pub mod shortcuts;

pub use controller::{ControllerError, PointerAction, SceneController};
pub use shortcuts::Shortcut;
