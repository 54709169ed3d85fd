//! # User Interface Module
//!
//! Dear ImGui-based user interface for the furniture editor.
//!
//! ## Key Components
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`panel`] - The furniture sidebar and its command types
//!
//! ## Input Handling
//!
//! When ImGui wants the mouse or keyboard, the app keeps those events away
//! from picking, gizmo drags and camera controls.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::{furnish_panel, PanelCommand, PanelState, SelectionView};
