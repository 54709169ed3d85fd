//! # Gizmo System
//!
//! The transform gizmo is the in-scene widget for moving, rotating and
//! scaling the selected item. It is pure math over [`Ray`]s and bounding
//! boxes; the renderer draws its handles and the scene controller applies
//! the transforms it produces.
//!
//! ## Key Components
//!
//! - [`TransformGizmo`] - Attachment, mode and drag state
//! - [`TransformMode`] - Move, rotate or scale
//! - [`GizmoHandle`] / [`Axis`] - What part of the gizmo a drag grabbed
//!
//! [`Ray`]: crate::gfx::picking::Ray

pub mod transform_gizmo;

pub use transform_gizmo::{
    wrap_degrees, Axis, GizmoHandle, HandleShape, TransformGizmo, TransformMode, MIN_SCALE,
};
