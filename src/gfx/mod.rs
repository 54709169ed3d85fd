//! # Graphics Module
//!
//! Everything needed to show and interact with the room in 3D.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with mouse and keyboard controls
//! - **Geometry** ([`geometry`]) - Procedural boxes, cylinders and planes
//! - **Gizmos** ([`gizmos`]) - Move/rotate/scale widget for the selected item
//! - **Picking** ([`picking`]) - Rays, bounding boxes and item hit-testing
//! - **Rendering Pipeline** ([`rendering`]) - Device setup and per-frame drawing
//! - **Resource Management** ([`resources`]) - Global uniforms and depth buffer
//! - **Scene Management** ([`scene`]) - The room and the furniture placed in it
//!
//! Only [`rendering`] and the GPU halves of [`scene`] touch wgpu state.
//! Everything else runs headless, which is how the interaction tests drive it.

pub mod camera;
pub mod geometry;
pub mod gizmos;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
