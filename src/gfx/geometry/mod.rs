//! # Procedural Geometry Generation
//!
//! Primitive shapes used for the room shell, the gizmo handles and the
//! placeholder furniture that stands in for models that fail to load.
//!
//! All primitives are Y-up. Shapes can be moved with
//! [`GeometryData::translated`] and combined with [`GeometryData::append`],
//! which is how the furniture placeholders are assembled from boxes and
//! cylinders.
//!
//! ```rust
//! use furnish::gfx::geometry::{generate_box, generate_cylinder};
//!
//! let mut lamp = generate_cylinder(0.05, 1.4, 12).translated([0.0, 0.7, 0.0]);
//! lamp.append(&generate_box(0.4, 0.05, 0.4));
//! assert!(lamp.triangle_count() > 12);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Generated geometry ready to become a [`Mesh`](crate::gfx::scene::model::Mesh)
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns a copy moved by `offset`
    pub fn translated(mut self, offset: [f32; 3]) -> Self {
        for v in &mut self.vertices {
            v[0] += offset[0];
            v[1] += offset[1];
            v[2] += offset[2];
        }
        self
    }

    /// Appends another shape, rebasing its indices
    pub fn append(&mut self, other: &GeometryData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Interleaves positions and normals into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}
