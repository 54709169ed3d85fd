use std::{fmt, ops::Range};

use cgmath::Vector3;
use wgpu::{util::DeviceExt, Device};

use super::vertex::Vertex3D;
use crate::gfx::{geometry::GeometryData, picking::AABB};

/// GPU buffers for one mesh; dropped together with the owning mesh
pub struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

/// Triangle mesh with CPU-side data kept for picking and bounds
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    buffers: Option<MeshBuffers>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            buffers: None,
        }
    }

    /// Build from flat position/normal arrays as produced by an OBJ reader
    pub fn from_flat(positions: &[f32], normals: &[f32], indices: Vec<u32>) -> Self {
        let vertices = positions
            .chunks_exact(3)
            .zip(normals.chunks_exact(3))
            .map(|(p, n)| Vertex3D {
                position: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
            })
            .collect();
        Self::new(vertices, indices)
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_uploaded(&self) -> bool {
        self.buffers.is_some()
    }

    /// Averaged per-vertex normals for meshes that ship without any
    pub fn calculate_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut normals = vec![0.0f32; positions.len()];
        let corner = |i: usize| Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }
            let face = (corner(i1) - corner(i0)).cross(corner(i2) - corner(i0));
            for i in [i0, i1, i2] {
                normals[i * 3] += face.x;
                normals[i * 3 + 1] += face.y;
                normals[i * 3 + 2] += face.z;
            }
        }

        for n in normals.chunks_exact_mut(3) {
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if length > 0.0 {
                n.iter_mut().for_each(|c| *c /= length);
            } else {
                n.copy_from_slice(&[0.0, 1.0, 0.0]);
            }
        }

        normals
    }

    fn transform_positions(&mut self, scale: f32, offset: Vector3<f32>) {
        for v in &mut self.vertices {
            v.position = [
                v.position[0] * scale + offset.x,
                v.position[1] * scale + offset.y,
                v.position[2] * scale + offset.z,
            ];
        }
        // stale after a CPU-side edit
        self.buffers = None;
    }

    fn upload(&mut self, device: &Device) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.buffers = Some(MeshBuffers {
            vertex_buffer,
            index_buffer,
        });
    }
}

/// The visual representation of a placed item: a set of meshes in a shared
/// local space, with their combined bounds cached
pub struct Model {
    meshes: Vec<Mesh>,
    local_bounds: AABB,
}

impl Model {
    pub fn new(meshes: Vec<Mesh>) -> Self {
        let local_bounds = Self::compute_bounds(&meshes);
        Self {
            meshes,
            local_bounds,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        Self::new(vec![Mesh::new(geometry.to_vertices(), geometry.indices.clone())])
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn local_bounds(&self) -> AABB {
        self.local_bounds
    }

    pub fn triangle_count(&self) -> u32 {
        self.meshes.iter().map(|m| m.index_count() / 3).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    /// Uniformly rescales the model to `target_height`, then moves it so its
    /// base rests on `y = 0` and its footprint is centered on the Y axis
    pub fn normalize_to_height(mut self, target_height: f32) -> Self {
        let bounds = self.local_bounds;
        let height = bounds.size().y;
        let scale = if height > f32::EPSILON {
            target_height / height
        } else {
            1.0
        };

        let center = bounds.center();
        let offset = Vector3::new(-center.x * scale, -bounds.min.y * scale, -center.z * scale);

        for mesh in &mut self.meshes {
            mesh.transform_positions(scale, offset);
        }
        self.local_bounds = Self::compute_bounds(&self.meshes);
        self
    }

    /// Creates vertex and index buffers for meshes that have none yet
    pub fn init_gpu_resources(&mut self, device: &Device) {
        for mesh in self.meshes.iter_mut().filter(|m| !m.is_uploaded()) {
            mesh.upload(device);
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.meshes.iter().all(Mesh::is_uploaded)
    }

    fn compute_bounds(meshes: &[Mesh]) -> AABB {
        AABB::from_points(meshes.iter().flat_map(|m| {
            m.vertices
                .iter()
                .map(|v| Vector3::new(v.position[0], v.position[1], v.position[2]))
        }))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("meshes", &self.meshes.len())
            .field("triangles", &self.triangle_count())
            .field("local_bounds", &self.local_bounds)
            .finish()
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    fn draw_model(&mut self, model: &'a Model);
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        // Skip meshes that have not been uploaded yet
        let Some(buffers) = &mesh.buffers else {
            return;
        };

        self.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
        self.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count(), 0, instances);
    }

    fn draw_model(&mut self, model: &'b Model) {
        for mesh in &model.meshes {
            self.draw_mesh(mesh);
        }
    }
}
