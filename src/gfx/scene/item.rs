use std::fmt;

use cgmath::{Deg, Matrix4, Vector3};
use wgpu::util::DeviceExt;

use super::model::Model;
use crate::{color::Color, furniture::FurnitureKind, gfx::picking::AABB};

/// Stable identifier of a placed item; never reused within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position, Euler rotation in degrees, and per-axis scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotation applied as yaw (Y), then pitch (X), then roll (Z)
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_y(Deg(self.rotation.y))
            * Matrix4::from_angle_x(Deg(self.rotation.x))
            * Matrix4::from_angle_z(Deg(self.rotation.z))
    }

    /// T * R * S
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * self.rotation_matrix()
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Per-item uniform data; must match `ItemUniform` in the shader
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ItemUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ItemUniform {
    pub fn new(matrix: Matrix4<f32>, color: [f32; 4]) -> Self {
        Self {
            model: matrix.into(),
            color,
        }
    }
}

/// Uniform buffer and bind group holding one item's transform and color
pub struct ItemGpuResources {
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ItemGpuResources {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, uniform: ItemUniform) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Item Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Item Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            uniform_buffer,
            bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: ItemUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }
}

/// Where an item's current model came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    /// Procedural stand-in, shown while loading and kept if loading fails
    Placeholder,
    /// Loaded from the model directory
    Asset,
}

/// A piece of furniture in the room.
///
/// The item owns its [`Model`] and its GPU resources exclusively; removing
/// the item from the scene drops both. Each item also owns its color, so
/// recoloring one chair never touches another.
pub struct PlacedItem {
    pub id: ItemId,
    pub kind: FurnitureKind,
    pub name: String,
    pub transform: Transform,
    pub color: Color,
    pub model: Model,
    pub source: ModelSource,
    pub gpu_resources: Option<ItemGpuResources>,
}

impl PlacedItem {
    pub fn new(id: ItemId, kind: FurnitureKind, name: String, model: Model, color: Color) -> Self {
        Self {
            id,
            kind,
            name,
            transform: Transform::default(),
            color,
            model,
            source: ModelSource::Placeholder,
            gpu_resources: None,
        }
    }

    /// World-space bounds under the current transform
    pub fn world_bounds(&self) -> AABB {
        self.model.local_bounds().transform(&self.transform.matrix())
    }

    /// Swaps in a new model, keeping transform and color
    pub fn replace_model(&mut self, model: Model, source: ModelSource) {
        self.model = model;
        self.source = source;
    }

    pub fn uniform(&self) -> ItemUniform {
        ItemUniform::new(self.transform.matrix(), self.color.to_rgba_f32())
    }

    /// Uploads meshes and creates the per-item uniform if missing
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) {
        self.model.init_gpu_resources(device);
        if self.gpu_resources.is_none() {
            self.gpu_resources = Some(ItemGpuResources::new(device, layout, self.uniform()));
        }
    }

    /// Pushes the current transform and color to the GPU
    pub fn update_gpu(&self, queue: &wgpu::Queue) {
        if let Some(resources) = &self.gpu_resources {
            resources.write(queue, self.uniform());
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|res| &res.bind_group)
    }
}

impl fmt::Debug for PlacedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacedItem")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("color", &self.color)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;

    #[test]
    fn world_bounds_follow_transform() {
        let model = Model::from_geometry(&generate_box(4.0, 1.0, 2.0).translated([0.0, 0.5, 0.0]));
        let mut item = PlacedItem::new(ItemId(1), FurnitureKind::Table, "Table 1".into(), model, Color::WHITE);
        item.transform.position = Vector3::new(3.0, 0.0, -1.0);
        item.transform.rotation.y = 90.0;
        item.transform.scale = Vector3::new(1.0, 2.0, 1.0);

        let bounds = item.world_bounds();
        assert!((bounds.size().x - 2.0).abs() < 1e-4);
        assert!((bounds.size().y - 2.0).abs() < 1e-4);
        assert!((bounds.size().z - 4.0).abs() < 1e-4);
        assert!((bounds.center().x - 3.0).abs() < 1e-4);
        assert!(bounds.min.y.abs() < 1e-4);
    }
}
