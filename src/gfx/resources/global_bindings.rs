//! Global uniform bindings for camera and light data
//!
//! One uniform buffer shared by every draw in a frame, bound at group 0.

use cgmath::{InnerSpace, Vector3};

use crate::{
    config::RenderingConfig, gfx::camera::CameraUniform,
    wgpu_utils::uniform_buffer::UniformBuffer,
};

/// Per-frame global data. MUST match `Globals` in `shader.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// xyz: normalized direction the light travels, w: ambient strength
    light: [f32; 4],
}

/// Directional light with a flat ambient term
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub direction: Vector3<f32>,
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self::from(&RenderingConfig::default())
    }
}

impl From<&RenderingConfig> for LightConfig {
    fn from(config: &RenderingConfig) -> Self {
        let [x, y, z] = config.light_direction;
        let direction = Vector3::new(x, y, z);
        // A zero vector would turn into NaNs in the shader; light straight down instead
        let direction = if direction.magnitude2() > f32::EPSILON {
            direction.normalize()
        } else {
            -Vector3::unit_y()
        };
        Self {
            direction,
            ambient: config.ambient_strength.clamp(0.0, 1.0),
        }
    }
}

impl GlobalUBOContent {
    pub fn new(camera: CameraUniform, light: LightConfig) -> Self {
        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            light: [
                light.direction.x,
                light.direction.y,
                light.direction.z,
                light.ambient,
            ],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Global buffer seeded with an identity camera and `light`
pub fn create_global_ubo(device: &wgpu::Device, light: LightConfig) -> GlobalUBO {
    GlobalUBO::new(
        device,
        "Global UBO",
        &GlobalUBOContent::new(CameraUniform::default(), light),
    )
}

/// Writes this frame's camera and light into the global buffer
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: LightConfig,
) {
    ubo.write(queue, &GlobalUBOContent::new(camera, light));
}

/// Layout and bind group for [`GlobalUBO`] at group 0
pub struct GlobalBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("BindGroupLayout: GlobalBindings"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("BindGroup: GlobalBindings"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        }));
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// `None` until [`Self::create_bind_group`] has been called
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}
