use cgmath::{Matrix4, SquareMatrix, Vector3};

/// Camera part of the global uniform, group 0 in the shader
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// Eye position; `w` pads to 16 bytes
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(eye: Vector3<f32>, view_proj: Matrix4<f32>) -> Self {
        Self {
            view_position: [eye.x, eye.y, eye.z, 1.0],
            view_proj: view_proj.into(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0), Matrix4::identity())
    }
}
