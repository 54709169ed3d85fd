//! Small wgpu helpers shared by the renderer

pub mod uniform_buffer;

pub use uniform_buffer::UniformBuffer;
