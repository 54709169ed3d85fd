//! GPU resource management
//!
//! Global uniforms and render targets shared by every draw.

pub mod depth_buffer;
pub mod global_bindings;

pub use depth_buffer::DepthBuffer;
pub use global_bindings::{
    create_global_ubo, update_global_ubo, GlobalBindings, GlobalUBO, LightConfig,
};
