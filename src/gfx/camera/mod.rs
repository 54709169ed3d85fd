pub mod controls;
pub mod orbit_camera;
pub mod uniform;

pub use controls::{CameraManager, Gesture, OrbitControls};
pub use orbit_camera::OrbitCamera;
pub use uniform::CameraUniform;
