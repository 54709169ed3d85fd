use cgmath::*;

use super::uniform::CameraUniform;
use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Camera orbiting a target point, Y up
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
    home: OrbitHome,
}

/// Pose restored by [`OrbitCamera::reset_to_default`]
#[derive(Debug, Clone, Copy)]
struct OrbitHome {
    distance: f32,
    pitch: f32,
    yaw: f32,
    target: Vector3<f32>,
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Recalculated in `update()`
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
            home: OrbitHome {
                distance,
                pitch,
                yaw,
                target,
            },
        };
        camera.update();
        camera
    }

    /// Camera looking at `target` with pose and projection from configuration
    pub fn from_config(config: &CameraConfig, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self::new(config.distance, config.pitch, config.yaw, target, aspect);
        camera.fovy = Deg(config.fov).into();
        camera.znear = config.near;
        camera.zfar = config.far;
        camera.bounds.max_distance = Some(config.far * 0.5);
        camera
    }

    pub fn reset_to_default(&mut self) {
        self.distance = self.home.distance;
        self.pitch = self.home.pitch;
        self.yaw = self.home.yaw;
        self.target = self.home.target;
        self.update();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance.max(1.1)) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale by distance for a consistent feel at all zoom levels
        let pan_scale = self.distance * 0.1;

        let movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;
        self.eye += movement;
        self.target += movement;
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    pub fn update_view_proj(&mut self) {
        self.uniform = CameraUniform::new(self.eye, self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(1.0),
            max_distance: Some(60.0),
            // Stay above the floor
            min_pitch: 0.05,
            max_pitch: std::f32::consts::PI / 2.0 - 0.01,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_at_distance_from_target() {
        let target = Vector3::new(1.0, 0.0, -2.0);
        let camera = OrbitCamera::new(10.0, 0.5, 1.0, target, 1.0);
        assert!(((camera.eye - target).magnitude() - 10.0).abs() < 1e-4);
        assert!(camera.eye.y > target.y);
    }

    #[test]
    fn pitch_is_clamped_above_floor() {
        let mut camera = OrbitCamera::new(10.0, 0.5, 0.0, Vector3::zero(), 1.0);
        camera.set_pitch(-1.0);
        assert_eq!(camera.pitch, camera.bounds.min_pitch);
    }

    #[test]
    fn reset_restores_initial_pose() {
        let mut camera = OrbitCamera::new(12.0, 0.4, 0.2, Vector3::zero(), 1.0);
        camera.add_yaw(1.0);
        camera.pan((1.0, 0.5));
        camera.reset_to_default();
        assert_eq!(camera.yaw, 0.2);
        assert_eq!(camera.target, Vector3::zero());
    }
}
