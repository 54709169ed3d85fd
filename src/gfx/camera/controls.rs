//! Mouse and keyboard input for the orbit camera.
//!
//! Left drag orbits, Shift + left drag pans, the wheel zooms and Shift+C
//! goes back to the starting view. Whether a drag orbits or pans is decided
//! when the button goes down and holds until it is released.

use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit_camera::OrbitCamera;
use crate::config::CameraConfig;

/// Trackpads report wheel motion in pixels
const PIXELS_PER_LINE: f32 = 20.0;

/// What the held button is doing to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Orbit,
    Pan,
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    rotate_speed: f32,
    zoom_speed: f32,
    pan_speed: f32,
    shift_held: bool,
    gesture: Gesture,
}

impl OrbitControls {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            shift_held: false,
            gesture: Gesture::Idle,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn press(&mut self) {
        self.gesture = if self.shift_held {
            Gesture::Pan
        } else {
            Gesture::Orbit
        };
    }

    /// Also used when the press belonged to the gizmo rather than the camera
    pub fn release(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Applies raw mouse motion; true when the camera moved
    pub fn drag(&self, delta: (f64, f64), camera: &mut OrbitCamera) -> bool {
        let (dx, dy) = (delta.0 as f32, delta.1 as f32);
        match self.gesture {
            Gesture::Idle => return false,
            Gesture::Orbit => {
                camera.add_yaw(-dx * self.rotate_speed);
                camera.add_pitch(dy * self.rotate_speed);
            }
            Gesture::Pan => camera.pan((-dx * self.pan_speed, dy * self.pan_speed)),
        }
        true
    }

    /// Positive `lines` scrolls away from the user and zooms in
    pub fn scroll(&self, lines: f32, camera: &mut OrbitCamera) {
        camera.add_distance(-lines * self.zoom_speed);
    }

    pub fn key(&mut self, code: KeyCode, pressed: bool, camera: &mut OrbitCamera) {
        match code {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.shift_held = pressed,
            KeyCode::KeyC if pressed && self.shift_held => {
                log::info!("Camera reset");
                camera.reset_to_default();
            }
            _ => (),
        }
    }
}

/// The orbit camera together with its input handling
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controls: OrbitControls,
}

impl CameraManager {
    pub fn from_config(config: &CameraConfig, target: cgmath::Vector3<f32>, aspect: f32) -> Self {
        Self {
            camera: OrbitCamera::from_config(config, target, aspect),
            controls: OrbitControls::from_config(config),
        }
    }

    pub fn process_event(&mut self, event: &DeviceEvent, window: &Window) {
        let moved = match event {
            // Left button
            DeviceEvent::Button { button: 0, state } => {
                match state {
                    ElementState::Pressed => self.controls.press(),
                    ElementState::Released => self.controls.release(),
                }
                false
            }
            DeviceEvent::MouseWheel { delta } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.controls.scroll(lines, &mut self.camera);
                true
            }
            DeviceEvent::MouseMotion { delta } => self.controls.drag(*delta, &mut self.camera),
            _ => false,
        };
        if moved {
            window.request_redraw();
        }
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            let pressed = event.state == ElementState::Pressed;
            self.controls.key(code, pressed, &mut self.camera);
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    fn setup() -> (OrbitControls, OrbitCamera) {
        let config = CameraConfig::default();
        let camera = OrbitCamera::from_config(&config, Vector3::new(0.0, 0.5, 0.0), 1.6);
        (OrbitControls::from_config(&config), camera)
    }

    #[test]
    fn motion_without_press_is_ignored() {
        let (controls, mut camera) = setup();
        let yaw = camera.yaw;
        assert!(!controls.drag((50.0, 10.0), &mut camera));
        assert_eq!(camera.yaw, yaw);
    }

    #[test]
    fn shift_at_press_time_pans_for_the_whole_drag() {
        let (mut controls, mut camera) = setup();
        let target = camera.target;

        controls.key(KeyCode::ShiftLeft, true, &mut camera);
        controls.press();
        controls.key(KeyCode::ShiftLeft, false, &mut camera);
        assert_eq!(controls.gesture(), Gesture::Pan);

        assert!(controls.drag((30.0, 0.0), &mut camera));
        assert_ne!(camera.target, target);

        controls.release();
        assert_eq!(controls.gesture(), Gesture::Idle);
    }

    #[test]
    fn orbit_turns_around_the_target() {
        let (mut controls, mut camera) = setup();
        let (yaw, target) = (camera.yaw, camera.target);
        controls.press();
        assert!(controls.drag((100.0, 0.0), &mut camera));
        assert!(camera.yaw < yaw);
        assert_eq!(camera.target, target);
    }

    #[test]
    fn wheel_up_zooms_in() {
        let (controls, mut camera) = setup();
        let distance = camera.distance;
        controls.scroll(1.0, &mut camera);
        assert!(camera.distance < distance);
    }

    #[test]
    fn shift_c_restores_the_start_view() {
        let (mut controls, mut camera) = setup();
        let yaw = camera.yaw;
        camera.add_yaw(1.0);

        controls.key(KeyCode::KeyC, true, &mut camera);
        assert_ne!(camera.yaw, yaw);

        controls.key(KeyCode::ShiftRight, true, &mut camera);
        controls.key(KeyCode::KeyC, true, &mut camera);
        assert_eq!(camera.yaw, yaw);
    }
}
