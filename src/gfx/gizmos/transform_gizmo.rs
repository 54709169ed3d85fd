//! Move/rotate/scale widget attached to the selected item.
//!
//! The gizmo is pure math: it lays out its handles around the item, hit-tests
//! them against a ray, and turns pointer motion into a new [`Transform`].
//! Writing the result back and keeping the item inside the room is up to the
//! caller.

use std::fmt;

use cgmath::{InnerSpace, Vector3};

use crate::{
    color::Color,
    gfx::{
        picking::{Ray, AABB},
        scene::{ItemId, Transform},
    },
};

/// Smallest scale factor any axis may reach
pub const MIN_SCALE: f32 = 0.1;

const HANDLE_THICKNESS: f32 = 0.08;
const CENTER_HANDLE_SIZE: f32 = 0.25;
const MIN_HANDLE_LENGTH: f32 = 0.75;

/// How a drag changes the attached item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub const ALL: [TransformMode; 3] = [
        TransformMode::Translate,
        TransformMode::Rotate,
        TransformMode::Scale,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TransformMode::Translate => "Move",
            TransformMode::Rotate => "Rotate",
            TransformMode::Scale => "Scale",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(&self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::unit_x(),
            Axis::Y => Vector3::unit_y(),
            Axis::Z => Vector3::unit_z(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Axis::X => Color::rgb(0xE0, 0x40, 0x40),
            Axis::Y => Color::rgb(0x40, 0xC0, 0x40),
            Axis::Z => Color::rgb(0x40, 0x60, 0xE0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoHandle {
    /// Single axis
    Axis(Axis),
    /// Free movement on the floor plane, uniform scale
    Center,
}

impl GizmoHandle {
    pub const ALL: [GizmoHandle; 4] = [
        GizmoHandle::Axis(Axis::X),
        GizmoHandle::Axis(Axis::Y),
        GizmoHandle::Axis(Axis::Z),
        GizmoHandle::Center,
    ];

    pub fn color(&self) -> Color {
        match self {
            GizmoHandle::Axis(axis) => axis.color(),
            GizmoHandle::Center => Color::rgb(0xF0, 0xC0, 0x30),
        }
    }
}

/// A handle's box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleShape {
    pub handle: GizmoHandle,
    pub bounds: AABB,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    handle: GizmoHandle,
    mode: TransformMode,
    start: Transform,
    origin: Vector3<f32>,
    plane_normal: Vector3<f32>,
    anchor: Vector3<f32>,
    handle_length: f32,
}

#[derive(Debug, Default)]
pub struct TransformGizmo {
    mode: TransformMode,
    attached: Option<ItemId>,
    drag: Option<DragState>,
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, item: ItemId) {
        if self.attached != Some(item) {
            self.drag = None;
        }
        self.attached = Some(item);
    }

    pub fn detach(&mut self) {
        self.attached = None;
        self.drag = None;
    }

    pub fn attached(&self) -> Option<ItemId> {
        self.attached
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    /// Takes effect on the next drag
    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active_handle(&self) -> Option<GizmoHandle> {
        self.drag.map(|drag| drag.handle)
    }

    /// Handle boxes for an item with the given world bounds; axis handles
    /// start at the bounds center and reach past the item
    pub fn handle_shapes(item_bounds: &AABB) -> [HandleShape; 4] {
        let origin = item_bounds.center();
        let length = Self::handle_length(item_bounds);
        let half = HANDLE_THICKNESS * 0.5;

        GizmoHandle::ALL.map(|handle| {
            let bounds = match handle {
                GizmoHandle::Axis(axis) => {
                    let tip = origin + axis.unit() * length;
                    let pad = Vector3::new(half, half, half);
                    AABB::from_points([origin - pad, tip + pad])
                }
                GizmoHandle::Center => {
                    let h = CENTER_HANDLE_SIZE * 0.5;
                    AABB::new(origin - Vector3::new(h, h, h), origin + Vector3::new(h, h, h))
                }
            };
            HandleShape { handle, bounds }
        })
    }

    /// Closest handle hit by the ray
    pub fn hit_handle(ray: &Ray, item_bounds: &AABB) -> Option<GizmoHandle> {
        Self::handle_shapes(item_bounds)
            .iter()
            .filter_map(|shape| shape.bounds.intersect_ray(ray).map(|t| (shape.handle, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle)
    }

    /// Starts dragging `handle`. Returns false when the ray cannot reach the
    /// drag plane, e.g. when looking exactly along it.
    pub fn begin_drag(
        &mut self,
        handle: GizmoHandle,
        ray: &Ray,
        start: Transform,
        item_bounds: &AABB,
    ) -> bool {
        if self.attached.is_none() {
            return false;
        }

        let origin = item_bounds.center();
        let plane_normal = Self::drag_plane_normal(self.mode, handle, ray);
        let Some(t) = ray.intersect_plane(origin, plane_normal) else {
            return false;
        };

        self.drag = Some(DragState {
            handle,
            mode: self.mode,
            start,
            origin,
            plane_normal,
            anchor: ray.point_at(t),
            handle_length: Self::handle_length(item_bounds),
        });
        true
    }

    /// Transform the item should take for the current pointer ray
    pub fn update_drag(&self, ray: &Ray) -> Option<Transform> {
        let drag = self.drag?;
        let t = ray.intersect_plane(drag.origin, drag.plane_normal)?;
        let hit = ray.point_at(t);
        let delta = hit - drag.anchor;

        let mut transform = drag.start;
        match (drag.mode, drag.handle) {
            (TransformMode::Translate, GizmoHandle::Axis(axis)) => {
                transform.position += axis.unit() * delta.dot(axis.unit());
            }
            (TransformMode::Translate, GizmoHandle::Center) => {
                transform.position += Vector3::new(delta.x, 0.0, delta.z);
            }
            (TransformMode::Rotate, _) => {
                let start_angle = floor_angle(drag.anchor - drag.origin)?;
                let angle = floor_angle(hit - drag.origin)?;
                let degrees = (angle - start_angle).to_degrees();
                transform.rotation.y = wrap_degrees(drag.start.rotation.y + degrees);
            }
            (TransformMode::Scale, GizmoHandle::Axis(axis)) => {
                let factor = 1.0 + delta.dot(axis.unit()) / drag.handle_length;
                let i = axis.index();
                transform.scale[i] = (drag.start.scale[i] * factor).max(MIN_SCALE);
            }
            (TransformMode::Scale, GizmoHandle::Center) => {
                // Moving away from the center by one handle length doubles the size
                let reach = (hit - drag.origin).magnitude() - (drag.anchor - drag.origin).magnitude();
                let factor = 1.0 + reach / drag.handle_length;
                transform.scale = (drag.start.scale * factor).map(|s| s.max(MIN_SCALE));
            }
        }

        Some(transform)
    }

    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    fn handle_length(item_bounds: &AABB) -> f32 {
        let half = item_bounds.half_extents();
        (half.x.max(half.y).max(half.z) + 0.5).max(MIN_HANDLE_LENGTH)
    }

    fn drag_plane_normal(mode: TransformMode, handle: GizmoHandle, ray: &Ray) -> Vector3<f32> {
        match (mode, handle) {
            (TransformMode::Rotate, _) | (_, GizmoHandle::Center) => Vector3::unit_y(),
            (_, GizmoHandle::Axis(axis)) => {
                // Plane containing the axis, turned toward the viewer
                let a = axis.unit();
                let facing = ray.direction - a * ray.direction.dot(a);
                if facing.magnitude2() > 1e-6 {
                    facing.normalize()
                } else {
                    Self::fallback_normal(axis)
                }
            }
        }
    }

    fn fallback_normal(axis: Axis) -> Vector3<f32> {
        match axis {
            Axis::Y => Vector3::unit_z(),
            _ => Vector3::unit_y(),
        }
    }
}

/// Angle of a vector around +Y, matching the sense of `Matrix4::from_angle_y`
fn floor_angle(v: Vector3<f32>) -> Option<f32> {
    let flat = Vector3::new(v.x, 0.0, v.z);
    if flat.magnitude2() < 1e-8 {
        return None;
    }
    Some((-v.z).atan2(v.x))
}

/// Wraps into (-180, 180]
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    fn unit_item() -> AABB {
        AABB::new(Vector3::new(-0.5, 0.0, -0.5), Vector3::new(0.5, 1.0, 0.5))
    }

    fn down_at(x: f32, z: f32) -> Ray {
        Ray::new(Vector3::new(x, 10.0, z), Vector3::new(0.0, -1.0, 0.0))
    }

    fn attached() -> TransformGizmo {
        let mut gizmo = TransformGizmo::new();
        gizmo.attach(ItemId(1));
        gizmo
    }

    #[test]
    fn default_mode_is_translate() {
        assert_eq!(TransformGizmo::new().mode(), TransformMode::Translate);
    }

    #[test]
    fn attach_replaces_and_detach_is_idempotent() {
        let mut gizmo = attached();
        gizmo.attach(ItemId(2));
        assert_eq!(gizmo.attached(), Some(ItemId(2)));
        gizmo.detach();
        gizmo.detach();
        assert_eq!(gizmo.attached(), None);
    }

    #[test]
    fn hits_axis_handle_beyond_the_item() {
        let bounds = unit_item();
        let ray = Ray::new(Vector3::new(0.9, 0.5, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(
            TransformGizmo::hit_handle(&ray, &bounds),
            Some(GizmoHandle::Axis(Axis::X))
        );
        let miss = Ray::new(Vector3::new(5.0, 5.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(TransformGizmo::hit_handle(&miss, &bounds), None);
    }

    #[test]
    fn center_drag_moves_on_the_floor() {
        let mut gizmo = attached();
        let bounds = unit_item();
        assert!(gizmo.begin_drag(GizmoHandle::Center, &down_at(0.0, 0.0), Transform::default(), &bounds));

        let moved = gizmo.update_drag(&down_at(2.0, -1.0)).unwrap();
        assert!((moved.position - Vector3::new(2.0, 0.0, -1.0)).magnitude() < 1e-4);
        assert!(gizmo.end_drag());
        assert!(!gizmo.is_dragging());
    }

    #[test]
    fn axis_drag_only_moves_along_axis() {
        let mut gizmo = attached();
        let bounds = unit_item();
        let view = |x: f32, y: f32| Ray::new(Vector3::new(x, y, 10.0), Vector3::new(0.0, 0.0, -1.0));

        assert!(gizmo.begin_drag(GizmoHandle::Axis(Axis::X), &view(0.5, 0.5), Transform::default(), &bounds));
        let moved = gizmo.update_drag(&view(3.5, 2.0)).unwrap();
        assert!((moved.position.x - 3.0).abs() < 1e-4);
        assert_eq!(moved.position.y, 0.0);
        assert_eq!(moved.position.z, 0.0);
    }

    #[test]
    fn rotate_spins_about_vertical_axis() {
        let mut gizmo = attached();
        gizmo.set_mode(TransformMode::Rotate);
        let bounds = unit_item();

        assert!(gizmo.begin_drag(GizmoHandle::Axis(Axis::X), &down_at(1.0, 0.0), Transform::default(), &bounds));
        // +X toward -Z is a positive turn about +Y
        let turned = gizmo.update_drag(&down_at(0.0, -1.0)).unwrap();
        assert!((turned.rotation.y - 90.0).abs() < 1e-3);
        assert_eq!(turned.rotation.x, 0.0);
        assert_eq!(turned.position, Vector3::zero());
    }

    #[test]
    fn scale_never_drops_below_minimum() {
        let mut gizmo = attached();
        gizmo.set_mode(TransformMode::Scale);
        let bounds = unit_item();
        let view = |x: f32| Ray::new(Vector3::new(x, 0.5, 10.0), Vector3::new(0.0, 0.0, -1.0));

        assert!(gizmo.begin_drag(GizmoHandle::Axis(Axis::X), &view(0.5), Transform::default(), &bounds));
        let squashed = gizmo.update_drag(&view(-20.0)).unwrap();
        assert_eq!(squashed.scale.x, MIN_SCALE);
        assert_eq!(squashed.scale.y, 1.0);
    }

    #[test]
    fn uniform_scale_follows_distance_from_center() {
        let mut gizmo = attached();
        gizmo.set_mode(TransformMode::Scale);
        let bounds = unit_item();

        // Grabbed dead center; the handle is 1 m long for this item
        assert!(gizmo.begin_drag(GizmoHandle::Center, &down_at(0.0, 0.0), Transform::default(), &bounds));
        let grown = gizmo.update_drag(&down_at(0.5, 0.0)).unwrap();
        assert!((grown.scale - Vector3::new(1.5, 1.5, 1.5)).magnitude() < 1e-4);

        let same = gizmo.update_drag(&down_at(0.0, 0.0)).unwrap();
        assert_eq!(same.scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn uniform_scale_has_no_jump_near_the_center() {
        let mut gizmo = attached();
        gizmo.set_mode(TransformMode::Scale);
        let bounds = unit_item();

        assert!(gizmo.begin_drag(GizmoHandle::Center, &down_at(0.05, 0.0), Transform::default(), &bounds));
        let nudged = gizmo.update_drag(&down_at(0.1, 0.0)).unwrap();
        assert!((nudged.scale.x - 1.05).abs() < 1e-4);
    }

    #[test]
    fn set_mode_does_not_touch_an_active_drag() {
        let mut gizmo = attached();
        let bounds = unit_item();
        assert!(gizmo.begin_drag(GizmoHandle::Center, &down_at(0.0, 0.0), Transform::default(), &bounds));
        gizmo.set_mode(TransformMode::Scale);
        let moved = gizmo.update_drag(&down_at(1.0, 0.0)).unwrap();
        assert_eq!(moved.scale, Vector3::new(1.0, 1.0, 1.0));
        assert!((moved.position.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn no_drag_without_attachment() {
        let mut gizmo = TransformGizmo::new();
        assert!(!gizmo.begin_drag(GizmoHandle::Center, &down_at(0.0, 0.0), Transform::default(), &unit_item()));
    }

    #[test]
    fn wraps_degrees() {
        assert_eq!(wrap_degrees(270.0), -90.0);
        assert_eq!(wrap_degrees(-90.0), -90.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
    }
}
