//! Room bounds and the room shell geometry.
//!
//! The room is centered on the origin in X and Z with its floor at `y = 0`.

use cgmath::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use super::item::Transform;
use crate::{
    color::Color,
    gfx::{
        geometry::{generate_box, generate_plane, GeometryData},
        picking::AABB,
    },
};

const WALL_THICKNESS: f32 = 0.1;
/// Upper bound on floor grid cells per side
const MAX_FLOOR_DIVISIONS: u32 = 64;

/// Room dimensions in meters plus the colors the shell is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Room {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub floor_color: Color,
    pub wall_color: Color,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 3.0,
            depth: 16.0,
            floor_color: Color::rgb(0xF5, 0xF5, 0xF5),
            wall_color: Color::rgb(0xCC, 0xCC, 0xCC),
        }
    }
}

impl Room {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
            ..Self::default()
        }
    }

    /// Interior volume as a box
    pub fn bounds(&self) -> AABB {
        AABB::new(
            Vector3::new(-self.width * 0.5, 0.0, -self.depth * 0.5),
            Vector3::new(self.width * 0.5, self.height, self.depth * 0.5),
        )
    }

    pub fn floor_area(&self) -> f32 {
        self.width * self.depth
    }

    /// Interior size as `(width, height, depth)`
    pub fn size(&self) -> Vector3<f32> {
        Vector3::new(self.width, self.height, self.depth)
    }

    /// Scale that keeps an item with `local_bounds` no larger than the room
    /// under `transform`'s rotation.
    ///
    /// Goes from `fitting`, a scale known to fit, toward `transform.scale` as
    /// far as the room allows. World extents are linear in the scale factors,
    /// so the limit is exact. If `fitting` overflows too, `transform.scale` is
    /// shrunk uniformly instead.
    pub fn fit_scale(
        &self,
        local_bounds: &AABB,
        transform: &Transform,
        fitting: Vector3<f32>,
    ) -> Vector3<f32> {
        let room = self.size();
        let rotation = transform.rotation_matrix();
        let extent = |s: Vector3<f32>| {
            local_bounds
                .transform(&(rotation * Matrix4::from_nonuniform_scale(s.x, s.y, s.z)))
                .size()
        };
        let overflows = |e: Vector3<f32>| (0..3).any(|i| e[i] > room[i]);

        let scale = transform.scale;
        let target = extent(scale);
        if !overflows(target) {
            return scale;
        }

        let start = extent(fitting);
        if !overflows(start) {
            let t = (0..3)
                .filter(|&i| target[i] > room[i])
                .map(|i| (room[i] - start[i]) / (target[i] - start[i]))
                .fold(1.0_f32, f32::min)
                .clamp(0.0, 1.0);
            return fitting + (scale - fitting) * t;
        }

        let shrink = (0..3)
            .filter(|&i| target[i] > room[i])
            .map(|i| room[i] / target[i])
            .fold(1.0_f32, f32::min);
        scale * shrink
    }

    /// Clamps an item position so that an item with world bounds `item_bounds`
    /// stays inside the room.
    ///
    /// Horizontal axes keep the position within `±(size/2 - half_extent)`;
    /// the vertical axis keeps it within `[0, height - extent_y]`. When the
    /// item is larger than the room on an axis, the position collapses to the
    /// room center (horizontal) or the floor (vertical).
    pub fn clamp_position(&self, position: Vector3<f32>, item_bounds: &AABB) -> Vector3<f32> {
        let half = item_bounds.half_extents();
        let extent_y = item_bounds.size().y;

        let clamp_centered = |value: f32, room_size: f32, half_extent: f32| {
            let limit = room_size * 0.5 - half_extent;
            if limit <= 0.0 {
                0.0
            } else {
                value.clamp(-limit, limit)
            }
        };

        let max_y = (self.height - extent_y).max(0.0);

        Vector3::new(
            clamp_centered(position.x, self.width, half.x),
            position.y.clamp(0.0, max_y),
            clamp_centered(position.z, self.depth, half.z),
        )
    }

    /// Floor plane, sized to the room, about one grid cell per meter
    pub fn floor_geometry(&self) -> GeometryData {
        let divisions = |size: f32| (size.ceil().max(1.0) as u32).min(MAX_FLOOR_DIVISIONS);
        generate_plane(
            self.width,
            self.depth,
            divisions(self.width),
            divisions(self.depth),
        )
    }

    /// Back and side walls, leaving the front open toward the camera
    pub fn wall_geometry(&self) -> GeometryData {
        let (w, h, d) = (self.width, self.height, self.depth);
        let t = WALL_THICKNESS;

        let mut walls = generate_box(w + 2.0 * t, h, t).translated([0.0, h * 0.5, -d * 0.5 - t * 0.5]);
        walls.append(&generate_box(t, h, d).translated([-w * 0.5 - t * 0.5, h * 0.5, 0.0]));
        walls.append(&generate_box(t, h, d).translated([w * 0.5 + t * 0.5, h * 0.5, 0.0]));
        walls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint(width: f32, height: f32, depth: f32) -> AABB {
        AABB::new(
            Vector3::new(-width * 0.5, 0.0, -depth * 0.5),
            Vector3::new(width * 0.5, height, depth * 0.5),
        )
    }

    #[test]
    fn clamps_horizontally_by_half_extent() {
        let room = Room::new(30.0, 3.0, 20.0);
        let clamped = room.clamp_position(Vector3::new(20.0, 0.0, -50.0), &footprint(4.0, 1.0, 2.0));
        assert_eq!(clamped, Vector3::new(13.0, 0.0, -9.0));
    }

    #[test]
    fn clamps_vertically_by_full_extent() {
        let room = Room::new(10.0, 3.0, 10.0);
        let item = footprint(1.0, 1.0, 1.0);
        assert_eq!(room.clamp_position(Vector3::new(0.0, 5.0, 0.0), &item).y, 2.0);
        assert_eq!(room.clamp_position(Vector3::new(0.0, -1.0, 0.0), &item).y, 0.0);
    }

    #[test]
    fn oversized_item_collapses_to_center() {
        let room = Room::new(4.0, 2.0, 4.0);
        let clamped = room.clamp_position(Vector3::new(1.0, 1.0, -1.0), &footprint(6.0, 3.0, 6.0));
        assert_eq!(clamped, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn fit_scale_stops_where_the_room_ends() {
        let room = Room::new(6.0, 3.0, 6.0);
        let local = footprint(0.6, 1.0, 0.6);
        let mut transform = Transform::default();
        transform.scale = Vector3::new(40.0, 1.0, 1.0);

        let scale = room.fit_scale(&local, &transform, Vector3::new(1.0, 1.0, 1.0));
        assert!((scale.x - 10.0).abs() < 1e-4);
        assert_eq!(scale.y, 1.0);
        assert_eq!(scale.z, 1.0);
    }

    #[test]
    fn fit_scale_respects_rotation() {
        let room = Room::new(6.0, 3.0, 4.0);
        let local = footprint(1.0, 1.0, 1.0);
        let mut transform = Transform::default();
        transform.rotation.y = 90.0;
        transform.scale = Vector3::new(10.0, 1.0, 1.0);

        // Turned a quarter, local x runs along the room depth
        let scale = room.fit_scale(&local, &transform, Vector3::new(1.0, 1.0, 1.0));
        assert!((scale.x - 4.0).abs() < 1e-3);
    }

    #[test]
    fn fit_scale_shrinks_uniformly_without_a_fitting_start() {
        let room = Room::new(4.0, 2.0, 4.0);
        let local = footprint(8.0, 1.0, 2.0);
        let scale = room.fit_scale(&local, &Transform::default(), Vector3::new(1.0, 1.0, 1.0));
        assert!((scale.x - 0.5).abs() < 1e-5);
        assert!((scale.z - 0.5).abs() < 1e-5);
    }

    #[test]
    fn floor_grid_is_capped_for_huge_rooms() {
        let floor = Room::new(1.0e6, 3.0, 1.0e6).floor_geometry();
        let side = MAX_FLOOR_DIVISIONS as usize + 1;
        assert_eq!(floor.vertices.len(), side * side);
    }

    #[test]
    fn inside_position_is_untouched() {
        let room = Room::default();
        let p = Vector3::new(1.5, 0.25, -2.0);
        assert_eq!(room.clamp_position(p, &footprint(1.0, 1.0, 1.0)), p);
    }
}
