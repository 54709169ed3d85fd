//! # Item Picking System
//!
//! Mouse ray-casting against placed furniture.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: convert the cursor position to a world-space [`Ray`]
//! 2. **Broad phase**: test the ray against each item's world-space [`AABB`]
//! 3. **Narrow phase**: test the triangles of the items whose box was hit
//! 4. **Selection**: return the closest hit; the hit always names the
//!    top-level item, never one of its sub-meshes
//!
//! ```rust
//! use cgmath::Vector3;
//! use furnish::gfx::picking::{ItemPicker, Ray};
//!
//! let ray = Ray::new(Vector3::new(0.0, 1.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
//! assert!(ItemPicker::new().pick(&ray, &[]).is_none());
//! ```

use cgmath::{
    ElementWise, EuclideanSpace, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero,
};

use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    scene::item::{ItemId, PlacedItem},
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Distance to the plane through `point` with normal `normal`, if the ray
    /// hits it in front of the origin
    pub fn intersect_plane(&self, point: Vector3<f32>, normal: Vector3<f32>) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Möller-Trumbore ray/triangle test, two-sided
    pub fn intersect_triangle(
        &self,
        a: Vector3<f32>,
        b: Vector3<f32>,
        c: Vector3<f32>,
    ) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > EPSILON).then_some(t)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box around a point cloud; an empty cloud gives a degenerate box at the origin
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vector3<f32>>,
    {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        points.fold(Self::new(first, first), |mut aabb, p| {
            aabb.min.x = aabb.min.x.min(p.x);
            aabb.min.y = aabb.min.y.min(p.y);
            aabb.min.z = aabb.min.z.min(p.z);
            aabb.max.x = aabb.max.x.max(p.x);
            aabb.max.y = aabb.max.y.max(p.y);
            aabb.max.z = aabb.max.z.max(p.z);
            aabb
        })
    }

    /// Box around raw vertex positions
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        Self::from_points(vertices.iter().map(|v| Vector3::new(v[0], v[1], v[2])))
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn half_extents(&self) -> Vector3<f32> {
        self.size() * 0.5
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Containment with a small tolerance for float round-off
    pub fn contains(&self, other: &AABB) -> bool {
        const TOLERANCE: f32 = 1e-4;
        other.min.x >= self.min.x - TOLERANCE
            && other.min.y >= self.min.y - TOLERANCE
            && other.min.z >= self.min.z - TOLERANCE
            && other.max.x <= self.max.x + TOLERANCE
            && other.max.y <= self.max.y + TOLERANCE
            && other.max.z <= self.max.z + TOLERANCE
    }

    /// Slab test; distance to the entry point, or the exit point if the
    /// origin is inside the box
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Box around the 8 transformed corners
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        Self::from_points(corners.iter().map(|c| transform_point(matrix, *c)))
    }
}

pub(crate) fn transform_point(matrix: &Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
    let h = matrix * Vector4::new(p.x, p.y, p.z, 1.0);
    Vector3::new(h.x / h.w, h.y / h.w, h.z / h.w)
}

/// Result of a picking operation
#[derive(Debug, Clone, Copy)]
pub struct PickResult {
    /// The top-level item that was hit
    pub item: ItemId,
    /// Distance from the ray origin to the hit
    pub distance: f32,
    /// World-space hit point
    pub point: Vector3<f32>,
}

/// Ray picker for placed items
#[derive(Debug, Default)]
pub struct ItemPicker;

impl ItemPicker {
    pub fn new() -> Self {
        Self
    }

    /// Convert window coordinates to a world-space ray through the camera
    pub fn screen_to_ray(
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &OrbitCamera,
    ) -> Ray {
        let (mouse_x, mouse_y) = screen_pos;
        let (screen_width, screen_height) = screen_size;

        // Normalized device coordinates, Y flipped
        let ndc_x = (2.0 * mouse_x) / screen_width.max(1.0) - 1.0;
        let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height.max(1.0);

        let eye = cgmath::Point3::from_vec(camera.eye);
        let target = cgmath::Point3::from_vec(camera.target);
        let view_matrix = Matrix4::look_at_rh(eye, target, camera.up);
        let proj_matrix = cgmath::perspective(camera.fovy, camera.aspect, camera.znear, camera.zfar);

        let inv_view_proj = (proj_matrix * view_matrix)
            .invert()
            .unwrap_or(Matrix4::identity());

        let near = transform_point(&inv_view_proj, Vector3::new(ndc_x, ndc_y, -1.0));
        let far = transform_point(&inv_view_proj, Vector3::new(ndc_x, ndc_y, 1.0));

        Ray::new(near, far - near)
    }

    /// Nearest item hit by the ray, if any
    pub fn pick(&self, ray: &Ray, items: &[PlacedItem]) -> Option<PickResult> {
        let mut closest: Option<PickResult> = None;

        for item in items {
            let matrix = item.transform.matrix();
            let world_bounds = item.model.local_bounds().transform(&matrix);

            let Some(box_distance) = world_bounds.intersect_ray(ray) else {
                continue;
            };
            // A triangle can never be closer than the box entry point
            if closest.is_some_and(|hit| box_distance > hit.distance) {
                continue;
            }

            if let Some(distance) = Self::closest_triangle_hit(ray, item, &matrix) {
                if closest.map_or(true, |hit| distance < hit.distance) {
                    closest = Some(PickResult {
                        item: item.id,
                        distance,
                        point: ray.point_at(distance),
                    });
                }
            }
        }

        closest
    }

    fn closest_triangle_hit(ray: &Ray, item: &PlacedItem, matrix: &Matrix4<f32>) -> Option<f32> {
        let mut nearest: Option<f32> = None;

        for mesh in item.model.meshes() {
            let world: Vec<Vector3<f32>> = mesh
                .vertices()
                .iter()
                .map(|v| {
                    transform_point(
                        matrix,
                        Vector3::new(v.position[0], v.position[1], v.position[2]),
                    )
                })
                .collect();

            for triangle in mesh.indices().chunks_exact(3) {
                let (a, b, c) = (
                    world[triangle[0] as usize],
                    world[triangle[1] as usize],
                    world[triangle[2] as usize],
                );
                if let Some(t) = ray.intersect_triangle(a, b, c) {
                    nearest = Some(nearest.map_or(t, |n: f32| n.min(t)));
                }
            }
        }

        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::gfx::{
        geometry::generate_box,
        scene::{
            item::{ItemId, Transform},
            model::Model,
        },
    };
    use crate::furniture::FurnitureKind;

    fn crate_at(id: u64, x: f32, z: f32) -> PlacedItem {
        let model = Model::from_geometry(&generate_box(1.0, 1.0, 1.0).translated([0.0, 0.5, 0.0]));
        let mut item = PlacedItem::new(
            ItemId(id),
            FurnitureKind::Table,
            format!("Box {id}"),
            model,
            Color::WHITE,
        );
        item.transform = Transform::at(Vector3::new(x, 0.0, z));
        item
    }

    #[test]
    fn test_aabb_creation() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [-1.0, -1.0, -1.0]];
        let aabb = AABB::from_vertices(&vertices);

        assert_eq!(aabb.min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(aabb.max, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.half_extents(), Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());

        let ray_behind = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_behind).is_none());
    }

    #[test]
    fn test_ray_triangle_intersection() {
        let ray = Ray::new(Vector3::new(0.2, 0.2, 3.0), Vector3::new(0.0, 0.0, -1.0));
        let (a, b, c) = (
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        assert!((ray.intersect_triangle(a, b, c).unwrap() - 3.0).abs() < 1e-5);
        // two-sided
        assert!(ray.intersect_triangle(a, c, b).is_some());

        let outside = Ray::new(Vector3::new(0.9, 0.9, 3.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(outside.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn test_rotated_aabb_grows() {
        let aabb = AABB::new(Vector3::new(-2.0, 0.0, -0.5), Vector3::new(2.0, 1.0, 0.5));
        let rotated = aabb.transform(&Matrix4::from_angle_y(cgmath::Deg(90.0)));
        assert!((rotated.size().x - 1.0).abs() < 1e-5);
        assert!((rotated.size().z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_empty_scene() {
        let ray = Ray::new(Vector3::new(0.0, 0.5, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ItemPicker::new().pick(&ray, &[]).is_none());
    }

    #[test]
    fn test_pick_nearest_item() {
        let items = vec![crate_at(1, 0.0, -3.0), crate_at(2, 0.0, 0.0), crate_at(3, 4.0, 0.0)];
        let ray = Ray::new(Vector3::new(0.0, 0.5, 10.0), Vector3::new(0.0, 0.0, -1.0));

        let hit = ItemPicker::new().pick(&ray, &items).unwrap();
        assert_eq!(hit.item, ItemId(2));
        assert!((hit.distance - 9.5).abs() < 1e-4);
        assert!((hit.point.z - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_pick_miss() {
        let items = vec![crate_at(1, 0.0, 0.0)];
        let ray = Ray::new(Vector3::new(3.0, 0.5, 10.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ItemPicker::new().pick(&ray, &items).is_none());
    }

    #[test]
    fn test_screen_center_ray_points_at_target() {
        let camera = OrbitCamera::new(10.0, 0.3, 0.0, Vector3::zero(), 1.5);
        let ray = ItemPicker::screen_to_ray((400.0, 300.0), (800.0, 600.0), &camera);
        let to_target = (camera.target - ray.origin).normalize();
        assert!(ray.direction.dot(to_target) > 0.999);
    }
}
