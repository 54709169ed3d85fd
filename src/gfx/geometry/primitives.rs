//! # Primitive Shape Generation
//!
//! Boxes, cylinders and planes with outward normals, all Y-up.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate an axis-aligned box centered at the origin
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `depth` - Extent along Z
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
    let mut data = GeometryData::new();

    // (normal, four corners counter-clockwise seen from outside)
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]]),
        ([0.0, 0.0, -1.0], [[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]]),
        ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]]),
        ([1.0, 0.0, 0.0],  [[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]]),
        ([0.0, 1.0, 0.0],  [[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]]),
        ([0.0, -1.0, 0.0], [[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]]),
    ];

    for (normal, corners) in faces {
        let base = data.vertices.len() as u32;
        for corner in corners {
            data.vertices.push(corner);
            data.normals.push(normal);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a unit cube centered at the origin
pub fn generate_cube() -> GeometryData {
    generate_box(1.0, 1.0, 1.0)
}

/// Generate a capped cylinder standing on the Y axis
///
/// # Arguments
/// * `radius` - Radius of the cylinder
/// * `height` - Height along Y, centered at the origin
/// * `segments` - Number of circular segments (at least 3)
pub fn generate_cylinder(radius: f32, height: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = height * 0.5;

    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        let x = radius * cos_a;
        let z = radius * sin_a;

        data.vertices.push([x, -half_height, z]);
        data.normals.push([cos_a, 0.0, sin_a]);

        data.vertices.push([x, half_height, z]);
        data.normals.push([cos_a, 0.0, sin_a]);
    }

    for i in 0..segs {
        let bottom_current = i * 2;
        let top_current = bottom_current + 1;
        let bottom_next = (i + 1) * 2;
        let top_next = bottom_next + 1;

        data.indices
            .extend_from_slice(&[bottom_current, top_current, bottom_next]);
        data.indices
            .extend_from_slice(&[top_current, top_next, bottom_next]);
    }

    // Caps get their own ring so their normals stay flat
    for (y, normal_y) in [(-half_height, -1.0f32), (half_height, 1.0f32)] {
        let center = data.vertices.len() as u32;
        data.vertices.push([0.0, y, 0.0]);
        data.normals.push([0.0, normal_y, 0.0]);

        let ring = data.vertices.len() as u32;
        for i in 0..segs {
            let angle = i as f32 * 2.0 * PI / segs as f32;
            let (sin_a, cos_a) = angle.sin_cos();
            data.vertices.push([radius * cos_a, y, radius * sin_a]);
            data.normals.push([0.0, normal_y, 0.0]);
        }

        for i in 0..segs {
            let current = ring + i;
            let next = ring + (i + 1) % segs;
            if normal_y > 0.0 {
                data.indices.extend_from_slice(&[center, next, current]);
            } else {
                data.indices.extend_from_slice(&[center, current, next]);
            }
        }
    }

    data
}

/// Generate a plane in XZ facing +Y
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `width_segments` - Subdivisions along X
/// * `depth_segments` - Subdivisions along Z
pub fn generate_plane(
    width: f32,
    depth: f32,
    width_segments: u32,
    depth_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for row in 0..=d_segs {
        let v = row as f32 / d_segs as f32;
        for col in 0..=w_segs {
            let u = col as f32 / w_segs as f32;
            data.vertices
                .push([(u - 0.5) * width, 0.0, (v - 0.5) * depth]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
    }

    for row in 0..d_segs {
        for col in 0..w_segs {
            let a = row * (w_segs + 1) + col;
            let b = a + 1;
            let c = a + w_segs + 1;
            let d = c + 1;
            data.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(data: &GeometryData, axis: usize) -> (f32, f32) {
        data.vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v[axis]), hi.max(v[axis]))
        })
    }

    #[test]
    fn test_box_generation() {
        let cube = generate_box(4.0, 1.0, 2.0);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(extent(&cube, 0), (-2.0, 2.0));
        assert_eq!(extent(&cube, 1), (-0.5, 0.5));
        assert_eq!(extent(&cube, 2), (-1.0, 1.0));
    }

    #[test]
    fn test_cylinder_is_y_up() {
        let cylinder = generate_cylinder(0.5, 2.0, 8);
        assert_eq!(cylinder.vertices.len(), cylinder.normals.len());
        assert_eq!(extent(&cylinder, 1), (-1.0, 1.0));
        // 8 side quads + two 8-triangle caps
        assert_eq!(cylinder.triangle_count(), 16 + 16);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9);
        assert_eq!(plane.indices.len(), 24);
        assert!(plane.vertices.iter().all(|v| v[1] == 0.0));
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut merged = generate_cube();
        merged.append(&generate_cube().translated([2.0, 0.0, 0.0]));
        assert_eq!(merged.vertex_count(), 48);
        assert_eq!(*merged.indices.iter().max().unwrap(), 47);
        assert_eq!(extent(&merged, 0), (-0.5, 2.5));
    }
}
