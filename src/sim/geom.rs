//! Pure geometry shared by movement, spawn validation, and the scan ray cast
//!
//! Footprint tests are 2D (ground plane); ray primitives are 3D so the scan
//! can hit the ground and clip against obstacle heights. Everything here is
//! stateless and deterministic.

use glam::{Vec2, Vec3};

const EPS: f32 = 1e-6;

/// Test a point against a yaw-rotated rectangle footprint.
///
/// The point is transformed into the rectangle's local frame (translate,
/// rotate by `-yaw`) and tested against the half extents grown by `inflate`.
/// Callers use `inflate` to account for an agent's collision radius.
pub fn point_in_rotated_rect(
    point: Vec2,
    center: Vec2,
    half_extent: Vec2,
    yaw: f32,
    inflate: f32,
) -> bool {
    let local = point - center;
    let (sin, cos) = (-yaw).sin_cos();
    let x = local.x * cos - local.y * sin;
    let z = local.x * sin + local.y * cos;
    x.abs() < half_extent.x + inflate && z.abs() < half_extent.y + inflate
}

/// Plane distance test against a circle footprint
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) < radius * radius
}

/// Ray vs the y=0 ground plane. Returns the ray parameter of the hit.
pub fn ray_ground(origin: Vec3, dir: Vec3) -> Option<f32> {
    if dir.y.abs() < EPS {
        return None;
    }
    let t = -origin.y / dir.y;
    (t > EPS).then_some(t)
}

/// Ray vs sphere; nearest positive root
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    for t in [-b - sqrt_disc, -b + sqrt_disc] {
        if t > EPS {
            return Some(t);
        }
    }
    None
}

/// Ray vs a vertical cylinder standing on the ground plane.
///
/// `center` is the axis position in the ground plane; hits outside
/// `0.0..=height` on the axis are rejected.
pub fn ray_vertical_cylinder(
    origin: Vec3,
    dir: Vec3,
    center: Vec2,
    radius: f32,
    height: f32,
) -> Option<f32> {
    let ox = origin.x - center.x;
    let oz = origin.z - center.y;
    let a = dir.x * dir.x + dir.z * dir.z;
    if a < EPS {
        return None; // Ray is vertical; poles are thin enough to ignore
    }
    let b = ox * dir.x + oz * dir.z;
    let c = ox * ox + oz * oz - radius * radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    for t in [(-b - sqrt_disc) / a, (-b + sqrt_disc) / a] {
        if t > EPS {
            let y = origin.y + dir.y * t;
            if (0.0..=height).contains(&y) {
                return Some(t);
            }
        }
    }
    None
}

/// Ray vs a yaw-rotated box standing on the ground plane.
///
/// Slab test in the box's local frame. `half_extent` is the ground-plane
/// footprint; the box spans `0.0..height` vertically. Rays starting inside
/// the box report no hit.
pub fn ray_rotated_box(
    origin: Vec3,
    dir: Vec3,
    center: Vec2,
    half_extent: Vec2,
    yaw: f32,
    height: f32,
) -> Option<f32> {
    let (sin, cos) = (-yaw).sin_cos();
    let rotate = |x: f32, z: f32| (x * cos - z * sin, x * sin + z * cos);

    let (ox, oz) = rotate(origin.x - center.x, origin.z - center.y);
    let (dx, dz) = rotate(dir.x, dir.z);

    let local_origin = [ox, origin.y - height / 2.0, oz];
    let local_dir = [dx, dir.y, dz];
    let half = [half_extent.x, height / 2.0, half_extent.y];

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        if local_dir[axis].abs() < EPS {
            if local_origin[axis].abs() > half[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / local_dir[axis];
        let t0 = (-half[axis] - local_origin[axis]) * inv;
        let t1 = (half[axis] - local_origin[axis]) * inv;
        let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        t_min = t_min.max(near);
        t_max = t_max.min(far);
        if t_min > t_max {
            return None;
        }
    }
    (t_min > EPS).then_some(t_min)
}
