//! Stateless vector and quaternion helpers shared by the solvers.
//!
//! Every helper works on stack-local temporaries; nothing here keeps
//! scratch state between calls.

use bevy::math::{Mat3, Quat, Ray3d, Vec3};
use bevy::prelude::Transform;

use crate::axis::{Axis, AxisConstraint};

/// Tolerance below which a vector or denominator counts as zero.
pub const EPSILON: f32 = 1e-6;

/// Intersects `ray` with the infinite plane through `plane_origin` with
/// `plane_normal`. Both faces are hit, but only in front of the ray origin.
///
/// Returns `None` when the ray is parallel to the plane or the plane lies
/// behind the ray.
pub fn intersect_ray_plane(ray: &Ray3d, plane_origin: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let normal = plane_normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return None;
    }
    let denom = normal.dot(*ray.direction);
    if denom.abs() < EPSILON {
        return None;
    }
    let distance = (plane_origin - ray.origin).dot(normal) / denom;
    if !distance.is_finite() || distance < 0.0 {
        return None;
    }
    Some(ray.get_point(distance))
}

/// Rotation whose local -Z looks from `eye` toward `target` with `up` as the
/// vertical reference (the right-handed look-at used by cameras).
///
/// A collapsed forward falls back to +Z, and an `up` parallel to the forward
/// is nudged so the basis never degenerates.
pub fn look_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
    let mut z = eye - target;
    if z.length_squared() < EPSILON * EPSILON {
        z = Vec3::Z;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() < EPSILON * EPSILON {
        if (up.z.abs() - 1.0).abs() < EPSILON {
            z.x += 1e-4;
        } else {
            z.z += 1e-4;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = x.normalize_or_zero();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Right-handed basis of a space: world axes rotated by `rotation`.
pub fn basis(rotation: Quat) -> [Vec3; 3] {
    [rotation * Vec3::X, rotation * Vec3::Y, rotation * Vec3::Z]
}

/// Rounds `value` to the nearest multiple of `increment`.
///
/// A non-positive or non-finite increment leaves the value untouched.
pub fn snap_to_increment(value: f32, increment: f32) -> f32 {
    if !(increment.is_finite() && increment > 0.0) {
        return value;
    }
    (value / increment).round() * increment
}

/// Snaps the components of `v` named by `axis`, leaving the others as is.
pub fn snap_components(v: Vec3, increment: f32, axis: AxisConstraint) -> Vec3 {
    let mut out = v;
    for a in Axis::ALL {
        if axis.contains(a) {
            out[a.index()] = snap_to_increment(v[a.index()], increment);
        }
    }
    out
}

/// Composes a parent world pose with a child local pose.
pub fn compose(parent: &Transform, local: &Transform) -> Transform {
    parent.mul_transform(*local)
}

/// Component-wise division that keeps the numerator where the divisor is zero.
pub fn safe_divide(v: Vec3, divisor: Vec3) -> Vec3 {
    Vec3::new(
        if divisor.x.abs() > EPSILON { v.x / divisor.x } else { v.x },
        if divisor.y.abs() > EPSILON { v.y / divisor.y } else { v.y },
        if divisor.z.abs() > EPSILON { v.z / divisor.z } else { v.z },
    )
}

/// Unsigned angle between two vectors, zero if either is degenerate.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Distance from a ray to a point, with the ray parameter of the closest
/// approach (never behind the origin).
pub fn ray_point_distance(ray: &Ray3d, point: Vec3) -> (f32, f32) {
    let t = (point - ray.origin).dot(*ray.direction).max(0.0);
    (ray.get_point(t).distance(point), t)
}

/// Distance from a ray to the segment `start..end`, with the ray parameter of
/// the closest approach.
pub fn ray_segment_distance(ray: &Ray3d, start: Vec3, end: Vec3) -> (f32, f32) {
    let d = *ray.direction;
    let e = end - start;
    let c = e.length_squared();
    if c < EPSILON * EPSILON {
        return ray_point_distance(ray, start);
    }
    let w0 = ray.origin - start;
    let b = d.dot(e);
    let dd = d.dot(w0);
    let ee = e.dot(w0);
    let denom = c - b * b;

    let u = if denom.abs() < EPSILON {
        0.0
    } else {
        ((ee - b * dd) / denom).clamp(0.0, 1.0)
    };
    let t = (start + e * u - ray.origin).dot(d).max(0.0);
    let u = ((ray.get_point(t) - start).dot(e) / c).clamp(0.0, 1.0);
    (ray.get_point(t).distance(start + e * u), t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Dir3;
    use std::f32::consts::FRAC_PI_2;

    fn ray(origin: Vec3, direction: Vec3) -> Ray3d {
        Ray3d::new(origin, Dir3::new(direction).unwrap())
    }

    #[test]
    fn test_intersect_ray_plane_hit() {
        let hit = intersect_ray_plane(&ray(Vec3::new(1.0, 2.0, 10.0), Vec3::NEG_Z), Vec3::ZERO, Vec3::Z)
            .unwrap();
        assert!((hit - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_intersect_ray_plane_back_face() {
        // Normal facing away from the ray still intersects.
        let hit = intersect_ray_plane(&ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z), Vec3::ZERO, Vec3::NEG_Z);
        assert!(hit.is_some());
    }

    #[test]
    fn test_intersect_ray_plane_parallel_and_behind() {
        let parallel = intersect_ray_plane(&ray(Vec3::new(0.0, 0.0, 5.0), Vec3::X), Vec3::ZERO, Vec3::Z);
        assert!(parallel.is_none());

        let behind = intersect_ray_plane(&ray(Vec3::new(0.0, 0.0, 5.0), Vec3::Z), Vec3::ZERO, Vec3::Z);
        assert!(behind.is_none());
    }

    #[test]
    fn test_look_rotation_points_negative_z_at_target() {
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let q = look_rotation(eye, Vec3::ZERO, Vec3::Y);
        let forward = q * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);

        let eye = Vec3::new(10.0, 0.0, 0.0);
        let q = look_rotation(eye, Vec3::ZERO, Vec3::Y);
        assert!((q * Vec3::NEG_Z - Vec3::NEG_X).length() < 1e-5);
        assert!((q * Vec3::Y - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_look_rotation_parallel_up_does_not_degenerate() {
        let q = look_rotation(Vec3::ZERO, Vec3::Y, Vec3::Y);
        assert!(q.is_finite());
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_snap_to_increment() {
        assert!((snap_to_increment(0.37, 0.5) - 0.5).abs() < 1e-6);
        assert!((snap_to_increment(0.2, 0.5)).abs() < 1e-6);
        assert!((snap_to_increment(-0.8, 0.5) + 1.0).abs() < 1e-6);
        assert!((snap_to_increment(0.37, 0.0) - 0.37).abs() < 1e-6);
    }

    #[test]
    fn test_snap_components_only_active_axes() {
        let v = snap_components(Vec3::new(0.37, 0.37, 0.37), 0.5, AxisConstraint::XZ);
        assert!((v.x - 0.5).abs() < 1e-6);
        assert!((v.y - 0.37).abs() < 1e-6);
        assert!((v.z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_compose_parent_and_local() {
        let parent = Transform {
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_z(FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let local = Transform::from_translation(Vec3::X);
        let world = compose(&parent, &local);
        assert!((world.translation - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
        assert!((world.scale - Vec3::splat(2.0)).length() < 1e-5);
    }

    #[test]
    fn test_angle_between() {
        assert!((angle_between(Vec3::X, Vec3::Y) - FRAC_PI_2).abs() < 1e-5);
        assert!(angle_between(Vec3::ZERO, Vec3::Y).abs() < 1e-6);
    }

    #[test]
    fn test_ray_segment_distance() {
        let r = ray(Vec3::new(0.5, 1.0, 10.0), Vec3::NEG_Z);
        let (distance, t) = ray_segment_distance(&r, Vec3::ZERO, Vec3::X);
        assert!((distance - 1.0).abs() < 1e-5);
        assert!((t - 10.0).abs() < 1e-4);

        // Past the segment end the distance is to the endpoint.
        let r = ray(Vec3::new(3.0, 0.0, 10.0), Vec3::NEG_Z);
        let (distance, _) = ray_segment_distance(&r, Vec3::ZERO, Vec3::X);
        assert!((distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_point_distance_ignores_points_behind() {
        let r = ray(Vec3::ZERO, Vec3::X);
        let (distance, t) = ray_point_distance(&r, Vec3::new(-2.0, 1.0, 0.0));
        assert!(t.abs() < 1e-6);
        assert!((distance - 5.0_f32.sqrt()).abs() < 1e-5);
    }
}
