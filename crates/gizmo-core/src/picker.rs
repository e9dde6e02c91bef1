//! Analytic handle picking.
//!
//! The visual gizmo lives in the renderer; for hover and press the controls
//! only need to know which handle a pointer ray is over. Handles are
//! described analytically in units of the camera-dependent handle scale:
//!
//! - translate / scale: axis segments, plane squares (translate only) and a
//!   center region
//! - rotate: one ring per axis, a screen ring and the trackball sphere

use bevy::math::{Quat, Ray3d, Vec3};

use crate::axis::{AxisConstraint, SpaceMode, TransformMode, effective_space};
use crate::config::ControlsConfig;
use crate::geometry::{basis, intersect_ray_plane, ray_point_distance, ray_segment_distance};

// Handle geometry, in handle units (multiplied by the handle scale).
pub const AXIS_LENGTH: f32 = 1.0;
pub const AXIS_TOLERANCE: f32 = 0.1;
pub const CENTER_RADIUS: f32 = 0.2;
pub const PLANE_MIN: f32 = 0.1;
pub const PLANE_MAX: f32 = 0.4;
pub const RING_RADIUS: f32 = 0.5;
pub const SCREEN_RING_RADIUS: f32 = 0.75;
pub const RING_TOLERANCE: f32 = 0.1;
pub const TRACKBALL_RADIUS: f32 = 0.5;

/// Where the gizmo sits and how large it is on screen.
#[derive(Debug, Clone, Copy)]
pub struct PickContext {
    pub origin: Vec3,
    pub object_rotation: Quat,
    /// Unit vector from the gizmo toward the viewer.
    pub eye: Vec3,
    /// World units per handle unit.
    pub handle_scale: f32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    axis: AxisConstraint,
    distance: f32,
}

/// Whether the handle for `axis` is shown with the current visibility flags.
pub fn is_visible(axis: AxisConstraint, config: &ControlsConfig) -> bool {
    let label = axis.label();
    (!label.contains('X') || config.show_x)
        && (!label.contains('Y') || config.show_y)
        && (!label.contains('Z') || config.show_z)
}

/// Returns the handle under `ray`, nearest along the ray first.
///
/// In rotate mode the trackball is only picked when no ring is.
pub fn pick(ray: &Ray3d, ctx: &PickContext, config: &ControlsConfig) -> Option<AxisConstraint> {
    let scale = ctx.handle_scale;
    if !(scale.is_finite() && scale > 0.0) {
        return None;
    }
    let space = effective_space(config.mode, None, config.space);
    let [x, y, z] = basis(match space {
        SpaceMode::Local => ctx.object_rotation,
        SpaceMode::World => Quat::IDENTITY,
    });
    let axes = [(AxisConstraint::X, x), (AxisConstraint::Y, y), (AxisConstraint::Z, z)];

    let mut candidates = Vec::new();
    let mut fallback = None;

    match config.mode {
        TransformMode::Translate | TransformMode::Scale => {
            // The center handle overlaps every axis near the origin and wins.
            let (center, _) = ray_point_distance(ray, ctx.origin);
            if center < CENTER_RADIUS * scale && is_visible(AxisConstraint::XYZ, config) {
                return Some(AxisConstraint::XYZ);
            }
            for (axis, dir) in axes {
                let end = ctx.origin + dir * AXIS_LENGTH * scale;
                let (distance, t) = ray_segment_distance(ray, ctx.origin, end);
                if distance < AXIS_TOLERANCE * scale {
                    candidates.push(Candidate { axis, distance: t });
                }
            }
            if config.mode == TransformMode::Translate {
                let planes = [
                    (AxisConstraint::XY, x, y, z),
                    (AxisConstraint::YZ, y, z, x),
                    (AxisConstraint::XZ, x, z, y),
                ];
                for (axis, u, v, normal) in planes {
                    let Some(hit) = intersect_ray_plane(ray, ctx.origin, normal) else {
                        continue;
                    };
                    let local = hit - ctx.origin;
                    let (a, b) = (local.dot(u) / scale, local.dot(v) / scale);
                    if (PLANE_MIN..=PLANE_MAX).contains(&a) && (PLANE_MIN..=PLANE_MAX).contains(&b) {
                        candidates.push(Candidate {
                            axis,
                            distance: hit.distance(ray.origin),
                        });
                    }
                }
            }
        }
        TransformMode::Rotate => {
            let rings = axes
                .into_iter()
                .map(|(axis, normal)| (axis, normal, RING_RADIUS))
                .chain(std::iter::once((AxisConstraint::E, ctx.eye, SCREEN_RING_RADIUS)));
            for (axis, normal, radius) in rings {
                let Some(hit) = intersect_ray_plane(ray, ctx.origin, normal) else {
                    continue;
                };
                let from_center = hit.distance(ctx.origin) / scale;
                if (from_center - radius).abs() < RING_TOLERANCE {
                    candidates.push(Candidate {
                        axis,
                        distance: hit.distance(ray.origin),
                    });
                }
            }
            let (center, _) = ray_point_distance(ray, ctx.origin);
            if center < TRACKBALL_RADIUS * scale {
                fallback = Some(AxisConstraint::XYZE);
            }
        }
    }

    candidates
        .into_iter()
        .filter(|c| is_visible(c.axis, config))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
        .map(|c| c.axis)
        .or(fallback.filter(|axis| is_visible(*axis, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraProjection, ViewCamera, Viewport};
    use bevy::math::Vec2;

    fn camera() -> ViewCamera {
        ViewCamera::looking_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            CameraProjection::default(),
            Viewport::new(800.0, 800.0),
        )
    }

    fn context() -> PickContext {
        PickContext {
            origin: Vec3::ZERO,
            object_rotation: Quat::IDENTITY,
            eye: Vec3::Z,
            handle_scale: 1.0,
        }
    }

    /// Ray from the camera through a world point.
    fn ray_to(point: Vec3) -> Ray3d {
        let cam = camera();
        Ray3d::new(cam.position, bevy::math::Dir3::new(point - cam.position).unwrap())
    }

    fn config(mode: TransformMode) -> ControlsConfig {
        ControlsConfig {
            mode,
            ..ControlsConfig::default()
        }
    }

    #[test]
    fn test_translate_handles() {
        let cfg = config(TransformMode::Translate);
        assert_eq!(pick(&ray_to(Vec3::ZERO), &context(), &cfg), Some(AxisConstraint::XYZ));
        assert_eq!(pick(&ray_to(Vec3::new(0.8, 0.0, 0.0)), &context(), &cfg), Some(AxisConstraint::X));
        assert_eq!(pick(&ray_to(Vec3::new(0.0, 0.7, 0.0)), &context(), &cfg), Some(AxisConstraint::Y));
        assert_eq!(pick(&ray_to(Vec3::new(0.3, 0.3, 0.0)), &context(), &cfg), Some(AxisConstraint::XY));
        assert_eq!(pick(&ray_to(Vec3::new(3.0, 3.0, 0.0)), &context(), &cfg), None);
    }

    #[test]
    fn test_hidden_axis_is_not_picked() {
        let mut cfg = config(TransformMode::Translate);
        cfg.show_x = false;
        assert_eq!(pick(&ray_to(Vec3::new(0.8, 0.0, 0.0)), &context(), &cfg), None);
        assert!(!is_visible(AxisConstraint::XY, &cfg));
        assert!(is_visible(AxisConstraint::E, &cfg));
    }

    #[test]
    fn test_rotate_rings_and_trackball() {
        let cfg = config(TransformMode::Rotate);
        // Z ring faces the camera.
        assert_eq!(pick(&ray_to(Vec3::new(0.5, 0.0, 0.0)), &context(), &cfg), Some(AxisConstraint::Z));
        assert_eq!(pick(&ray_to(Vec3::new(0.0, 0.75, 0.0)), &context(), &cfg), Some(AxisConstraint::E));
        assert_eq!(pick(&ray_to(Vec3::new(0.1, 0.1, 0.0)), &context(), &cfg), Some(AxisConstraint::XYZE));
        assert_eq!(pick(&ray_to(Vec3::new(2.0, 2.0, 0.0)), &context(), &cfg), None);
    }

    #[test]
    fn test_scale_has_no_plane_handles() {
        let cfg = config(TransformMode::Scale);
        assert_eq!(pick(&ray_to(Vec3::new(0.3, 0.3, 0.0)), &context(), &cfg), None);
        assert_eq!(pick(&ray_to(Vec3::new(0.0, 0.0, 0.0)), &context(), &cfg), Some(AxisConstraint::XYZ));
    }

    #[test]
    fn test_pick_through_camera_ray() {
        let cam = camera();
        let client = cam.viewport.ndc_to_client(Vec2::ZERO);
        let ray = cam.ray_from_client(client).unwrap();
        assert_eq!(pick(&ray, &context(), &config(TransformMode::Translate)), Some(AxisConstraint::XYZ));
    }
}
