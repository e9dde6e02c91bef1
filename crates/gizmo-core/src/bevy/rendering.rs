//! Gizmo-based drawing of the control handles.
//!
//! Handle geometry matches what [`crate::picker`] hit-tests, so what is
//! drawn is what can be grabbed.

use bevy::math::Isometry3d;
use bevy::prelude::*;

use crate::axis::{AxisConstraint, SpaceMode, TransformMode, effective_space};
use crate::bevy::components::TransformControls;
use crate::geometry::basis;
use crate::picker::{
    AXIS_LENGTH, CENTER_RADIUS, PLANE_MAX, PLANE_MIN, RING_RADIUS, SCREEN_RING_RADIUS,
    TRACKBALL_RADIUS, is_visible,
};

/// Rendering configuration for the handles.
#[derive(Resource, Debug, Clone)]
pub struct ControlsGizmoConfig {
    pub x_color: Color,
    pub y_color: Color,
    pub z_color: Color,
    pub screen_color: Color,
    pub active_color: Color,
    pub trackball_color: Color,
}

impl Default for ControlsGizmoConfig {
    fn default() -> Self {
        Self {
            x_color: Color::srgb(0.9, 0.2, 0.2),
            y_color: Color::srgb(0.2, 0.9, 0.2),
            z_color: Color::srgb(0.2, 0.3, 0.95),
            screen_color: Color::srgba(0.9, 0.9, 0.9, 0.8),
            active_color: Color::srgb(1.0, 0.85, 0.1),
            trackball_color: Color::srgba(0.6, 0.6, 0.6, 0.15),
        }
    }
}

impl ControlsGizmoConfig {
    fn color(&self, handle: AxisConstraint, active: Option<AxisConstraint>) -> Color {
        if active == Some(handle) {
            return self.active_color;
        }
        match handle {
            AxisConstraint::X | AxisConstraint::YZ => self.x_color,
            AxisConstraint::Y | AxisConstraint::XZ => self.y_color,
            AxisConstraint::Z | AxisConstraint::XY => self.z_color,
            AxisConstraint::XYZ | AxisConstraint::E => self.screen_color,
            AxisConstraint::XYZE => self.trackball_color,
        }
    }
}

/// System to draw the handles of every attached, enabled controls entity.
pub fn draw_controls(
    controls: Query<&TransformControls>,
    config: Res<ControlsGizmoConfig>,
    mut gizmos: Gizmos,
) {
    for controls in &controls {
        let controller = controls.controller();
        let settings = controller.config();
        if !settings.enabled {
            continue;
        }
        let Some(world) = controller.object().and_then(|object| object.world().ok()) else {
            continue;
        };

        let origin = world.translation;
        let camera = controller.camera();
        let scale = camera.handle_scale(origin, settings.size);
        let [x, y, z] = basis(match effective_space(settings.mode, None, settings.space) {
            SpaceMode::Local => world.rotation,
            SpaceMode::World => Quat::IDENTITY,
        });
        let axes = [(AxisConstraint::X, x), (AxisConstraint::Y, y), (AxisConstraint::Z, z)];
        let active = settings.axis;

        match settings.mode {
            TransformMode::Translate | TransformMode::Scale => {
                for (axis, dir) in axes {
                    if !is_visible(axis, settings) {
                        continue;
                    }
                    let end = origin + dir * AXIS_LENGTH * scale;
                    let color = config.color(axis, active);
                    gizmos.line(origin, end, color);
                    if settings.mode == TransformMode::Scale {
                        gizmos.sphere(Isometry3d::from_translation(end), 0.06 * scale, color);
                    }
                }
                if settings.mode == TransformMode::Translate {
                    for (axis, u, v) in [
                        (AxisConstraint::XY, x, y),
                        (AxisConstraint::YZ, y, z),
                        (AxisConstraint::XZ, x, z),
                    ] {
                        if !is_visible(axis, settings) {
                            continue;
                        }
                        let corner = |a: f32, b: f32| origin + (u * a + v * b) * scale;
                        gizmos.linestrip(
                            [
                                corner(PLANE_MIN, PLANE_MIN),
                                corner(PLANE_MAX, PLANE_MIN),
                                corner(PLANE_MAX, PLANE_MAX),
                                corner(PLANE_MIN, PLANE_MAX),
                                corner(PLANE_MIN, PLANE_MIN),
                            ],
                            config.color(axis, active),
                        );
                    }
                }
                gizmos.sphere(
                    Isometry3d::from_translation(origin),
                    CENTER_RADIUS * scale * 0.5,
                    config.color(AxisConstraint::XYZ, active),
                );
            }
            TransformMode::Rotate => {
                for (axis, normal) in axes {
                    if !is_visible(axis, settings) {
                        continue;
                    }
                    let ring = Isometry3d::new(origin, Quat::from_rotation_arc(Vec3::Z, normal));
                    gizmos.circle(ring, RING_RADIUS * scale, config.color(axis, active));
                }
                let eye = camera.eye_direction(origin);
                let screen = Isometry3d::new(origin, Quat::from_rotation_arc(Vec3::Z, eye));
                gizmos.circle(
                    screen,
                    SCREEN_RING_RADIUS * scale,
                    config.color(AxisConstraint::E, active),
                );
                gizmos.sphere(
                    Isometry3d::from_translation(origin),
                    TRACKBALL_RADIUS * scale,
                    config.color(AxisConstraint::XYZE, active),
                );
            }
        }
    }
}
