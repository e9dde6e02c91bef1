//! Drag-to-pose solvers.
//!
//! Given the immutable [`DragSession`] snapshot and the current drag-plane
//! intersection, compute the object's new local translation, rotation or
//! scale. Only the component of the active mode changes; the others keep
//! their drag-start values.

use bevy::math::{Quat, Vec3};
use bevy::prelude::Transform;

use crate::axis::{AxisConstraint, SpaceMode, TransformMode};
use crate::config::SnapSettings;
use crate::error::{ControlsError, ControlsResult};
use crate::geometry::{EPSILON, angle_between, safe_divide, snap_components, snap_to_increment};
use crate::gesture::{PinchBaseline, PointerId};

/// Angular speed numerator; divided by the camera distance so the
/// on-screen sensitivity does not depend on how far away the object is.
pub const ROTATION_SPEED: f32 = 20.0;
/// Damping of the free trackball rotation.
pub const TRACKBALL_DAMPING: f32 = 0.6;

/// Snapshot taken when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer: PointerId,
    pub mode: TransformMode,
    pub axis: AxisConstraint,
    /// Effective space (already forced for scale and omni constraints).
    pub space: SpaceMode,
    pub local_start: Transform,
    pub world_start: Transform,
    pub parent_world: Transform,
    /// Plane intersection at drag start, relative to the start world position.
    pub point_start: Vec3,
}

impl DragSession {
    /// Intersection relative to the start world position.
    pub fn point_end(&self, intersection: Vec3) -> Vec3 {
        intersection - self.world_start.translation
    }

    fn is_local(&self) -> bool {
        self.space == SpaceMode::Local
    }
}

/// Per-event inputs that are not part of the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SolveInputs {
    /// Unit vector from the object toward the viewer.
    pub eye: Vec3,
    pub camera_position: Vec3,
    pub snap: SnapSettings,
}

/// Computes the new local pose for a plane intersection.
pub fn solve(session: &DragSession, intersection: Vec3, inputs: &SolveInputs) -> ControlsResult<Transform> {
    let point_end = session.point_end(intersection);
    let mut pose = session.local_start;
    match session.mode {
        TransformMode::Translate => {
            pose.translation = translate(session, point_end, inputs.snap.translation);
        }
        TransformMode::Rotate => {
            pose.rotation = rotate(session, point_end, inputs)?;
        }
        TransformMode::Scale => {
            pose.scale = scale_drag(session, point_end, inputs.snap.scale)?;
        }
    }
    Ok(pose)
}

/// New local translation for a translate drag.
pub fn translate(session: &DragSession, point_end: Vec3, snap: Option<f32>) -> Vec3 {
    let axis = session.axis;
    let parent = &session.parent_world;
    let keep_frame = session.is_local() && axis != AxisConstraint::XYZ;

    let mut offset = point_end - session.point_start;
    if keep_frame {
        offset = session.world_start.rotation.inverse() * offset;
    }
    offset = axis.mask(offset);
    offset = if keep_frame {
        session.local_start.rotation * offset
    } else {
        parent.rotation.inverse() * offset
    };
    offset = safe_divide(offset, parent.scale);

    let mut position = session.local_start.translation + offset;

    if let Some(increment) = snap {
        if session.is_local() {
            let start = session.local_start.rotation;
            position = start * snap_components(start.inverse() * position, increment, axis);
        } else {
            let origin = parent.translation;
            position = snap_components(position + origin, increment, axis) - origin;
        }
    }
    position
}

/// New local rotation for a rotate drag.
pub fn rotate(session: &DragSession, point_end: Vec3, inputs: &SolveInputs) -> ControlsResult<Quat> {
    let eye = inputs.eye;
    let offset = point_end - session.point_start;

    let distance = session.world_start.translation.distance(inputs.camera_position);
    if distance < EPSILON {
        return Err(ControlsError::DegenerateRotation);
    }
    let speed = ROTATION_SPEED / distance;

    let (rotation_axis, mut angle) = match session.axis {
        AxisConstraint::E => {
            let mut angle = angle_between(point_end, session.point_start);
            let end_norm = point_end.normalize_or_zero();
            let start_norm = session.point_start.normalize_or_zero();
            if end_norm.cross(start_norm).dot(eye) >= 0.0 {
                angle = -angle;
            }
            (eye, angle)
        }
        AxisConstraint::XYZE => {
            let axis = offset.cross(eye).normalize_or_zero();
            // No motion since drag start: back to the start orientation.
            if axis == Vec3::ZERO {
                return Ok(session.local_start.rotation);
            }
            (axis, offset.dot(axis.cross(eye)) * speed * TRACKBALL_DAMPING)
        }
        AxisConstraint::X | AxisConstraint::Y | AxisConstraint::Z => {
            let unit = session.axis.single().map_or(Vec3::ZERO, |a| a.unit());
            let tangent = if session.is_local() {
                session.world_start.rotation * unit
            } else {
                unit
            };
            (unit, offset.dot(tangent.cross(eye).normalize_or_zero()) * speed)
        }
        AxisConstraint::XY | AxisConstraint::YZ | AxisConstraint::XZ | AxisConstraint::XYZ => {
            return Err(ControlsError::DegenerateRotation);
        }
    };

    if let Some(increment) = inputs.snap.rotation {
        angle = snap_to_increment(angle, increment);
    }

    compose_rotation(
        session.local_start.rotation,
        rotation_axis,
        angle,
        session.is_local() && session.axis.single().is_some(),
        session.parent_world.rotation,
    )
}

/// Applies an axis-angle rotation to `start`.
///
/// In the object's own frame the rotation is right-multiplied; otherwise the
/// axis is brought into the parent frame and the rotation left-multiplied.
pub fn compose_rotation(
    start: Quat,
    axis: Vec3,
    angle: f32,
    object_frame: bool,
    parent_rotation: Quat,
) -> ControlsResult<Quat> {
    let axis = if object_frame {
        axis
    } else {
        parent_rotation.inverse() * axis
    };
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO || !angle.is_finite() {
        return Err(ControlsError::DegenerateRotation);
    }
    let delta = Quat::from_axis_angle(axis, angle);
    let rotation = if object_frame { start * delta } else { delta * start };
    Ok(rotation.normalize())
}

/// New uniform scale for a mouse or pen drag.
///
/// The factor is the ratio of the current to the start distance from the
/// object origin on the drag plane, negative once the pointer crosses it.
pub fn scale_drag(session: &DragSession, point_end: Vec3, snap: Option<f32>) -> ControlsResult<Vec3> {
    let start_length = session.point_start.length();
    if start_length < EPSILON {
        return Err(ControlsError::DegenerateScale);
    }
    let mut ratio = point_end.length() / start_length;
    if point_end.dot(session.point_start) < 0.0 {
        ratio = -ratio;
    }
    Ok(uniform_scale(session.local_start.scale.x * ratio, snap))
}

/// New uniform scale for a two-finger pinch.
pub fn scale_pinch(baseline: &PinchBaseline, current_distance: f32, snap: Option<f32>) -> ControlsResult<Vec3> {
    let factor = baseline
        .scale_for(current_distance)
        .ok_or(ControlsError::DegeneratePinch)?;
    Ok(uniform_scale(factor, snap))
}

fn uniform_scale(factor: f32, snap: Option<f32>) -> Vec3 {
    let factor = match snap {
        Some(increment) => {
            let snapped = snap_to_increment(factor, increment);
            if snapped == 0.0 { increment } else { snapped }
        }
        None => factor,
    };
    Vec3::splat(factor)
}
