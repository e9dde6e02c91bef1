//! Drag plane orientation.
//!
//! The drag plane is an invisible surface anchored at the object's world
//! position. Pointer rays are intersected with it to turn a 2D pointer into a
//! 3D point. Its orientation contains the constrained axis (or axes) and is
//! otherwise turned toward the viewer so rays never graze it edge-on.

use bevy::math::{Quat, Ray3d, Vec3};

use crate::axis::{AxisConstraint, SpaceMode, TransformMode};
use crate::geometry::{EPSILON, basis, intersect_ray_plane, look_rotation};

/// Everything the plane orientation depends on.
#[derive(Debug, Clone, Copy)]
pub struct PlaneInputs {
    pub mode: TransformMode,
    pub axis: Option<AxisConstraint>,
    pub space: SpaceMode,
    /// Unit vector from the object toward the viewer.
    pub eye: Vec3,
    pub object_rotation: Quat,
    pub camera_rotation: Quat,
}

/// Computes the drag plane rotation (plane normal = rotation * +Z).
pub fn orient(inputs: &PlaneInputs) -> Quat {
    let space = if inputs.mode == TransformMode::Scale {
        SpaceMode::Local
    } else {
        inputs.space
    };
    let [v1, v2, v3] = basis(match space {
        SpaceMode::Local => inputs.object_rotation,
        SpaceMode::World => Quat::IDENTITY,
    });

    let mut align = v2;
    let direction = match inputs.mode {
        TransformMode::Translate | TransformMode::Scale => match inputs.axis {
            Some(AxisConstraint::X) => {
                align = inputs.eye.cross(v1);
                v1.cross(align)
            }
            Some(AxisConstraint::Y) => {
                align = inputs.eye.cross(v2);
                v2.cross(align)
            }
            Some(AxisConstraint::Z) => {
                align = inputs.eye.cross(v3);
                v3.cross(align)
            }
            Some(AxisConstraint::XY) => v3,
            Some(AxisConstraint::YZ) => v1,
            Some(AxisConstraint::XZ) => {
                align = v3;
                v2
            }
            Some(AxisConstraint::XYZ | AxisConstraint::E | AxisConstraint::XYZE) | None => Vec3::ZERO,
        },
        TransformMode::Rotate => Vec3::ZERO,
    };

    if direction.length_squared() < EPSILON * EPSILON {
        inputs.camera_rotation
    } else {
        look_rotation(Vec3::ZERO, direction, align)
    }
}

/// Solved drag plane for one pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPlane {
    pub origin: Vec3,
    pub rotation: Quat,
}

impl DragPlane {
    pub fn solve(origin: Vec3, inputs: &PlaneInputs) -> Self {
        Self {
            origin,
            rotation: orient(inputs),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn intersect(&self, ray: &Ray3d) -> Option<Vec3> {
        intersect_ray_plane(ray, self.origin, self.normal())
    }
}
