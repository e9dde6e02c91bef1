//! The object being manipulated, as seen by the controls.

use bevy::prelude::Transform;

use crate::error::{ControlsError, ControlsResult};
use crate::geometry::compose;

/// Local pose of the manipulated object plus the world pose of its parent.
///
/// `parent` is `None` when the object has been detached from the hierarchy.
/// Drags require a parent; see [`ManipulatedObject::parent_world`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulatedObject {
    pub local: Transform,
    pub parent: Option<Transform>,
}

impl ManipulatedObject {
    /// Object placed directly under the scene root.
    pub fn new(local: Transform) -> Self {
        Self {
            local,
            parent: Some(Transform::IDENTITY),
        }
    }

    pub fn with_parent(local: Transform, parent: Transform) -> Self {
        Self {
            local,
            parent: Some(parent),
        }
    }

    pub fn orphan(local: Transform) -> Self {
        Self {
            local,
            parent: None,
        }
    }

    pub fn parent_world(&self) -> ControlsResult<Transform> {
        self.parent.ok_or(ControlsError::MissingParent)
    }

    /// World pose derived from the parent pose and the local pose.
    pub fn world(&self) -> ControlsResult<Transform> {
        Ok(compose(&self.parent_world()?, &self.local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::{Quat, Vec3};

    #[test]
    fn test_world_from_parent() {
        let object = ManipulatedObject::with_parent(
            Transform::from_xyz(1.0, 0.0, 0.0),
            Transform::from_xyz(0.0, 5.0, 0.0).with_rotation(Quat::from_rotation_y(std::f32::consts::PI)),
        );
        let world = object.world().unwrap();
        assert!((world.translation - Vec3::new(-1.0, 5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_orphan_has_no_world() {
        let object = ManipulatedObject::orphan(Transform::IDENTITY);
        assert!(matches!(object.world(), Err(ControlsError::MissingParent)));
    }
}
