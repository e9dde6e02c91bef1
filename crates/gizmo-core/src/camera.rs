//! Host camera description.
//!
//! The renderer owns the real camera; the controls only need its pose, its
//! projection parameters and the viewport rectangle to turn client
//! coordinates into world-space rays.

use bevy::math::{Dir3, Quat, Ray3d, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::look_rotation;

/// Screen-space rectangle the pointer coordinates are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Converts a client coordinate into normalized device coordinates
    /// (x right, y up, both in -1..1 across the rectangle).
    pub fn client_to_ndc(&self, client: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (client.x - self.left) / self.width * 2.0 - 1.0,
            -(client.y - self.top) / self.height * 2.0 + 1.0,
        ))
    }

    /// Inverse of [`Viewport::client_to_ndc`].
    pub fn ndc_to_client(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            self.left + (ndc.x + 1.0) * 0.5 * self.width,
            self.top + (1.0 - ndc.y) * 0.5 * self.height,
        )
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Projection kind and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CameraProjection {
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        zoom: f32,
    },
    Orthographic {
        /// Half of the visible height in world units.
        half_height: f32,
        zoom: f32,
    },
}

impl Default for CameraProjection {
    fn default() -> Self {
        Self::Perspective {
            fov_y: std::f32::consts::FRAC_PI_4,
            zoom: 1.0,
        }
    }
}

/// Camera pose + projection as seen by the controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    pub position: Vec3,
    pub rotation: Quat,
    pub projection: CameraProjection,
    pub viewport: Viewport,
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            rotation: Quat::IDENTITY,
            projection: CameraProjection::default(),
            viewport: Viewport::default(),
        }
    }
}

impl ViewCamera {
    /// Camera at `position` looking at `target`.
    pub fn looking_at(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        projection: CameraProjection,
        viewport: Viewport,
    ) -> Self {
        Self {
            position,
            rotation: look_rotation(position, target, up),
            projection,
            viewport,
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, CameraProjection::Perspective { .. })
    }

    /// World-space direction the camera looks along.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Unit vector from `world_position` toward the viewer.
    ///
    /// Perspective cameras use the direction to the camera position,
    /// orthographic cameras the reversed view direction.
    pub fn eye_direction(&self, world_position: Vec3) -> Vec3 {
        if self.is_perspective() {
            let eye = (self.position - world_position).normalize_or_zero();
            if eye != Vec3::ZERO {
                return eye;
            }
        }
        self.rotation * Vec3::Z
    }

    /// World-space ray through a normalized device coordinate.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        let aspect = self.viewport.aspect();
        match self.projection {
            CameraProjection::Perspective { fov_y, zoom } => {
                let tan = (fov_y * 0.5).tan() / zoom.max(f32::EPSILON);
                let local = Vec3::new(ndc.x * tan * aspect, ndc.y * tan, -1.0);
                let direction = Dir3::new(self.rotation * local).ok()?;
                Some(Ray3d::new(self.position, direction))
            }
            CameraProjection::Orthographic { half_height, zoom } => {
                let half_height = half_height / zoom.max(f32::EPSILON);
                let offset = Vec3::new(ndc.x * half_height * aspect, ndc.y * half_height, 0.0);
                let direction = Dir3::new(self.forward()).ok()?;
                Some(Ray3d::new(self.position + self.rotation * offset, direction))
            }
        }
    }

    /// World-space ray under a client coordinate.
    pub fn ray_from_client(&self, client: Vec2) -> Option<Ray3d> {
        self.ray_from_ndc(self.viewport.client_to_ndc(client)?)
    }

    /// World units covered by the handles at `world_position`, so they keep
    /// a constant on-screen size (`size` is the user multiplier).
    pub fn handle_scale(&self, world_position: Vec3, size: f32) -> f32 {
        let factor = match self.projection {
            CameraProjection::Perspective { fov_y, zoom } => {
                let distance = world_position.distance(self.position);
                distance * (1.9 * (fov_y * 0.5).tan() / zoom.max(f32::EPSILON)).min(7.0)
            }
            CameraProjection::Orthographic { half_height, zoom } => {
                2.0 * half_height / zoom.max(f32::EPSILON)
            }
        };
        factor * size / 4.0
    }
}
