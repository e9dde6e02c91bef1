//! ECS Components for the transform controls.

use bevy::prelude::*;

use crate::bevy::events::PointerPhase;
use crate::camera::{CameraProjection, ViewCamera, Viewport};
use crate::config::ControlsConfig;
use crate::controller::InteractionController;
use crate::gesture::PointerSample;

/// Transform controls manipulating `target`.
///
/// The controls entity itself carries no `Transform`; the target's
/// `Transform` is read every frame and written back when a drag changes it.
#[derive(Component, Debug)]
pub struct TransformControls {
    /// Entity being manipulated. `None` detaches the controls.
    pub target: Option<Entity>,
    controller: InteractionController,
}

impl TransformControls {
    pub fn new(target: Entity) -> Self {
        Self::with_config(target, ControlsConfig::default())
    }

    pub fn with_config(target: Entity, config: ControlsConfig) -> Self {
        Self {
            target: Some(target),
            controller: InteractionController::with_config(config),
        }
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    /// Routes one pointer event to the matching controller entry point.
    pub fn dispatch(&mut self, phase: PointerPhase, sample: PointerSample) {
        match phase {
            PointerPhase::Down => self.controller.pointer_down(sample),
            PointerPhase::Move => self.controller.pointer_move(sample),
            PointerPhase::Up => self.controller.pointer_up(sample),
            PointerPhase::Cancel => self.controller.pointer_cancel(sample),
            PointerPhase::Hover => self.controller.pointer_hover(sample),
        }
    }
}

/// Marks the camera the controls cast pointer rays from.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ControlsCamera {
    /// Used when the entity has no Bevy `Projection`.
    pub projection: CameraProjection,
    /// Overrides the camera's logical viewport (pointer coordinates are
    /// measured against it).
    pub viewport: Option<Viewport>,
}

impl ControlsCamera {
    /// Builds the controls' view of this camera.
    pub fn view_camera(
        &self,
        transform: &GlobalTransform,
        camera: Option<&Camera>,
        projection: Option<&Projection>,
    ) -> ViewCamera {
        let (_, rotation, position) = transform.to_scale_rotation_translation();
        let projection = match projection {
            Some(Projection::Perspective(perspective)) => CameraProjection::Perspective {
                fov_y: perspective.fov,
                zoom: 1.0,
            },
            Some(Projection::Orthographic(orthographic)) => CameraProjection::Orthographic {
                half_height: orthographic.area.height() * 0.5,
                zoom: 1.0,
            },
            _ => self.projection,
        };
        let viewport = self
            .viewport
            .or_else(|| {
                camera
                    .and_then(Camera::logical_viewport_rect)
                    .map(|rect| Viewport {
                        left: rect.min.x,
                        top: rect.min.y,
                        width: rect.width(),
                        height: rect.height(),
                    })
            })
            .unwrap_or_default();

        ViewCamera {
            position,
            rotation,
            projection,
            viewport,
        }
    }
}
