//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `TransformControlsHeadlessPlugin` for exercising the
//! controls without a rendering or windowing backend.

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::bevy::components::{ControlsCamera, TransformControls};
use crate::bevy::events::{ControlsNotification, PointerInputEvent, PointerPhase};
use crate::bevy::plugin::TransformControlsHeadlessPlugin;
use crate::camera::{CameraProjection, Viewport};
use crate::gesture::PointerSample;

const CAMERA_DISTANCE: f32 = 10.0;
const VIEWPORT_SIZE: f32 = 800.0;

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::transform::TransformPlugin);
        app.add_plugins(TransformControlsHeadlessPlugin);
        app.update();
        Self { app }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    fn fov() -> f32 {
        50.0_f32.to_radians()
    }

    /// Client coordinate whose ray from the test camera hits z = 0 at (x, y).
    pub fn client_at(x: f32, y: f32) -> Vec2 {
        let half = CAMERA_DISTANCE * (Self::fov() * 0.5).tan();
        Viewport::new(VIEWPORT_SIZE, VIEWPORT_SIZE).ndc_to_client(Vec2::new(x / half, y / half))
    }

    /// Spawn a perspective camera on +Z looking at the origin.
    pub fn spawn_camera(&mut self) -> Entity {
        self.app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 0.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
                ControlsCamera {
                    projection: CameraProjection::Perspective {
                        fov_y: Self::fov(),
                        zoom: 1.0,
                    },
                    viewport: Some(Viewport::new(VIEWPORT_SIZE, VIEWPORT_SIZE)),
                },
            ))
            .id()
    }

    pub fn spawn_target(&mut self, transform: Transform, parent: Option<Entity>) -> Entity {
        let mut entity = self.app.world_mut().spawn(transform);
        if let Some(parent) = parent {
            entity.insert(ChildOf(parent));
        }
        entity.id()
    }

    pub fn spawn_controls(&mut self, target: Entity) -> Entity {
        self.app
            .world_mut()
            .spawn(TransformControls::new(target))
            .id()
    }

    pub fn send_pointer(&mut self, controls: Entity, phase: PointerPhase, sample: PointerSample) {
        self.app
            .world_mut()
            .write_message(PointerInputEvent::to(controls, phase, sample));
    }

    pub fn drain_notifications(&mut self) -> Vec<ControlsNotification> {
        self.app
            .world_mut()
            .resource_mut::<Messages<ControlsNotification>>()
            .drain()
            .collect()
    }

    pub fn transform(&self, entity: Entity) -> Transform {
        *self.app.world().get::<Transform>(entity).unwrap()
    }

    pub fn controls(&self, entity: Entity) -> &TransformControls {
        self.app.world().get::<TransformControls>(entity).unwrap()
    }

    pub fn controls_mut(&mut self, entity: Entity) -> Mut<'_, TransformControls> {
        self.app.world_mut().get_mut::<TransformControls>(entity).unwrap()
    }
}
