//! Systems binding the controllers to the ECS world.
//!
//! Per frame, in order:
//! 1. `sync_controls_camera`: camera pose, projection and viewport
//! 2. `sync_controls_target`: target local pose and parent world pose
//! 3. `process_pointer_input`: pointer messages into the controllers
//! 4. `publish_notifications`: write back transforms and fan out notifications

use bevy::prelude::*;

use crate::bevy::components::{ControlsCamera, TransformControls};
use crate::bevy::events::{ControlsNotification, PointerInputEvent};
use crate::object::ManipulatedObject;

/// Copies the controls camera into every controller.
pub fn sync_controls_camera(
    cameras: Query<(
        &GlobalTransform,
        &ControlsCamera,
        Option<&Camera>,
        Option<&Projection>,
    )>,
    mut controls: Query<&mut TransformControls>,
) {
    let Ok((transform, settings, camera, projection)) = cameras.single() else {
        return;
    };
    let view = settings.view_camera(transform, camera, projection);
    for mut controls in &mut controls {
        controls.controller_mut().set_camera(view);
    }
}

/// Attaches, refreshes or detaches each controller's target.
pub fn sync_controls_target(
    mut controls: Query<&mut TransformControls>,
    targets: Query<(&Transform, Option<&ChildOf>)>,
    parents: Query<&GlobalTransform>,
) {
    for mut controls in &mut controls {
        let attached = controls.controller().object().is_some();
        let Some(target) = controls.target else {
            if attached {
                controls.controller_mut().detach();
            }
            continue;
        };
        let Ok((local, child_of)) = targets.get(target) else {
            if attached {
                warn!("[controls] target {} no longer exists, detaching", target);
                controls.controller_mut().detach();
            }
            continue;
        };

        // Root entities sit under an identity parent.
        let parent = match child_of {
            Some(child_of) => parents
                .get(child_of.parent())
                .ok()
                .map(GlobalTransform::compute_transform),
            None => Some(Transform::IDENTITY),
        };
        let object = ManipulatedObject {
            local: *local,
            parent,
        };

        let controller = controls.controller_mut();
        if attached {
            controller.sync_object(object);
        } else {
            controller.attach(object);
        }
    }
}

/// Feeds pointer messages to the addressed controllers.
pub fn process_pointer_input(
    mut inputs: MessageReader<PointerInputEvent>,
    mut controls: Query<(Entity, &mut TransformControls)>,
) {
    for input in inputs.read() {
        for (entity, mut controls) in &mut controls {
            if input.controls.is_some_and(|addressed| addressed != entity) {
                continue;
            }
            controls.dispatch(input.phase, input.sample);
        }
    }
}

/// Writes changed poses back to targets and fans out notifications.
pub fn publish_notifications(
    mut controls: Query<(Entity, &mut TransformControls)>,
    mut targets: Query<&mut Transform, Without<TransformControls>>,
    mut notifications: MessageWriter<ControlsNotification>,
) {
    for (entity, mut controls) in &mut controls {
        let target = controls.target;
        if let Some(pose) = controls.controller_mut().take_pending_pose()
            && let Some(target) = target
            && let Ok(mut transform) = targets.get_mut(target)
        {
            *transform = pose;
        }

        for event in controls.controller().events().drain() {
            notifications.write(ControlsNotification {
                controls: entity,
                event,
            });
        }
    }
}

// ============================================================================
// Window input (windowed builds only)
// ============================================================================

/// Touch ids are offset so they never collide with the mouse pointer id.
#[cfg(feature = "windowed")]
pub const TOUCH_ID_BASE: u64 = 1 << 32;

/// System to turn primary-window mouse input into pointer messages.
#[cfg(feature = "windowed")]
pub fn collect_mouse_input(
    windows: Query<&Window, With<bevy::window::PrimaryWindow>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut last_cursor: Local<Option<Vec2>>,
    mut inputs: MessageWriter<PointerInputEvent>,
) {
    use crate::bevy::events::PointerPhase;
    use crate::gesture::{PointerButton, PointerSample};

    let Ok(window) = windows.single() else {
        return;
    };
    // Releases outside the window still need a position.
    let Some(cursor) = window.cursor_position().or(*last_cursor) else {
        return;
    };
    let moved = *last_cursor != Some(cursor);
    *last_cursor = Some(cursor);

    if moved {
        inputs.write(PointerInputEvent::broadcast(
            PointerPhase::Move,
            PointerSample::mouse(cursor, PointerButton::None),
        ));
    }

    for (button, mapped) in [
        (MouseButton::Left, PointerButton::Primary),
        (MouseButton::Middle, PointerButton::Auxiliary),
        (MouseButton::Right, PointerButton::Secondary),
    ] {
        if mouse_button.just_pressed(button) {
            inputs.write(PointerInputEvent::broadcast(
                PointerPhase::Down,
                PointerSample::mouse(cursor, mapped),
            ));
        }
        if mouse_button.just_released(button) {
            inputs.write(PointerInputEvent::broadcast(
                PointerPhase::Up,
                PointerSample::mouse(cursor, mapped),
            ));
        }
    }
}

/// System to turn touch input into pointer messages.
#[cfg(feature = "windowed")]
pub fn collect_touch_input(
    touches: Res<Touches>,
    mut inputs: MessageWriter<PointerInputEvent>,
) {
    use crate::bevy::events::PointerPhase;
    use crate::gesture::PointerSample;

    let sample = |touch: &bevy::input::touch::Touch, is_primary: bool| {
        PointerSample::touch(TOUCH_ID_BASE + touch.id(), touch.position(), is_primary)
    };
    let single = touches.iter().count() == 1;

    for touch in touches.iter_just_pressed() {
        inputs.write(PointerInputEvent::broadcast(PointerPhase::Down, sample(touch, single)));
    }
    for touch in touches.iter() {
        if touch.delta() != Vec2::ZERO && !touches.just_pressed(touch.id()) {
            inputs.write(PointerInputEvent::broadcast(PointerPhase::Move, sample(touch, false)));
        }
    }
    for touch in touches.iter_just_released() {
        inputs.write(PointerInputEvent::broadcast(PointerPhase::Up, sample(touch, false)));
    }
    for touch in touches.iter_just_canceled() {
        inputs.write(PointerInputEvent::broadcast(PointerPhase::Cancel, sample(touch, false)));
    }
}
