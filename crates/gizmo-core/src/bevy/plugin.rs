//! Bevy plugins for the transform controls.
//!
//! Provides:
//! - `TransformControlsHeadlessPlugin`: controller logic only (no window or rendering dependencies), usable in headless tests
//! - `TransformControlsPlugin`: headless plugin + window mouse/touch collection and handle drawing

use bevy::prelude::*;

use crate::bevy::events::{ControlsNotification, PointerInputEvent};
use crate::bevy::systems;

/// Ordering label for the controls' per-frame systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformControlsSet;

// ============================================================================
// Headless Plugin (logic only, no rendering/window dependencies)
// ============================================================================

/// Headless plugin containing the controls logic.
///
/// Pointer input must be written as `PointerInputEvent` messages by the
/// host (or by a test). Excluded systems:
/// - Window mouse and touch collection
/// - Gizmo drawing of the handles
pub struct TransformControlsHeadlessPlugin;

impl Plugin for TransformControlsHeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PointerInputEvent>()
            .add_message::<ControlsNotification>();

        app.add_systems(
            Update,
            (
                systems::sync_controls_camera,
                systems::sync_controls_target,
                systems::process_pointer_input,
                systems::publish_notifications,
            )
                .chain()
                .in_set(TransformControlsSet),
        );
    }
}

// ============================================================================
// Windowed Plugin (headless + input collection + rendering)
// ============================================================================

/// Full plugin: includes `TransformControlsHeadlessPlugin`, collects pointer
/// input from the primary window and draws the handles with gizmos.
#[cfg(feature = "windowed")]
pub struct TransformControlsPlugin;

#[cfg(feature = "windowed")]
impl Plugin for TransformControlsPlugin {
    fn build(&self, app: &mut App) {
        use crate::bevy::rendering::{ControlsGizmoConfig, draw_controls};

        app.add_plugins(TransformControlsHeadlessPlugin);
        app.init_resource::<ControlsGizmoConfig>();

        app.add_systems(
            Update,
            (systems::collect_mouse_input, systems::collect_touch_input)
                .before(TransformControlsSet),
        );
        app.add_systems(Update, draw_controls.after(TransformControlsSet));
    }
}
