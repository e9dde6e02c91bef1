//! Bevy integration for the transform controls.
//!
//! Binds an [`InteractionController`](crate::controller::InteractionController)
//! to a target entity, a camera entity and the window's pointer input.

pub mod components;
pub mod events;
pub mod plugin;
#[cfg(feature = "windowed")]
pub mod rendering;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::{TransformControlsHeadlessPlugin, TransformControlsSet};

#[cfg(feature = "windowed")]
pub use plugin::TransformControlsPlugin;
#[cfg(feature = "windowed")]
pub use rendering::ControlsGizmoConfig;
