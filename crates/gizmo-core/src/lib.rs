//! Gizmo-Live Core Library
//!
//! Pointer-driven transform controls for 3D objects: a drag plane that
//! follows the camera and the active axis, solvers that turn plane
//! intersections into translation, rotation and scale, and a gesture
//! classifier that maps touch input onto those modes.
//!
//! The library works on plain math types and can be driven by any host;
//! the `bevy` module binds it to Bevy entities, cameras and input.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod axis;
pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod object;
pub mod picker;
pub mod plane;
pub mod solver;

// Bevy integration
pub mod bevy;

pub use axis::{Axis, AxisConstraint, SpaceMode, TransformMode};
pub use camera::{CameraProjection, ViewCamera, Viewport};
pub use config::{ControlsConfig, ControlsProperty, SnapSettings};
pub use controller::InteractionController;
pub use error::{ControlsError, ControlsResult};
pub use events::{ControlsEvent, EventQueue};
pub use gesture::{
    GestureClassifier, GestureState, GestureUpdate, PinchBaseline, PointerButton, PointerId,
    PointerKind, PointerSample,
};
pub use object::ManipulatedObject;
pub use plane::{DragPlane, PlaneInputs};
pub use solver::{DragSession, SolveInputs};
