//! ECS Messages for the transform controls.
//!
//! Pointer input flows in as [`PointerInputEvent`]; controller notifications
//! flow out as [`ControlsNotification`].

use bevy::prelude::*;

use crate::events::ControlsEvent;
use crate::gesture::PointerSample;

/// Which pointer entry point an input targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Pointer capture lost.
    Cancel,
    Hover,
}

/// Message carrying one pointer event to the controls.
#[derive(Message, Debug, Clone, Copy)]
pub struct PointerInputEvent {
    /// Controls entity to deliver to, or every controls entity when `None`.
    pub controls: Option<Entity>,
    pub phase: PointerPhase,
    pub sample: PointerSample,
}

impl PointerInputEvent {
    pub fn broadcast(phase: PointerPhase, sample: PointerSample) -> Self {
        Self {
            controls: None,
            phase,
            sample,
        }
    }

    pub fn to(controls: Entity, phase: PointerPhase, sample: PointerSample) -> Self {
        Self {
            controls: Some(controls),
            phase,
            sample,
        }
    }
}

/// Message fired for every notification a controls entity emits.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ControlsNotification {
    pub controls: Entity,
    pub event: ControlsEvent,
}
