//! Notification records emitted by the controls.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::axis::TransformMode;
use crate::config::ControlsProperty;

/// Observable state changes of the controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlsEvent {
    /// A drag started with the given mode.
    DragStart { mode: TransformMode },
    /// A drag ended; carries the mode that was active.
    DragEnd { mode: TransformMode },
    /// Any observable change (config, pose, drag state).
    Change,
    /// The manipulated object's transform was mutated.
    ObjectChange,
    /// A configurable property changed value.
    PropertyChanged(ControlsProperty),
}

impl ControlsEvent {
    /// Host-facing event name.
    pub fn name(&self) -> String {
        match self {
            Self::DragStart { .. } => "mouseDown".to_string(),
            Self::DragEnd { .. } => "mouseUp".to_string(),
            Self::Change => "change".to_string(),
            Self::ObjectChange => "objectChange".to_string(),
            Self::PropertyChanged(property) => property.event_name(),
        }
    }
}

/// Output channel of the controls.
///
/// Cloning shares the same queue, so a host can keep a handle and drain it
/// from its own loop.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<ControlsEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: ControlsEvent) {
        self.inner.lock().push_back(event);
    }

    /// Drain all pending events in emission order.
    pub fn drain(&self) -> Vec<ControlsEvent> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").field("pending", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_queue() {
        let queue = EventQueue::new();
        let handle = queue.clone();
        queue.push(ControlsEvent::Change);
        queue.push(ControlsEvent::ObjectChange);
        assert_eq!(handle.len(), 2);
        assert_eq!(
            handle.drain(),
            vec![ControlsEvent::Change, ControlsEvent::ObjectChange]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(
            ControlsEvent::DragStart {
                mode: TransformMode::Rotate
            }
            .name(),
            "mouseDown"
        );
        assert_eq!(
            ControlsEvent::PropertyChanged(ControlsProperty::Space(crate::axis::SpaceMode::Local)).name(),
            "space-changed"
        );
    }
}
