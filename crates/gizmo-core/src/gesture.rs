//! Pointer gesture classification.
//!
//! Tracks the active pointers and classifies the interaction:
//! - mouse and pen go straight to `CursorDrag`
//! - one finger rotates
//! - two fingers pinch-scale (baseline captured at the 1 -> 2 transition)
//! - three or more fingers keep scaling until every finger is lifted

use std::fmt;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::axis::TransformMode;

/// Stable identity of a pointer for the duration of its contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointerId(pub u64);

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

/// Button that changed state with this event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointerButton {
    /// No button changed (plain moves).
    #[default]
    None,
    /// Left mouse button, pen contact, touch contact.
    Primary,
    /// Middle mouse button.
    Auxiliary,
    /// Right mouse button, pen barrel button.
    Secondary,
    Other(u16),
}

/// One pointer event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub id: PointerId,
    /// Client-space coordinate (pixels, y down).
    pub position: Vec2,
    pub kind: PointerKind,
    pub is_primary: bool,
    pub button: PointerButton,
}

impl PointerSample {
    pub fn mouse(position: Vec2, button: PointerButton) -> Self {
        Self {
            id: PointerId(1),
            position,
            kind: PointerKind::Mouse,
            is_primary: true,
            button,
        }
    }

    pub fn touch(id: u64, position: Vec2, is_primary: bool) -> Self {
        Self {
            id: PointerId(id),
            position,
            kind: PointerKind::Touch,
            is_primary,
            button: PointerButton::Primary,
        }
    }

    pub fn is_touch(&self) -> bool {
        self.kind == PointerKind::Touch
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// Classified interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    #[default]
    Idle,
    OneFinger,
    /// Single finger left over after a pinch.
    OneFingerSwitched,
    TwoFinger,
    MultiFinger,
    CursorDrag,
}

/// Finger distance and uniform object scale at the start of a pinch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchBaseline {
    pub start_distance: f32,
    pub start_scale: f32,
}

impl PinchBaseline {
    /// Uniform scale for the current finger distance, `None` when the
    /// baseline distance is degenerate.
    pub fn scale_for(&self, current_distance: f32) -> Option<f32> {
        if !(self.start_distance.is_finite() && self.start_distance > f32::EPSILON) {
            return None;
        }
        let factor = self.start_scale * (current_distance / self.start_distance);
        factor.is_finite().then_some(factor)
    }
}

/// Result of feeding one pointer event to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureUpdate {
    pub previous: GestureState,
    pub state: GestureState,
    /// Mode implied by the new finger count, for touch transitions only.
    pub mode_hint: Option<TransformMode>,
    /// True exactly on the 1 -> 2 finger transition.
    pub pinch_started: bool,
    /// False when the event was ignored (unknown id, mixed input kinds).
    pub tracked: bool,
}

impl GestureUpdate {
    fn ignored(state: GestureState) -> Self {
        Self {
            previous: state,
            state,
            mode_hint: None,
            pinch_started: false,
            tracked: false,
        }
    }

    pub fn changed(&self) -> bool {
        self.previous != self.state
    }
}

/// Insertion-ordered pointer set keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ActivePointerSet {
    samples: Vec<PointerSample>,
}

impl ActivePointerSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn contains(&self, id: PointerId) -> bool {
        self.samples.iter().any(|s| s.id == id)
    }

    pub fn get(&self, id: PointerId) -> Option<&PointerSample> {
        self.samples.iter().find(|s| s.id == id)
    }

    /// Inserts a new sample at the end, or replaces an existing one in place.
    pub fn upsert(&mut self, sample: PointerSample) {
        match self.samples.iter_mut().find(|s| s.id == sample.id) {
            Some(slot) => *slot = sample,
            None => self.samples.push(sample),
        }
    }

    pub fn remove(&mut self, id: PointerId) -> Option<PointerSample> {
        let index = self.samples.iter().position(|s| s.id == id)?;
        Some(self.samples.remove(index))
    }

    pub fn first(&self) -> Option<&PointerSample> {
        self.samples.first()
    }

    /// The two oldest pointers, used for pinch distance.
    pub fn first_two(&self) -> Option<(&PointerSample, &PointerSample)> {
        match self.samples.as_slice() {
            [a, b, ..] => Some((a, b)),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointerSample> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Finite-state machine over pointer identities.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    pointers: ActivePointerSet,
    state: GestureState,
    pinch: Option<PinchBaseline>,
    baseline_scale: f32,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self {
            baseline_scale: 1.0,
            ..Self::default()
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn pointers(&self) -> &ActivePointerSet {
        &self.pointers
    }

    pub fn pinch(&self) -> Option<PinchBaseline> {
        self.pinch
    }

    /// Uniform object scale to record when the next pinch starts.
    pub fn set_baseline_scale(&mut self, scale: f32) {
        self.baseline_scale = scale;
    }

    /// Distance between the first two fingers in arrival order.
    pub fn current_finger_distance(&self) -> Option<f32> {
        let (a, b) = self.pointers.first_two()?;
        Some(a.position.distance(b.position))
    }

    pub fn on_pointer_down(&mut self, sample: PointerSample) -> GestureUpdate {
        let previous = self.state;

        if !sample.is_touch() {
            if previous != GestureState::Idle {
                tracing::trace!("[gesture] ignoring {:?} down during {:?}", sample.kind, previous);
                return GestureUpdate::ignored(previous);
            }
            self.pointers.upsert(sample);
            self.state = GestureState::CursorDrag;
            return self.update(previous, None, false);
        }

        if previous == GestureState::CursorDrag || self.pointers.contains(sample.id) {
            return GestureUpdate::ignored(previous);
        }

        self.pointers.upsert(sample);
        match previous {
            GestureState::Idle => {
                self.state = GestureState::OneFinger;
                self.update(previous, Some(TransformMode::Rotate), false)
            }
            GestureState::OneFinger | GestureState::OneFingerSwitched => {
                self.state = GestureState::TwoFinger;
                self.pinch = self.current_finger_distance().map(|start_distance| PinchBaseline {
                    start_distance,
                    start_scale: self.baseline_scale,
                });
                tracing::debug!("[gesture] pinch start: {:?}", self.pinch);
                self.update(previous, Some(TransformMode::Scale), true)
            }
            GestureState::TwoFinger | GestureState::MultiFinger => {
                self.state = GestureState::MultiFinger;
                self.update(previous, Some(TransformMode::Scale), false)
            }
            GestureState::CursorDrag => GestureUpdate::ignored(previous),
        }
    }

    pub fn on_pointer_move(&mut self, sample: PointerSample) -> GestureUpdate {
        if !self.pointers.contains(sample.id) {
            return GestureUpdate::ignored(self.state);
        }
        self.pointers.upsert(sample);
        self.update(self.state, None, false)
    }

    pub fn on_pointer_up(&mut self, id: PointerId) -> GestureUpdate {
        let previous = self.state;
        if !self.pointers.contains(id) {
            return GestureUpdate::ignored(previous);
        }
        let pair_before = self.pinch_pair();
        let scale_before = self
            .pinch
            .zip(self.current_finger_distance())
            .and_then(|(pinch, distance)| pinch.scale_for(distance));
        self.pointers.remove(id);

        let (next, hint) = match (previous, self.pointers.len()) {
            (_, 0) => (GestureState::Idle, None),
            (GestureState::TwoFinger, 1) => (GestureState::OneFingerSwitched, Some(TransformMode::Rotate)),
            (GestureState::MultiFinger, _) => (GestureState::MultiFinger, None),
            // Finger counts that cannot arise from the table above; settle on
            // the state matching what is left.
            (_, 1) => (GestureState::OneFingerSwitched, Some(TransformMode::Rotate)),
            (_, 2) => (GestureState::TwoFinger, Some(TransformMode::Scale)),
            (_, _) => (GestureState::MultiFinger, Some(TransformMode::Scale)),
        };

        self.state = next;
        if !matches!(next, GestureState::TwoFinger | GestureState::MultiFinger) {
            self.pinch = None;
        } else if self.pinch_pair() != pair_before {
            self.rebase_pinch(scale_before);
        }
        self.update(previous, hint, false)
    }

    fn pinch_pair(&self) -> Option<(PointerId, PointerId)> {
        self.pointers.first_two().map(|(a, b)| (a.id, b.id))
    }

    /// Re-anchors the pinch on a new finger pair so the scale carries on
    /// from `scale` instead of jumping to the new pair's distance ratio.
    fn rebase_pinch(&mut self, scale: Option<f32>) {
        if let (Some(start_scale), Some(start_distance)) = (scale, self.current_finger_distance()) {
            self.pinch = Some(PinchBaseline {
                start_distance,
                start_scale,
            });
            tracing::debug!("[gesture] pinch rebased: {:?}", self.pinch);
        }
    }

    /// Forgets every pointer (capture lost, controls disposed).
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.pinch = None;
        self.state = GestureState::Idle;
    }

    fn update(
        &self,
        previous: GestureState,
        mode_hint: Option<TransformMode>,
        pinch_started: bool,
    ) -> GestureUpdate {
        if previous != self.state {
            tracing::trace!("[gesture] {:?} -> {:?}", previous, self.state);
        }
        GestureUpdate {
            previous,
            state: self.state,
            mode_hint,
            pinch_started,
            tracked: true,
        }
    }
}
