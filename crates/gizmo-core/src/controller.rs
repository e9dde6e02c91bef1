//! Interaction controller.
//!
//! Owns the controls' mutable state: configuration, gesture classifier,
//! attached object and the active drag. Pointer entry points never fail;
//! internal steps return [`ControlsResult`] and are folded into logged
//! no-ops here.

use bevy::math::{Vec2, Vec3};
use bevy::prelude::Transform;

use crate::axis::{AxisConstraint, SpaceMode, TransformMode, effective_space};
use crate::camera::ViewCamera;
use crate::config::{ControlsConfig, ControlsProperty};
use crate::error::{ControlsError, ControlsResult};
use crate::events::{ControlsEvent, EventQueue};
use crate::gesture::{GestureClassifier, GestureState, PointerButton, PointerSample};
use crate::object::ManipulatedObject;
use crate::picker::{self, PickContext};
use crate::plane::{DragPlane, PlaneInputs};
use crate::solver::{self, DragSession, SolveInputs};

/// What the controls are doing with the pointers right now.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    Idle,
    Drag(DragSession),
    /// Two or more fingers scaling the object.
    Pinch,
}

#[derive(Debug)]
pub struct InteractionController {
    config: ControlsConfig,
    classifier: GestureClassifier,
    camera: ViewCamera,
    object: Option<ManipulatedObject>,
    default_pose: Option<Transform>,
    interaction: Interaction,
    /// Last plane intersection of the active drag, relative to the start
    /// world position.
    last_point: Option<Vec3>,
    /// The local pose changed and the host has not written it back yet.
    pose_pending: bool,
    events: EventQueue,
    disposed: bool,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self::with_config(ControlsConfig::default())
    }

    pub fn with_config(config: ControlsConfig) -> Self {
        Self {
            config,
            classifier: GestureClassifier::new(),
            camera: ViewCamera::default(),
            object: None,
            default_pose: None,
            interaction: Interaction::Idle,
            last_point: None,
            pose_pending: false,
            events: EventQueue::new(),
            disposed: false,
        }
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    pub fn camera(&self) -> &ViewCamera {
        &self.camera
    }

    /// Updates the camera the pointer rays are cast from.
    pub fn set_camera(&mut self, camera: ViewCamera) {
        self.camera = camera;
    }

    /// Output channel. Clone it to drain notifications elsewhere.
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn object(&self) -> Option<&ManipulatedObject> {
        self.object.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction != Interaction::Idle
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn gesture_state(&self) -> GestureState {
        self.classifier.state()
    }

    /// The active drag snapshot, if a single-pointer drag is running.
    pub fn session(&self) -> Option<&DragSession> {
        match &self.interaction {
            Interaction::Drag(session) => Some(session),
            _ => None,
        }
    }

    /// Takes the local pose the host still has to write back.
    pub fn take_pending_pose(&mut self) -> Option<Transform> {
        if !std::mem::take(&mut self.pose_pending) {
            return None;
        }
        self.object.map(|object| object.local)
    }

    // ---------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------

    pub fn set_enabled(&mut self, enabled: bool) {
        let property = self.config.set_enabled(enabled);
        if !enabled && self.is_dragging() {
            self.finish_interaction();
        }
        self.notify(property);
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        let property = self.config.set_mode(mode);
        self.notify(property);
    }

    pub fn set_axis(&mut self, axis: Option<AxisConstraint>) {
        let property = self.config.set_axis(axis);
        self.notify(property);
    }

    pub fn set_space(&mut self, space: SpaceMode) {
        let property = self.config.set_space(space);
        self.notify(property);
    }

    pub fn set_translation_snap(&mut self, snap: Option<f32>) {
        let property = self.config.set_translation_snap(snap);
        self.notify(property);
    }

    pub fn set_rotation_snap(&mut self, snap: Option<f32>) {
        let property = self.config.set_rotation_snap(snap);
        self.notify(property);
    }

    pub fn set_scale_snap(&mut self, snap: Option<f32>) {
        let property = self.config.set_scale_snap(snap);
        self.notify(property);
    }

    pub fn set_size(&mut self, size: f32) {
        let property = self.config.set_size(size);
        self.notify(property);
    }

    pub fn set_show_x(&mut self, show: bool) {
        let property = self.config.set_show_x(show);
        self.notify(property);
    }

    pub fn set_show_y(&mut self, show: bool) {
        let property = self.config.set_show_y(show);
        self.notify(property);
    }

    pub fn set_show_z(&mut self, show: bool) {
        let property = self.config.set_show_z(show);
        self.notify(property);
    }

    /// Applies every field of `config` through the setters, so each changed
    /// value is announced.
    pub fn apply_config(&mut self, config: &ControlsConfig) {
        self.set_enabled(config.enabled);
        self.set_mode(config.mode);
        self.set_axis(config.axis);
        self.set_space(config.space);
        self.set_translation_snap(config.snap.translation);
        self.set_rotation_snap(config.snap.rotation);
        self.set_scale_snap(config.snap.scale);
        self.set_size(config.size);
        self.set_show_x(config.show_x);
        self.set_show_y(config.show_y);
        self.set_show_z(config.show_z);
    }

    // ---------------------------------------------------------------
    // Object
    // ---------------------------------------------------------------

    /// Attaches an object and remembers its pose for
    /// [`InteractionController::revert_to_default`].
    pub fn attach(&mut self, object: ManipulatedObject) {
        if self.is_dragging() {
            self.finish_interaction();
        }
        tracing::debug!("[controls] attach at {:?}", object.local.translation);
        self.default_pose = Some(object.local);
        self.object = Some(object);
        self.pose_pending = false;
    }

    pub fn detach(&mut self) {
        if self.is_dragging() {
            self.finish_interaction();
        }
        self.object = None;
        self.default_pose = None;
        self.pose_pending = false;
        self.set_axis(None);
    }

    /// Refreshes the attached object from the host without touching the
    /// default pose. Ignored while dragging, when the controls own the pose,
    /// and while a pose change is waiting for [`Self::take_pending_pose`].
    pub fn sync_object(&mut self, object: ManipulatedObject) {
        if self.is_dragging() || self.pose_pending || self.object.is_none() {
            return;
        }
        self.object = Some(object);
    }

    /// Restores the pose captured at attach time.
    pub fn revert_to_default(&mut self) {
        if self.is_dragging() {
            tracing::debug!("[controls] revert ignored while dragging");
            return;
        }
        let (Some(object), Some(pose)) = (self.object.as_mut(), self.default_pose) else {
            return;
        };
        object.local = pose;
        self.pose_pending = true;
        self.emit(ControlsEvent::Change);
        self.emit(ControlsEvent::ObjectChange);
    }

    // ---------------------------------------------------------------
    // Drag steps
    // ---------------------------------------------------------------

    /// Starts a drag with the current mode and axis. Returns whether a drag
    /// session was created.
    pub fn begin(&mut self, sample: PointerSample) -> bool {
        if !self.accepts_input() || self.is_dragging() {
            return false;
        }
        let Some(axis) = self.config.axis else {
            return false;
        };
        match self.start_session(sample, axis) {
            Ok(session) => {
                tracing::debug!(
                    "[controls] drag start: mode={} axis={} space={}",
                    session.mode,
                    session.axis,
                    session.space
                );
                self.last_point = Some(session.point_start);
                self.start_interaction(Interaction::Drag(session), session.mode);
                true
            }
            Err(err) => {
                self.skip("begin", &err);
                false
            }
        }
    }

    /// Moves the active drag to `sample`. Returns whether the object changed.
    pub fn drag(&mut self, sample: PointerSample) -> bool {
        let Interaction::Drag(session) = self.interaction else {
            return false;
        };
        if !self.accepts_input() || session.pointer != sample.id {
            return false;
        }
        match self.solve_drag(&session, sample.position) {
            Ok((pose, point)) => {
                self.last_point = Some(point);
                self.apply_pose(pose);
                true
            }
            Err(err) => {
                self.skip("drag", &err);
                false
            }
        }
    }

    /// Ends the active drag if `sample` drives it.
    pub fn end(&mut self, sample: PointerSample) {
        if let Interaction::Drag(session) = self.interaction
            && session.pointer == sample.id
        {
            self.finish_interaction();
        }
    }

    /// Puts the object back to its drag-start pose; the drag continues from
    /// the last pointer position.
    pub fn reset(&mut self) {
        if !self.accepts_input() {
            return;
        }
        let Interaction::Drag(mut session) = self.interaction else {
            return;
        };
        if let Some(point) = self.last_point {
            session.point_start = point;
        }
        self.interaction = Interaction::Drag(session);
        self.apply_pose(session.local_start);
    }

    /// Applies the pinch scale for the current finger positions.
    pub fn pinch(&mut self, sample: PointerSample) -> bool {
        if self.interaction != Interaction::Pinch
            || !self.accepts_input()
            || !self.classifier.pointers().contains(sample.id)
        {
            return false;
        }
        match self.solve_pinch() {
            Ok(pose) => {
                self.apply_pose(pose);
                true
            }
            Err(err) => {
                self.skip("pinch", &err);
                false
            }
        }
    }

    // ---------------------------------------------------------------
    // Pointer entry points
    // ---------------------------------------------------------------

    pub fn pointer_down(&mut self, sample: PointerSample) {
        if !self.accepts_input() {
            return;
        }
        if !sample.is_touch() && sample.button != PointerButton::Primary {
            tracing::trace!("[controls] ignoring {:?} press", sample.button);
            return;
        }

        let baseline = self.object.map_or(1.0, |object| object.local.scale.x);
        self.classifier.set_baseline_scale(baseline);
        let update = self.classifier.on_pointer_down(sample);
        if !update.tracked {
            return;
        }
        if let Some(mode) = update.mode_hint {
            self.set_mode(mode);
        }

        match update.state {
            GestureState::CursorDrag => {
                self.pointer_hover(sample);
                self.begin(sample);
            }
            GestureState::OneFinger => {
                self.pointer_hover(sample);
                if self.config.axis.is_none() {
                    self.set_axis(Some(AxisConstraint::XYZE));
                }
                self.begin(sample);
            }
            GestureState::TwoFinger if update.pinch_started => self.start_pinch(),
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, sample: PointerSample) {
        if !self.accepts_input() {
            return;
        }
        let update = self.classifier.on_pointer_move(sample);
        if !update.tracked {
            if !sample.is_touch() {
                self.pointer_hover(sample);
            }
            return;
        }
        match self.interaction {
            Interaction::Drag(_) => {
                self.drag(sample);
            }
            Interaction::Pinch => {
                self.pinch(sample);
            }
            Interaction::Idle => {}
        }
    }

    pub fn pointer_up(&mut self, sample: PointerSample) {
        if self.disposed {
            return;
        }
        if !sample.is_touch() && !matches!(sample.button, PointerButton::Primary | PointerButton::None) {
            return;
        }
        self.release(sample);
    }

    /// Pointer capture was lost; treated as a release whatever the button.
    pub fn pointer_cancel(&mut self, sample: PointerSample) {
        if self.disposed {
            return;
        }
        self.release(sample);
    }

    /// Highlights the handle under the pointer by setting the axis.
    pub fn pointer_hover(&mut self, sample: PointerSample) {
        if !self.accepts_input() || self.is_dragging() {
            return;
        }
        let axis = self.pick(sample.position);
        self.set_axis(axis);
    }

    /// Ends any drag, detaches and rejects every later input.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.detach();
        self.classifier.reset();
        self.disposed = true;
        tracing::debug!("[controls] disposed");
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn accepts_input(&self) -> bool {
        self.config.enabled && !self.disposed
    }

    fn emit(&self, event: ControlsEvent) {
        self.events.push(event);
    }

    fn notify(&self, property: Option<ControlsProperty>) {
        if let Some(property) = property {
            self.emit(ControlsEvent::PropertyChanged(property));
            self.emit(ControlsEvent::Change);
        }
    }

    fn skip(&self, step: &str, err: &ControlsError) {
        match err {
            ControlsError::MissingParent => tracing::warn!("[controls] {} skipped: {}", step, err),
            _ if err.is_transient() => tracing::trace!("[controls] {} skipped: {}", step, err),
            _ => tracing::debug!("[controls] {} skipped: {}", step, err),
        }
    }

    fn start_interaction(&mut self, interaction: Interaction, mode: TransformMode) {
        self.interaction = interaction;
        self.notify(Some(ControlsProperty::Dragging(true)));
        self.emit(ControlsEvent::DragStart { mode });
    }

    fn finish_interaction(&mut self) {
        let mode = match self.interaction {
            Interaction::Idle => return,
            Interaction::Drag(session) => session.mode,
            Interaction::Pinch => TransformMode::Scale,
        };
        self.interaction = Interaction::Idle;
        self.last_point = None;
        self.notify(Some(ControlsProperty::Dragging(false)));
        self.emit(ControlsEvent::DragEnd { mode });
        self.set_axis(None);
        tracing::debug!("[controls] drag end: mode={}", mode);
    }

    fn start_pinch(&mut self) {
        if self.is_dragging() {
            self.finish_interaction();
        }
        let Some(object) = self.object else {
            return;
        };
        if let Err(err) = object.parent_world() {
            self.skip("pinch", &err);
            return;
        }
        self.start_interaction(Interaction::Pinch, TransformMode::Scale);
    }

    fn release(&mut self, sample: PointerSample) {
        let update = self.classifier.on_pointer_up(sample.id);
        if !update.tracked {
            self.skip("release", &ControlsError::UnknownPointer(sample.id));
            return;
        }
        if let Some(mode) = update.mode_hint
            && self.accepts_input()
        {
            self.set_mode(mode);
        }

        match self.interaction {
            Interaction::Drag(session) => {
                if session.pointer == sample.id || update.state == GestureState::Idle {
                    self.finish_interaction();
                }
            }
            Interaction::Pinch => match update.state {
                GestureState::Idle => self.finish_interaction(),
                GestureState::OneFingerSwitched => {
                    self.finish_interaction();
                    // Continue rotating from where the remaining finger is now.
                    if let Some(remaining) = self.classifier.pointers().first().copied()
                        && self.accepts_input()
                    {
                        self.set_axis(Some(AxisConstraint::XYZE));
                        self.begin(remaining);
                    }
                }
                _ => {}
            },
            Interaction::Idle => {}
        }
    }

    fn apply_pose(&mut self, pose: Transform) {
        let Some(object) = self.object.as_mut() else {
            return;
        };
        object.local = pose;
        self.pose_pending = true;
        self.emit(ControlsEvent::Change);
        self.emit(ControlsEvent::ObjectChange);
    }

    fn drag_plane(
        &self,
        mode: TransformMode,
        axis: AxisConstraint,
        space: SpaceMode,
        world: &Transform,
    ) -> (DragPlane, Vec3) {
        let eye = self.camera.eye_direction(world.translation);
        let plane = DragPlane::solve(
            world.translation,
            &PlaneInputs {
                mode,
                axis: Some(axis),
                space,
                eye,
                object_rotation: world.rotation,
                camera_rotation: self.camera.rotation,
            },
        );
        (plane, eye)
    }

    fn start_session(&self, sample: PointerSample, axis: AxisConstraint) -> ControlsResult<DragSession> {
        let object = self.object.ok_or(ControlsError::NotAttached)?;
        let parent_world = object.parent_world()?;
        let world_start = object.world()?;
        let mode = self.config.mode;
        let space = effective_space(mode, Some(axis), self.config.space);

        let ray = self
            .camera
            .ray_from_client(sample.position)
            .ok_or(ControlsError::NoIntersection)?;
        let (plane, _) = self.drag_plane(mode, axis, space, &world_start);
        let hit = plane.intersect(&ray).ok_or(ControlsError::NoIntersection)?;

        Ok(DragSession {
            pointer: sample.id,
            mode,
            axis,
            space,
            local_start: object.local,
            world_start,
            parent_world,
            point_start: hit - world_start.translation,
        })
    }

    /// New local pose and the relative intersection for a drag move.
    fn solve_drag(&self, session: &DragSession, client: Vec2) -> ControlsResult<(Transform, Vec3)> {
        if self.object.is_none() {
            return Err(ControlsError::NotAttached);
        }
        let ray = self
            .camera
            .ray_from_client(client)
            .ok_or(ControlsError::NoIntersection)?;
        // Anchored at the drag-start pose so repeated samples solve identically.
        let (plane, eye) = self.drag_plane(session.mode, session.axis, session.space, &session.world_start);
        let hit = plane.intersect(&ray).ok_or(ControlsError::NoIntersection)?;
        let inputs = SolveInputs {
            eye,
            camera_position: self.camera.position,
            snap: self.config.snap,
        };
        let pose = solver::solve(session, hit, &inputs)?;
        Ok((pose, session.point_end(hit)))
    }

    /// New local pose for the current finger distance.
    fn solve_pinch(&self) -> ControlsResult<Transform> {
        let object = self.object.ok_or(ControlsError::NotAttached)?;
        object.parent_world()?;
        let baseline = self.classifier.pinch().ok_or(ControlsError::DegeneratePinch)?;
        let distance = self
            .classifier
            .current_finger_distance()
            .ok_or(ControlsError::DegeneratePinch)?;
        let mut pose = object.local;
        pose.scale = solver::scale_pinch(&baseline, distance, self.config.snap.scale)?;
        Ok(pose)
    }

    fn pick(&self, client: Vec2) -> Option<AxisConstraint> {
        let world = self.object.as_ref()?.world().ok()?;
        let ray = self.camera.ray_from_client(client)?;
        let ctx = PickContext {
            origin: world.translation,
            object_rotation: world.rotation,
            eye: self.camera.eye_direction(world.translation),
            handle_scale: self.camera.handle_scale(world.translation, self.config.size),
        };
        picker::pick(&ray, &ctx, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraProjection, Viewport};

    fn fov() -> f32 {
        50.0_f32.to_radians()
    }

    fn projection() -> CameraProjection {
        CameraProjection::Perspective { fov_y: fov(), zoom: 1.0 }
    }

    fn camera() -> ViewCamera {
        ViewCamera::looking_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            projection(),
            Viewport::new(800.0, 800.0),
        )
    }

    /// Client coordinate whose ray hits the z = 0 plane at (x, y).
    fn client_at(x: f32, y: f32) -> Vec2 {
        let half = 10.0 * (fov() * 0.5).tan();
        camera().viewport.ndc_to_client(Vec2::new(x / half, y / half))
    }

    fn press(x: f32, y: f32) -> PointerSample {
        PointerSample::mouse(client_at(x, y), PointerButton::Primary)
    }

    fn hover(x: f32, y: f32) -> PointerSample {
        PointerSample::mouse(client_at(x, y), PointerButton::None)
    }

    fn controller_with(local: Transform) -> InteractionController {
        let mut controller = InteractionController::new();
        controller.set_camera(camera());
        controller.attach(ManipulatedObject::new(local));
        controller.events().clear();
        controller
    }

    fn controller() -> InteractionController {
        controller_with(Transform::IDENTITY)
    }

    fn translation(controller: &InteractionController) -> Vec3 {
        controller.object().unwrap().local.translation
    }

    #[test]
    fn test_translate_x_moves_one_unit() {
        let mut c = controller();
        c.pointer_down(press(1.0, 0.0));
        assert!(c.is_dragging());
        assert_eq!(c.config().axis, Some(AxisConstraint::X));
        let session = c.session().unwrap();
        assert_eq!(session.axis, AxisConstraint::X);
        assert_eq!(session.mode, TransformMode::Translate);

        c.pointer_move(hover(2.0, 0.0));
        assert!((translation(&c) - Vec3::X).length() < 1e-4);

        c.pointer_up(hover(2.0, 0.0));
        assert!(!c.is_dragging());
        assert_eq!(c.config().axis, None);

        let events = c.events().drain();
        assert!(events.contains(&ControlsEvent::DragStart {
            mode: TransformMode::Translate
        }));
        assert!(events.contains(&ControlsEvent::ObjectChange));
        assert!(events.contains(&ControlsEvent::DragEnd {
            mode: TransformMode::Translate
        }));
    }

    #[test]
    fn test_drag_start_emits_dragging_then_mouse_down() {
        let mut c = controller();
        c.set_axis(Some(AxisConstraint::X));
        c.events().clear();
        assert!(c.begin(press(1.0, 0.0)));
        assert_eq!(
            c.events().drain(),
            vec![
                ControlsEvent::PropertyChanged(ControlsProperty::Dragging(true)),
                ControlsEvent::Change,
                ControlsEvent::DragStart {
                    mode: TransformMode::Translate
                },
            ]
        );
    }

    #[test]
    fn test_redundant_moves_are_idempotent() {
        let mut c = controller();
        c.pointer_down(press(1.0, 0.0));
        c.pointer_move(hover(1.6, 0.3));
        let first = c.object().unwrap().local;
        c.pointer_move(hover(1.6, 0.3));
        let second = c.object().unwrap().local;
        assert_eq!(first, second);
    }

    #[test]
    fn test_translation_snap() {
        let mut c = controller();
        c.set_translation_snap(Some(0.5));
        c.pointer_down(press(1.0, 0.0));
        c.pointer_move(hover(1.37, 0.0));
        assert!((translation(&c).x - 0.5).abs() < 1e-4);
        assert!(translation(&c).y.abs() < 1e-6);
    }

    #[test]
    fn test_parallel_ray_is_a_no_op() {
        let side = ViewCamera::looking_at(
            Vec3::new(10.0, 0.0, 0.5),
            Vec3::new(0.0, 0.0, 0.5),
            Vec3::Y,
            projection(),
            Viewport::new(800.0, 800.0),
        );
        let mut c = controller();
        c.set_camera(side);
        c.set_axis(Some(AxisConstraint::XY));

        let down = side.viewport.ndc_to_client(Vec2::new(0.5, 0.0));
        assert!(c.begin(PointerSample::mouse(down, PointerButton::Primary)));
        c.events().clear();

        let parallel = side.viewport.ndc_to_client(Vec2::ZERO);
        assert!(!c.drag(PointerSample::mouse(parallel, PointerButton::None)));
        assert_eq!(c.object().unwrap().local, Transform::IDENTITY);
        assert!(c.events().is_empty());
    }

    #[test]
    fn test_unknown_pointer_up_is_a_no_op() {
        let mut c = controller();
        c.pointer_up(PointerSample::touch(99, Vec2::new(10.0, 10.0), false));
        assert!(c.events().is_empty());
        assert_eq!(c.gesture_state(), GestureState::Idle);
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_secondary_button_does_not_drag() {
        let mut c = controller();
        c.pointer_down(press(1.0, 0.0).with_button(PointerButton::Secondary));
        assert!(!c.is_dragging());
        assert_eq!(c.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_mouse_hover_sets_and_clears_axis() {
        let mut c = controller();
        c.pointer_move(hover(0.0, 1.0));
        assert_eq!(c.config().axis, Some(AxisConstraint::Y));
        c.pointer_move(hover(8.0, 8.0));
        assert_eq!(c.config().axis, None);
    }

    #[test]
    fn test_pinch_scales_uniformly() {
        let mut c = controller_with(Transform::from_scale(Vec3::splat(2.0)));
        c.pointer_down(PointerSample::touch(1, Vec2::new(300.0, 400.0), true));
        assert_eq!(c.config().mode, TransformMode::Rotate);
        assert!(c.is_dragging());

        c.pointer_down(PointerSample::touch(2, Vec2::new(500.0, 400.0), false));
        assert_eq!(c.gesture_state(), GestureState::TwoFinger);
        assert_eq!(c.config().mode, TransformMode::Scale);

        c.pointer_move(PointerSample::touch(2, Vec2::new(700.0, 400.0), false));
        let scale = c.object().unwrap().local.scale;
        assert!((scale.x - 4.0).abs() < 1e-4);
        assert_eq!(scale.x, scale.y);
        assert_eq!(scale.y, scale.z);

        let events = c.events().drain();
        let rotate_end = events
            .iter()
            .position(|e| *e == ControlsEvent::DragEnd { mode: TransformMode::Rotate });
        let pinch_start = events
            .iter()
            .position(|e| *e == ControlsEvent::DragStart { mode: TransformMode::Scale });
        assert!(rotate_end.unwrap() < pinch_start.unwrap());
    }

    #[test]
    fn test_finger_left_after_pinch_rotates_without_jump() {
        let mut c = controller();
        c.pointer_down(PointerSample::touch(1, Vec2::new(300.0, 400.0), true));
        c.pointer_down(PointerSample::touch(2, Vec2::new(500.0, 400.0), false));
        c.pointer_move(PointerSample::touch(2, Vec2::new(600.0, 400.0), false));
        let after_pinch = c.object().unwrap().local;

        c.pointer_up(PointerSample::touch(2, Vec2::new(600.0, 400.0), false));
        assert_eq!(c.gesture_state(), GestureState::OneFingerSwitched);
        assert_eq!(c.config().mode, TransformMode::Rotate);
        assert_eq!(c.config().axis, Some(AxisConstraint::XYZE));
        assert!(c.is_dragging());
        assert_eq!(c.object().unwrap().local, after_pinch);

        c.pointer_move(PointerSample::touch(1, Vec2::new(340.0, 400.0), true));
        assert!(c.object().unwrap().local.rotation.angle_between(after_pinch.rotation) > 1e-3);

        c.pointer_up(PointerSample::touch(1, Vec2::new(340.0, 400.0), true));
        assert_eq!(c.gesture_state(), GestureState::Idle);
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_reset_restores_start_and_reanchors() {
        let mut c = controller();
        c.pointer_down(press(1.0, 0.0));
        c.pointer_move(hover(2.0, 0.0));
        c.reset();
        assert!(translation(&c).length() < 1e-5);
        assert!(c.is_dragging());

        // Same pointer position after the reset: no further motion.
        c.pointer_move(hover(2.0, 0.0));
        assert!(translation(&c).length() < 1e-4);
    }

    #[test]
    fn test_revert_to_default() {
        let mut c = controller_with(Transform::from_xyz(0.0, 0.0, 0.0));
        c.pointer_down(press(1.0, 0.0));
        c.pointer_move(hover(2.5, 0.0));
        c.pointer_up(hover(2.5, 0.0));
        assert!(translation(&c).x > 1.0);

        c.events().clear();
        c.revert_to_default();
        assert!(translation(&c).length() < 1e-6);
        assert_eq!(
            c.events().drain(),
            vec![ControlsEvent::Change, ControlsEvent::ObjectChange]
        );
    }

    #[test]
    fn test_sync_waits_for_pending_pose() {
        let mut c = controller_with(Transform::from_xyz(1.0, 0.0, 0.0));
        c.sync_object(ManipulatedObject::new(Transform::from_xyz(3.0, 0.0, 0.0)));
        assert_eq!(translation(&c), Vec3::new(3.0, 0.0, 0.0));

        c.revert_to_default();
        // The host still shows the old pose until it takes the pending one.
        c.sync_object(ManipulatedObject::new(Transform::from_xyz(3.0, 0.0, 0.0)));
        assert_eq!(translation(&c), Vec3::X);

        assert_eq!(c.take_pending_pose().map(|pose| pose.translation), Some(Vec3::X));
        assert!(c.take_pending_pose().is_none());
        c.sync_object(ManipulatedObject::new(Transform::from_xyz(3.0, 0.0, 0.0)));
        assert_eq!(translation(&c), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_missing_parent_skips_drag() {
        let mut c = InteractionController::new();
        c.set_camera(camera());
        c.attach(ManipulatedObject::orphan(Transform::IDENTITY));
        c.set_axis(Some(AxisConstraint::X));
        assert!(!c.begin(press(1.0, 0.0)));
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_missing_parent_skips_pinch() {
        let mut c = InteractionController::new();
        c.set_camera(camera());
        c.attach(ManipulatedObject::orphan(Transform::IDENTITY));
        c.pointer_down(PointerSample::touch(1, Vec2::new(300.0, 400.0), true));
        c.pointer_down(PointerSample::touch(2, Vec2::new(500.0, 400.0), false));
        assert_eq!(c.gesture_state(), GestureState::TwoFinger);
        c.events().clear();

        c.pointer_move(PointerSample::touch(2, Vec2::new(700.0, 400.0), false));
        assert!(!c.is_dragging());
        assert_eq!(c.object().unwrap().local.scale, Vec3::ONE);
        assert!(!c.events().drain().contains(&ControlsEvent::ObjectChange));
    }

    #[test]
    fn test_pinch_in_local_space_keeps_orientation() {
        let start = Transform::from_rotation(bevy::math::Quat::from_rotation_z(0.6));
        let mut c = controller_with(start);
        c.set_space(SpaceMode::Local);
        c.pointer_down(PointerSample::touch(1, Vec2::new(300.0, 400.0), true));
        c.pointer_down(PointerSample::touch(2, Vec2::new(500.0, 400.0), false));
        c.pointer_move(PointerSample::touch(2, Vec2::new(700.0, 400.0), false));

        let pose = c.object().unwrap().local;
        assert!((pose.scale - Vec3::splat(2.0)).length() < 1e-4);
        assert!(pose.rotation.angle_between(start.rotation) < 1e-5);
        assert_eq!(pose.translation, start.translation);
        assert_eq!(c.config().space, SpaceMode::Local);
    }

    #[test]
    fn test_cancel_ends_drag_whatever_the_button() {
        let mut c = controller();
        c.pointer_down(press(1.0, 0.0));
        c.pointer_move(hover(1.5, 0.0));

        // A secondary release does not end the primary drag; a lost capture does.
        c.pointer_up(hover(1.5, 0.0).with_button(PointerButton::Secondary));
        assert!(c.is_dragging());

        c.pointer_cancel(hover(1.5, 0.0).with_button(PointerButton::Secondary));
        assert!(!c.is_dragging());
        assert!(c.session().is_none());
        assert_eq!(c.gesture_state(), GestureState::Idle);
        assert_eq!(c.config().axis, None);
        assert!((translation(&c).x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_setters_emit_only_on_change() {
        let mut c = controller();
        c.set_mode(TransformMode::Rotate);
        assert_eq!(
            c.events().drain(),
            vec![
                ControlsEvent::PropertyChanged(ControlsProperty::Mode(TransformMode::Rotate)),
                ControlsEvent::Change,
            ]
        );
        c.set_mode(TransformMode::Rotate);
        assert!(c.events().is_empty());
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut c = controller();
        c.set_enabled(false);
        c.pointer_down(press(1.0, 0.0));
        assert!(!c.is_dragging());
        assert_eq!(c.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_disable_ends_active_drag() {
        let mut c = controller();
        c.pointer_down(press(1.0, 0.0));
        c.set_enabled(false);
        assert!(!c.is_dragging());
        assert!(c.events().drain().contains(&ControlsEvent::DragEnd {
            mode: TransformMode::Translate
        }));
    }

    #[test]
    fn test_dispose_rejects_input() {
        let mut c = controller();
        c.pointer_down(press(1.0, 0.0));
        c.dispose();
        assert!(!c.is_dragging());
        assert!(c.object().is_none());
        assert!(c.is_disposed());

        c.attach(ManipulatedObject::new(Transform::IDENTITY));
        c.pointer_down(press(1.0, 0.0));
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_drag_ignores_other_pointers() {
        let mut c = controller();
        c.pointer_down(press(1.0, 0.0));
        let stranger = PointerSample::touch(7, client_at(2.0, 0.0), false);
        assert!(!c.drag(stranger));
        assert!(translation(&c).length() < 1e-6);
    }
}
