//! Controls configuration.
//!
//! Every field has an explicit setter that reports whether the value changed
//! as a [`ControlsProperty`] record; the controller turns those records into
//! `<property>-changed` notifications.

use serde::{Deserialize, Serialize};

use crate::axis::{AxisConstraint, SpaceMode, TransformMode};
use crate::error::{ControlsError, ControlsResult};

/// Snap increments. `None` disables snapping for that mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub translation: Option<f32>,
    /// Radians.
    pub rotation: Option<f32>,
    pub scale: Option<f32>,
}

/// User-facing configuration of the controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enabled: bool,
    pub mode: TransformMode,
    pub axis: Option<AxisConstraint>,
    pub space: SpaceMode,
    pub snap: SnapSettings,
    /// Handle size multiplier.
    pub size: f32,
    pub show_x: bool,
    pub show_y: bool,
    pub show_z: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: TransformMode::Translate,
            axis: None,
            space: SpaceMode::World,
            snap: SnapSettings::default(),
            size: 1.0,
            show_x: true,
            show_y: true,
            show_z: true,
        }
    }
}

/// A changed property together with its new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlsProperty {
    Enabled(bool),
    Mode(TransformMode),
    Axis(Option<AxisConstraint>),
    Space(SpaceMode),
    TranslationSnap(Option<f32>),
    RotationSnap(Option<f32>),
    ScaleSnap(Option<f32>),
    Size(f32),
    ShowX(bool),
    ShowY(bool),
    ShowZ(bool),
    Dragging(bool),
}

impl ControlsProperty {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enabled(_) => "enabled",
            Self::Mode(_) => "mode",
            Self::Axis(_) => "axis",
            Self::Space(_) => "space",
            Self::TranslationSnap(_) => "translationSnap",
            Self::RotationSnap(_) => "rotationSnap",
            Self::ScaleSnap(_) => "scaleSnap",
            Self::Size(_) => "size",
            Self::ShowX(_) => "showX",
            Self::ShowY(_) => "showY",
            Self::ShowZ(_) => "showZ",
            Self::Dragging(_) => "dragging",
        }
    }

    /// Notification name, e.g. `"mode-changed"`.
    pub fn event_name(&self) -> String {
        format!("{}-changed", self.name())
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

impl ControlsConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> ControlsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ControlsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ControlsResult<()> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(ControlsError::InvalidConfig(format!(
                "size must be positive, got {}",
                self.size
            )));
        }
        for (name, value) in [
            ("translation", self.snap.translation),
            ("rotation", self.snap.rotation),
            ("scale", self.snap.scale),
        ] {
            if let Some(value) = value
                && !(value.is_finite() && value > 0.0)
            {
                return Err(ControlsError::InvalidConfig(format!(
                    "{name} snap must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Option<ControlsProperty> {
        replace(&mut self.enabled, enabled).then_some(ControlsProperty::Enabled(enabled))
    }

    pub fn set_mode(&mut self, mode: TransformMode) -> Option<ControlsProperty> {
        replace(&mut self.mode, mode).then_some(ControlsProperty::Mode(mode))
    }

    pub fn set_axis(&mut self, axis: Option<AxisConstraint>) -> Option<ControlsProperty> {
        replace(&mut self.axis, axis).then_some(ControlsProperty::Axis(axis))
    }

    pub fn set_space(&mut self, space: SpaceMode) -> Option<ControlsProperty> {
        replace(&mut self.space, space).then_some(ControlsProperty::Space(space))
    }

    pub fn set_translation_snap(&mut self, snap: Option<f32>) -> Option<ControlsProperty> {
        let snap = sanitize_snap(snap);
        replace(&mut self.snap.translation, snap).then_some(ControlsProperty::TranslationSnap(snap))
    }

    pub fn set_rotation_snap(&mut self, snap: Option<f32>) -> Option<ControlsProperty> {
        let snap = sanitize_snap(snap);
        replace(&mut self.snap.rotation, snap).then_some(ControlsProperty::RotationSnap(snap))
    }

    pub fn set_scale_snap(&mut self, snap: Option<f32>) -> Option<ControlsProperty> {
        let snap = sanitize_snap(snap);
        replace(&mut self.snap.scale, snap).then_some(ControlsProperty::ScaleSnap(snap))
    }

    pub fn set_size(&mut self, size: f32) -> Option<ControlsProperty> {
        if !(size.is_finite() && size > 0.0) {
            tracing::warn!("[controls] ignoring invalid size {}", size);
            return None;
        }
        replace(&mut self.size, size).then_some(ControlsProperty::Size(size))
    }

    pub fn set_show_x(&mut self, show: bool) -> Option<ControlsProperty> {
        replace(&mut self.show_x, show).then_some(ControlsProperty::ShowX(show))
    }

    pub fn set_show_y(&mut self, show: bool) -> Option<ControlsProperty> {
        replace(&mut self.show_y, show).then_some(ControlsProperty::ShowY(show))
    }

    pub fn set_show_z(&mut self, show: bool) -> Option<ControlsProperty> {
        replace(&mut self.show_z, show).then_some(ControlsProperty::ShowZ(show))
    }
}

/// Zero, negative and non-finite increments disable snapping.
fn sanitize_snap(snap: Option<f32>) -> Option<f32> {
    snap.filter(|v| v.is_finite() && *v > 0.0)
}
