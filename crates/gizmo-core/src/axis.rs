//! Transform modes, coordinate spaces and axis constraints.

use std::fmt;
use std::str::FromStr;

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ControlsError;

/// Which component of the pose a drag edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frame in which deltas are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceMode {
    Local,
    #[default]
    World,
}

impl SpaceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::World => "world",
        }
    }
}

impl fmt::Display for SpaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit basis vector of this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Label restricting which components a drag may affect.
///
/// "No constraint" is expressed as `Option<AxisConstraint>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisConstraint {
    X,
    Y,
    Z,
    XY,
    YZ,
    XZ,
    XYZ,
    /// Screen-normal roll.
    E,
    /// Free trackball rotation.
    XYZE,
}

impl AxisConstraint {
    pub fn label(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::XY => "XY",
            Self::YZ => "YZ",
            Self::XZ => "XZ",
            Self::XYZ => "XYZ",
            Self::E => "E",
            Self::XYZE => "XYZE",
        }
    }

    /// Whether the label names `axis`; `E` names none of them.
    pub fn contains(self, axis: Axis) -> bool {
        match axis {
            Axis::X => matches!(self, Self::X | Self::XY | Self::XZ | Self::XYZ | Self::XYZE),
            Axis::Y => matches!(self, Self::Y | Self::XY | Self::YZ | Self::XYZ | Self::XYZE),
            Axis::Z => matches!(self, Self::Z | Self::YZ | Self::XZ | Self::XYZ | Self::XYZE),
        }
    }

    /// The named axis for single-axis constraints.
    pub fn single(self) -> Option<Axis> {
        match self {
            Self::X => Some(Axis::X),
            Self::Y => Some(Axis::Y),
            Self::Z => Some(Axis::Z),
            _ => None,
        }
    }

    /// Constraints that are always evaluated in world space.
    pub fn forces_world(self) -> bool {
        matches!(self, Self::E | Self::XYZE | Self::XYZ)
    }

    /// Multiplies each component of `v` by 0 or 1 depending on the label.
    pub fn mask(self, v: Vec3) -> Vec3 {
        Vec3::new(
            if self.contains(Axis::X) { v.x } else { 0.0 },
            if self.contains(Axis::Y) { v.y } else { 0.0 },
            if self.contains(Axis::Z) { v.z } else { 0.0 },
        )
    }
}

impl fmt::Display for AxisConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AxisConstraint {
    type Err = ControlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(Self::X),
            "Y" => Ok(Self::Y),
            "Z" => Ok(Self::Z),
            "XY" => Ok(Self::XY),
            "YZ" => Ok(Self::YZ),
            "XZ" => Ok(Self::XZ),
            "XYZ" => Ok(Self::XYZ),
            "E" => Ok(Self::E),
            "XYZE" => Ok(Self::XYZE),
            other => Err(ControlsError::InvalidAxis(other.to_string())),
        }
    }
}

/// Resolves the space actually used for a drag.
///
/// Scale always works in the object's frame; the omni constraints always
/// work in world space regardless of the requested space.
pub fn effective_space(
    mode: TransformMode,
    axis: Option<AxisConstraint>,
    requested: SpaceMode,
) -> SpaceMode {
    if mode == TransformMode::Scale {
        return SpaceMode::Local;
    }
    match axis {
        Some(axis) if axis.forces_world() => SpaceMode::World,
        _ => requested,
    }
}
