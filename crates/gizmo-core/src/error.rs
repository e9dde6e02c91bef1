//! Error taxonomy for the transform controls.
//!
//! Pointer handlers never surface these to the host. They are produced by the
//! internal drag steps and folded into a logged no-op at the entry points.

use crate::gesture::PointerId;

/// Errors produced while turning pointer input into a transform update.
#[derive(Debug, thiserror::Error)]
pub enum ControlsError {
    #[error("no object is attached to the controls")]
    NotAttached,
    #[error("manipulated object has no parent transform")]
    MissingParent,
    #[error("pointer ray does not intersect the drag plane")]
    NoIntersection,
    #[error("rotation axis is degenerate")]
    DegenerateRotation,
    #[error("pinch baseline distance is zero")]
    DegeneratePinch,
    #[error("scale drag started at the object origin")]
    DegenerateScale,
    #[error("pointer {0} is not tracked")]
    UnknownPointer(PointerId),
    #[error("invalid axis constraint: {0}")]
    InvalidAxis(String),
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl ControlsError {
    /// Returns true for conditions that are expected while dragging
    /// (pointer near the plane horizon, collapsed pinch, stale release).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NoIntersection
                | Self::DegenerateRotation
                | Self::DegeneratePinch
                | Self::DegenerateScale
                | Self::UnknownPointer(_)
        )
    }
}

pub type ControlsResult<T> = Result<T, ControlsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ControlsError::NoIntersection.is_transient());
        assert!(ControlsError::DegeneratePinch.is_transient());
        assert!(ControlsError::UnknownPointer(PointerId(7)).is_transient());
        assert!(!ControlsError::MissingParent.is_transient());
        assert!(!ControlsError::NotAttached.is_transient());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ControlsError::UnknownPointer(PointerId(3)).to_string(),
            "pointer 3 is not tracked"
        );
        assert_eq!(
            ControlsError::InvalidAxis("W".to_string()).to_string(),
            "invalid axis constraint: W"
        );
    }
}
