//! Error types for the playback controls

use serde::{Deserialize, Serialize};

/// Errors surfaced by the formatter, the track registry and the controller.
///
/// Operations invoked while nothing is bound (play, pause, stop, seeking) are
/// no-ops rather than errors, so a UI can drive the controller before any
/// subject is attached.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ControlsError {
    /// A time value was absent or not a number
    #[error("property '{parameter}' can't be undefined or NaN")]
    InvalidTime { parameter: String },

    /// Track index outside the registry
    #[error("Invalid animation index {index}. {}", range_hint(.len))]
    IndexOutOfRange { index: usize, len: usize },

    /// No track carries the requested name
    #[error("Animation \"{name}\" not found")]
    TrackNotFound { name: String },

    /// A subject is already attached to the controller
    #[error("{}", attached_message(.same_subject))]
    AlreadyAttached { same_subject: bool },

    /// A clip handle was absent while cataloguing a subject
    #[error("Animation clip is required (missing clip at position {index})")]
    MissingClip { index: usize },

    /// Track selection requires an attached subject
    #[error("No mesh attached")]
    NoSubjectAttached,

    /// Configuration could not be parsed
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

fn range_hint(len: &usize) -> String {
    match *len {
        0 => "No animations are available".to_string(),
        len => format!("Must be between 0 and {}", len - 1),
    }
}

fn attached_message(same_subject: &bool) -> &'static str {
    if *same_subject {
        "Mesh is already attached"
    } else {
        "Another mesh is already attached; detach it first"
    }
}

impl ControlsError {
    /// Invalid time for the named parameter
    pub fn invalid_time(parameter: impl Into<String>) -> Self {
        Self::InvalidTime {
            parameter: parameter.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidTime { .. } => "validation",
            Self::IndexOutOfRange { .. } | Self::TrackNotFound { .. } => "selection",
            Self::AlreadyAttached { .. } | Self::NoSubjectAttached => "usage",
            Self::MissingClip { .. } => "data",
            Self::InvalidConfig { .. } => "config",
        }
    }

    /// Selection errors leave controller state untouched and may be retried
    /// with a different index or name.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::TrackNotFound { .. }
        )
    }
}

impl From<serde_json::Error> for ControlsError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
