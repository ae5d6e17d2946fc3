//! Controller configuration and attach options.

use serde::{Deserialize, Serialize};

use crate::error::ControlsError;
use crate::format::TimeFormat;
use crate::Result;

/// Per-controller configuration, fixed at construction.
///
/// Every field has a default, so a partial JSON object is a valid config:
///
/// ```
/// use scrubline_core::{ControlsConfig, TimeFormat};
///
/// let config = ControlsConfig::from_json(r#"{"output_format": "SS_MS"}"#).unwrap();
/// assert_eq!(config.output_format, TimeFormat::SecondsCentiseconds);
/// assert!(config.init_ui_controls);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub output_format: TimeFormat,
    /// Maintain a [`ControlsView`](crate::view::ControlsView).
    pub init_ui_controls: bool,
    /// Include the track selector in the view.
    pub enable_track_selector: bool,
    /// Select index 0 on attach when no explicit track is requested.
    pub auto_select_first_track: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            output_format: TimeFormat::default(),
            init_ui_controls: true,
            enable_track_selector: true,
            auto_select_first_track: true,
        }
    }
}

impl ControlsConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Config without any bound UI.
    pub fn headless() -> Self {
        Self {
            init_ui_controls: false,
            enable_track_selector: false,
            ..Self::default()
        }
    }

    pub fn with_output_format(mut self, format: TimeFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// A time supplied by a caller: a number of seconds or text to parse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    Number(f64),
    Text(String),
}

impl TimeValue {
    /// Seconds, or `InvalidTime` when the value is NaN or not numeric.
    pub fn seconds(&self) -> Result<f64> {
        let seconds = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| ControlsError::invalid_time("time"))?,
        };
        if seconds.is_nan() {
            return Err(ControlsError::invalid_time("time"));
        }
        Ok(seconds)
    }
}

impl From<f64> for TimeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Options applied by `attach`, in order: track selection, seek, play.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachOptions {
    pub play: bool,
    pub at_time: Option<TimeValue>,
    /// Explicit initial track; overrides `auto_select_first_track`.
    pub track_index: Option<usize>,
}

impl AttachOptions {
    pub fn playing() -> Self {
        Self {
            play: true,
            ..Self::default()
        }
    }

    pub fn at_time(mut self, time: impl Into<TimeValue>) -> Self {
        self.at_time = Some(time.into());
        self
    }

    pub fn track(mut self, index: usize) -> Self {
        self.track_index = Some(index);
        self
    }
}
