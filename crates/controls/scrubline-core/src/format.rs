//! Time display formatting and cursor/percentage conversion.
//!
//! The display is derived from the cursor rounded to whole milliseconds. Rounding
//! (never truncating) keeps values produced by percentage back-conversion, such
//! as `0.9999999999999999`, on a stable side of each second boundary.

use serde::{Deserialize, Serialize};

use crate::error::ControlsError;
use crate::registry::TrackInfo;
use crate::Result;

const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_CENTISECOND: u64 = 10;

/// Ceiling for the millisecond count: the largest integer an `f64` holds
/// exactly. Only infinite or absurdly large inputs reach it.
pub const MAX_DISPLAY_MILLIS: u64 = (1 << 53) - 1;

/// Display format for the time label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// `MM:SS:CC`
    #[default]
    #[serde(rename = "MM_SS_MS")]
    MinutesSecondsCentiseconds,
    /// `SS:CC`
    #[serde(rename = "SS_MS")]
    SecondsCentiseconds,
}

impl TimeFormat {
    /// Text shown while nothing is bound.
    #[inline]
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::MinutesSecondsCentiseconds => "--:--:--",
            Self::SecondsCentiseconds => "--:--",
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinutesSecondsCentiseconds => "MM_SS_MS",
            Self::SecondsCentiseconds => "SS_MS",
        }
    }
}

/// Minutes, seconds and centiseconds of a cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub minutes: u64,
    pub seconds: u64,
    pub centiseconds: u64,
}

impl TimeParts {
    /// Split a non-NaN time in seconds. Negative input clamps to zero and
    /// infinite or extreme values saturate at [`MAX_DISPLAY_MILLIS`].
    /// Minutes are not capped at two digits.
    pub fn from_seconds(time: f64) -> Self {
        let millis = total_millis(time);
        Self {
            minutes: millis / MILLIS_PER_MINUTE,
            seconds: (millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND,
            centiseconds: (millis % MILLIS_PER_SECOND) / MILLIS_PER_CENTISECOND,
        }
    }

    pub fn render(&self, format: TimeFormat) -> String {
        match format {
            TimeFormat::MinutesSecondsCentiseconds => format!(
                "{:02}:{:02}:{:02}",
                self.minutes, self.seconds, self.centiseconds
            ),
            TimeFormat::SecondsCentiseconds => {
                format!("{:02}:{:02}", self.seconds, self.centiseconds)
            }
        }
    }
}

fn total_millis(time: f64) -> u64 {
    let millis = (time.max(0.0) * 1000.0).round();
    if !millis.is_finite() || millis >= MAX_DISPLAY_MILLIS as f64 {
        MAX_DISPLAY_MILLIS
    } else {
        millis as u64
    }
}

/// Format a cursor position for display.
///
/// Accepts an `f64` or an `Option<f64>`; `None` and NaN are rejected with
/// [`ControlsError::InvalidTime`]. Infinite and extreme values never fail.
/// The minutes field widens past two digits from 100 minutes on.
///
/// ```
/// use scrubline_core::{format_time, TimeFormat};
///
/// assert_eq!(format_time(65.5, TimeFormat::MinutesSecondsCentiseconds).unwrap(), "01:05:50");
/// assert_eq!(format_time(61.5, TimeFormat::SecondsCentiseconds).unwrap(), "01:50");
/// ```
pub fn format_time(time: impl Into<Option<f64>>, format: TimeFormat) -> Result<String> {
    match time.into() {
        Some(time) if !time.is_nan() => Ok(TimeParts::from_seconds(time).render(format)),
        _ => Err(ControlsError::invalid_time("time")),
    }
}

/// One-line description of a track, e.g. `"2 tracks, 00:10:00"`.
pub fn format_track_summary(info: &TrackInfo, format: TimeFormat) -> String {
    let noun = if info.sub_track_count == 1 {
        "track"
    } else {
        "tracks"
    };
    // TrackInfo durations are finite and non-negative.
    let duration = TimeParts::from_seconds(info.duration).render(format);
    format!("{} {}, {}", info.sub_track_count, noun, duration)
}

/// Cursor time for a slider percentage. The `max(0, ..)` absorbs float drift
/// that would otherwise leave a negligibly negative cursor.
#[inline]
pub fn time_at_percentage(percentage: f64, duration: f64) -> f64 {
    ((percentage / 100.0) * duration).max(0.0)
}

/// Slider position (0..=100) for a cursor time, using the millisecond-rounded
/// cursor so the slider and the label agree.
#[inline]
pub fn percentage_of(time: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !time.is_finite() {
        return 0.0;
    }
    let rounded = (time * 1000.0).round() / 1000.0;
    ((rounded / duration) * 100.0).clamp(0.0, 100.0)
}
