//! View model for a bound control surface.
//!
//! The controller keeps this in sync; a renderer only reads it. Widget
//! construction and styling live with the host.

use serde::{Deserialize, Serialize};

use crate::format::{format_track_summary, TimeFormat};
use crate::registry::TrackInfo;

pub const NO_ANIMATIONS_TEXT: &str = "No animations";

/// Icon shown on the play button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayIcon {
    #[default]
    Play,
    Pause,
    Stop,
}

impl PlayIcon {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
        }
    }
}

/// Drop-down listing the attached subject's tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSelectorView {
    /// One label per track, in registry order.
    pub options: Vec<String>,
    pub selected: Option<usize>,
    /// Only enabled when there is something to choose between.
    pub enabled: bool,
}

impl TrackSelectorView {
    fn populate(&mut self, tracks: &[TrackInfo], selected: Option<usize>) {
        self.options = tracks.iter().map(|track| track.name.clone()).collect();
        self.selected = selected;
        self.enabled = tracks.len() > 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsView {
    pub time_text: String,
    /// Slider position, 0..=100.
    pub slider_value: f64,
    pub play_icon: PlayIcon,
    pub selector: Option<TrackSelectorView>,
    pub track_info_text: Option<String>,
}

impl ControlsView {
    pub fn new(format: TimeFormat, with_selector: bool) -> Self {
        Self {
            time_text: placeholder_text(format),
            slider_value: 0.0,
            play_icon: PlayIcon::Play,
            selector: with_selector.then(TrackSelectorView::default),
            track_info_text: with_selector.then(|| NO_ANIMATIONS_TEXT.to_string()),
        }
    }

    /// Back to the unbound appearance.
    pub fn reset(&mut self, format: TimeFormat) {
        self.time_text = placeholder_text(format);
        self.slider_value = 0.0;
        self.play_icon = PlayIcon::Play;
        if let Some(selector) = self.selector.as_mut() {
            *selector = TrackSelectorView::default();
            self.track_info_text = Some(NO_ANIMATIONS_TEXT.to_string());
        }
    }

    /// Refresh the selector and the info line from the registry contents.
    pub fn show_tracks(
        &mut self,
        tracks: &[TrackInfo],
        current: Option<&TrackInfo>,
        format: TimeFormat,
    ) {
        let Some(selector) = self.selector.as_mut() else {
            return;
        };
        selector.populate(tracks, current.map(|track| track.index));
        self.track_info_text = Some(track_info_text(current, format));
    }
}

/// `"-- / --"` text shown while nothing is bound.
pub fn placeholder_text(format: TimeFormat) -> String {
    let placeholder = format.placeholder();
    format!("{placeholder} / {placeholder}")
}

/// Info line for the selected track.
pub fn track_info_text(current: Option<&TrackInfo>, format: TimeFormat) -> String {
    match current {
        Some(track) => format_track_summary(track, format),
        None => NO_ANIMATIONS_TEXT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MM: TimeFormat = TimeFormat::MinutesSecondsCentiseconds;

    fn track(index: usize, name: &str) -> TrackInfo {
        TrackInfo {
            index,
            name: name.to_string(),
            duration: 10.0,
            sub_track_count: 2,
            uuid: format!("animation-{index}"),
        }
    }

    #[test]
    fn new_view_shows_placeholders() {
        let view = ControlsView::new(MM, true);
        assert_eq!(view.time_text, "--:--:-- / --:--:--");
        assert_eq!(view.slider_value, 0.0);
        assert_eq!(view.play_icon, PlayIcon::Play);
        assert_eq!(view.track_info_text.as_deref(), Some("No animations"));

        let short = ControlsView::new(TimeFormat::SecondsCentiseconds, false);
        assert_eq!(short.time_text, "--:-- / --:--");
        assert!(short.selector.is_none());
        assert!(short.track_info_text.is_none());
    }

    #[test]
    fn show_tracks_enables_selector_for_multiple_tracks() {
        let tracks = vec![track(0, "Walk"), track(1, "Run")];
        let mut view = ControlsView::new(MM, true);
        view.show_tracks(&tracks, tracks.get(1), MM);

        let selector = view.selector.as_ref().unwrap();
        assert_eq!(selector.options, vec!["Walk", "Run"]);
        assert_eq!(selector.selected, Some(1));
        assert!(selector.enabled);
        assert_eq!(view.track_info_text.as_deref(), Some("2 tracks, 00:10:00"));

        view.show_tracks(&tracks[..1], tracks.first(), MM);
        assert!(!view.selector.as_ref().unwrap().enabled);
    }

    #[test]
    fn reset_clears_selection() {
        let tracks = vec![track(0, "Walk")];
        let mut view = ControlsView::new(MM, true);
        view.show_tracks(&tracks, tracks.first(), MM);
        view.slider_value = 40.0;
        view.play_icon = PlayIcon::Pause;

        view.reset(MM);
        assert_eq!(view, ControlsView::new(MM, true));
    }
}
