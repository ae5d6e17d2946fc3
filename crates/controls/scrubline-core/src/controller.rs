//! Playback state machine.
//!
//! A [`PlaybackController`] binds to one subject at a time, catalogues its
//! clips, drives the selected clip's action through the subject's mixer and
//! keeps the time display, slider and notifications consistent with it.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::{AttachOptions, ControlsConfig, TimeValue};
use crate::engine::{ActionId, AnimationMixer, AnimationSubject, Clock, SystemClock};
use crate::error::ControlsError;
use crate::event::{
    DispatchReport, EventBus, EventListener, EventPayload, EventType, ListenerId, SelectionChange,
};
use crate::format::{format_time, percentage_of, time_at_percentage, TimeParts};
use crate::registry::{TrackInfo, TrackRegistry};
use crate::view::{placeholder_text, ControlsView, PlayIcon};
use crate::Result;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Paused,
    Playing,
}

impl PlaybackState {
    /// Get the state name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Paused => "paused",
            Self::Playing => "playing",
        }
    }
}

/// Subject binding. `action` is set iff a track is selected.
struct Attachment<S: AnimationSubject> {
    subject: Rc<S>,
    mixer: S::Mixer,
    action: Option<ActionId>,
}

impl<S: AnimationSubject> Attachment<S> {
    /// Stop the bound action and forget it.
    fn release_action(&mut self) {
        if let Some(action) = self.action.take() {
            self.mixer.stop(action);
        }
    }
}

pub struct PlaybackController<S: AnimationSubject> {
    config: ControlsConfig,
    state: PlaybackState,
    attachment: Option<Attachment<S>>,
    registry: TrackRegistry,
    duration_display: Option<String>,
    events: EventBus,
    view: Option<ControlsView>,
    clock: Box<dyn Clock>,
    // Playback status captured when a scrub gesture began.
    resume_after_scrub: Option<bool>,
}

impl<S: AnimationSubject> PlaybackController<S> {
    pub fn new(config: ControlsConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock::new()))
    }

    pub fn with_clock(config: ControlsConfig, clock: Box<dyn Clock>) -> Self {
        let view = config
            .init_ui_controls
            .then(|| ControlsView::new(config.output_format, config.enable_track_selector));
        Self {
            config,
            state: PlaybackState::Stopped,
            attachment: None,
            registry: TrackRegistry::new(),
            duration_display: None,
            events: EventBus::new(),
            view,
            clock,
            resume_after_scrub: None,
        }
    }

    // ---- binding ----

    /// Bind `subject`, catalogue its clips and apply `options`.
    ///
    /// Everything that can fail is validated before any state changes, so a
    /// failed attach leaves the controller detached.
    pub fn attach(&mut self, subject: Rc<S>, options: AttachOptions) -> Result<()> {
        if let Some(current) = &self.attachment {
            return Err(ControlsError::AlreadyAttached {
                same_subject: Rc::ptr_eq(&current.subject, &subject),
            });
        }

        let mut registry = TrackRegistry::new();
        registry.rebuild(subject.clips())?;

        let initial = match options.track_index {
            Some(index) if index >= registry.len() => {
                return Err(ControlsError::IndexOutOfRange {
                    index,
                    len: registry.len(),
                })
            }
            Some(index) => Some(index),
            None => (self.config.auto_select_first_track && !registry.is_empty()).then_some(0),
        };
        let at_time = options.at_time.as_ref().map(TimeValue::seconds).transpose()?;

        log::debug!("attaching subject with {} tracks", registry.len());
        let mixer = subject.create_mixer();
        self.registry = registry;
        self.attachment = Some(Attachment {
            subject,
            mixer,
            action: None,
        });
        self.state = PlaybackState::Stopped;
        self.duration_display = None;

        match initial {
            Some(index) => {
                self.select_track(index)?;
            }
            None => self.sync_view(),
        }
        if let Some(time) = at_time {
            self.set_time(time)?;
        }
        if options.play {
            self.play();
        }

        self.emit(EventType::MeshAttached, EventPayload::None);
        Ok(())
    }

    /// Release the subject and return the controls to their unbound state.
    ///
    /// Always resets and emits `MeshDetached` then `Stop`, so hosts can use it
    /// to clear the surface. Returns the released subject, if there was one.
    pub fn detach(&mut self) -> Option<Rc<S>> {
        let released = self.attachment.take().map(|mut attachment| {
            attachment.release_action();
            attachment.subject
        });
        log::debug!("detaching subject (attached: {})", released.is_some());

        self.registry.clear();
        self.state = PlaybackState::Stopped;
        self.duration_display = None;
        self.resume_after_scrub = None;
        let format = self.config.output_format;
        if let Some(view) = self.view.as_mut() {
            view.reset(format);
        }

        self.emit(EventType::MeshDetached, EventPayload::None);
        self.emit(EventType::Stop, EventPayload::None);
        released
    }

    // ---- transport ----

    /// Start or resume playback of the bound track.
    pub fn play(&mut self) {
        let resumed = self.state != PlaybackState::Playing;
        let Some((attachment, action)) = self.bound_mut() else {
            return;
        };

        let mut changed = false;
        if resumed {
            attachment.mixer.set_paused(action, false);
        }
        if !attachment.mixer.is_running(action) {
            attachment.mixer.play(action);
            changed = true;
        }
        if resumed {
            self.state = PlaybackState::Playing;
            changed = true;
        }

        if changed {
            log::debug!("playback state -> {}", self.state.name());
            self.sync_view();
            self.emit(EventType::Play, EventPayload::None);
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some((attachment, action)) = self.bound_mut() else {
            return;
        };
        attachment.mixer.set_paused(action, true);
        self.state = PlaybackState::Paused;
        log::debug!("playback state -> {}", self.state.name());
        self.sync_view();
        self.emit(EventType::Pause, EventPayload::None);
    }

    /// Stop and rewind. Only acts while playing.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some((attachment, action)) = self.bound_mut() else {
            return;
        };
        attachment.mixer.stop(action);
        self.state = PlaybackState::Stopped;
        log::debug!("playback state -> {}", self.state.name());
        self.set_percentage(0.0);
        self.emit(EventType::Stop, EventPayload::None);
    }

    /// Play button: pause when playing, otherwise play.
    pub fn toggle_playback(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    // ---- seeking ----

    /// Move the cursor to `value` seconds; text is parsed. Negative values
    /// clamp to zero. A no-op while nothing is bound.
    pub fn set_time(&mut self, value: impl Into<TimeValue>) -> Result<()> {
        if self.bound_action().is_none() {
            return Ok(());
        }
        let seconds = value.into().seconds()?.max(0.0);
        let Some((attachment, action)) = self.bound_mut() else {
            return Ok(());
        };
        attachment.mixer.set_time(action, seconds);
        self.sync_view();
        self.emit(EventType::ChangeTime, EventPayload::Value(seconds));
        Ok(())
    }

    /// Move the cursor to `percentage` of the bound track's duration.
    pub fn set_percentage(&mut self, percentage: f64) {
        let duration = match self.registry.current() {
            Some(track) => track.duration,
            None => return,
        };
        let Some((attachment, action)) = self.bound_mut() else {
            return;
        };
        let time = time_at_percentage(percentage, duration);
        attachment.mixer.set_time(action, time);
        self.sync_view();
        self.emit(EventType::ChangeTime, EventPayload::Value(time));
    }

    /// Start of a slider drag: remember whether playback was running and pause.
    pub fn begin_scrub(&mut self) {
        self.resume_after_scrub = Some(self.is_playing());
        self.pause();
    }

    /// Slider moved to `percentage`.
    pub fn scrub_to(&mut self, percentage: f64) {
        self.set_percentage(percentage);
        self.emit(EventType::ChangePercentage, EventPayload::Value(percentage));
    }

    /// End of a slider drag: resume if playback was running when it began.
    pub fn end_scrub(&mut self) {
        if self.resume_after_scrub.take() == Some(true) {
            self.play();
        }
    }

    // ---- track selection ----

    /// Switch to track `index`, starting it from zero. Playback resumes on
    /// the new track if it was playing.
    pub fn select_track(&mut self, index: usize) -> Result<TrackInfo> {
        let len = self.registry.len();
        let Some(attachment) = self.attachment.as_mut() else {
            return Err(ControlsError::NoSubjectAttached);
        };
        if index >= len {
            return Err(ControlsError::IndexOutOfRange { index, len });
        }

        let was_playing = self.state == PlaybackState::Playing;
        let previous_index = self.registry.current_index();

        attachment.release_action();
        let info = self.registry.select(index)?.clone();
        let action = attachment.mixer.clip_action(index);
        attachment.mixer.set_time(action, 0.0);
        attachment.action = Some(action);

        self.state = PlaybackState::Stopped;
        self.duration_display =
            Some(TimeParts::from_seconds(info.duration).render(self.config.output_format));
        log::debug!("selected track {} '{}'", index, info.name);
        self.sync_view();

        if was_playing {
            self.play();
        }

        let change = SelectionChange {
            animation_info: info.clone(),
            previous_index,
            current_index: index,
        };
        self.emit(EventType::AnimationSelected, EventPayload::Selection(change.clone()));
        if previous_index.is_some_and(|previous| previous != index) {
            self.emit(EventType::AnimationTrackChanged, EventPayload::Selection(change));
        }
        Ok(info)
    }

    pub fn select_track_by_name(&mut self, name: &str) -> Result<TrackInfo> {
        if self.attachment.is_none() {
            return Err(ControlsError::NoSubjectAttached);
        }
        let index = self
            .registry
            .find_by_name(name)
            .map(|track| track.index)
            .ok_or_else(|| ControlsError::TrackNotFound {
                name: name.to_string(),
            })?;
        self.select_track(index)
    }

    /// Selector change handler. Input that is not an index is ignored.
    pub fn select_track_from_input(&mut self, text: &str) -> Result<Option<TrackInfo>> {
        match text.trim().parse::<usize>() {
            Ok(index) => self.select_track(index).map(Some),
            Err(_) => Ok(None),
        }
    }

    // ---- frame loop ----

    /// Advance the mixer by the clock's elapsed time.
    pub fn update(&mut self) {
        let elapsed = self.clock.delta();
        self.advance(elapsed);
    }

    /// Advance the mixer by `elapsed` seconds and refresh the display while
    /// playing.
    pub fn advance(&mut self, elapsed: f64) {
        if !elapsed.is_finite() {
            log::warn!("ignoring non-finite frame delta {elapsed}");
            return;
        }
        let Some(attachment) = self.attachment.as_mut() else {
            return;
        };
        log::trace!("advance {elapsed}");
        attachment.mixer.update(elapsed);
        if self.state == PlaybackState::Playing {
            self.sync_view();
        }
    }

    // ---- events ----

    pub fn on<F>(&mut self, event_type: EventType, callback: F) -> ListenerId
    where
        F: FnMut(&EventPayload) + 'static,
    {
        self.events.on(event_type, callback)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.events.add_listener(listener);
    }

    /// Deliver an arbitrary event to the controller's listeners.
    pub fn dispatch(&mut self, event_type: EventType, payload: EventPayload) -> DispatchReport {
        self.events.dispatch(event_type, payload)
    }

    // ---- queries ----

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// True whenever playback is not running, including when stopped.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state != PlaybackState::Playing
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state == PlaybackState::Stopped
    }

    pub fn attached_subject(&self) -> Option<&Rc<S>> {
        self.attachment.as_ref().map(|attachment| &attachment.subject)
    }

    /// Mixer created for the attached subject.
    pub fn mixer(&self) -> Option<&S::Mixer> {
        self.attachment.as_ref().map(|attachment| &attachment.mixer)
    }

    pub fn bound_action(&self) -> Option<ActionId> {
        self.attachment.as_ref().and_then(|attachment| attachment.action)
    }

    pub fn available_tracks(&self) -> &[TrackInfo] {
        self.registry.tracks()
    }

    /// Copy of the track list.
    pub fn animation_list(&self) -> Vec<TrackInfo> {
        self.registry.to_vec()
    }

    pub fn current_track_index(&self) -> Option<usize> {
        self.registry.current_index()
    }

    pub fn current_track(&self) -> Option<&TrackInfo> {
        self.registry.current()
    }

    pub fn track_by_index(&self, index: usize) -> Option<&TrackInfo> {
        self.registry.get(index)
    }

    pub fn track_by_name(&self, name: &str) -> Option<&TrackInfo> {
        self.registry.find_by_name(name)
    }

    pub fn has_multiple_tracks(&self) -> bool {
        self.registry.has_multiple()
    }

    pub fn is_track_selector_enabled(&self) -> bool {
        self.view
            .as_ref()
            .and_then(|view| view.selector.as_ref())
            .is_some_and(|selector| selector.enabled)
    }

    pub fn is_ui_controls_available(&self) -> bool {
        self.view.is_some()
    }

    /// Cursor of the bound action in seconds.
    pub fn current_time(&self) -> Option<f64> {
        let attachment = self.attachment.as_ref()?;
        attachment.action.map(|action| attachment.mixer.time(action))
    }

    /// Cursor as a slider position, 0..=100.
    pub fn current_percentage(&self) -> Option<f64> {
        let time = self.current_time()?;
        let duration = self.registry.current()?.duration;
        Some(percentage_of(time, duration))
    }

    /// Formatted duration of the bound track.
    pub fn duration_display(&self) -> Option<&str> {
        self.duration_display.as_deref()
    }

    /// `"cur / dur"`, or placeholders while nothing is bound.
    pub fn current_time_display(&self) -> String {
        let format = self.config.output_format;
        match (self.current_time(), self.duration_display.as_deref()) {
            (Some(time), Some(duration)) => match format_time(time, format) {
                Ok(current) => format!("{current} / {duration}"),
                Err(_) => placeholder_text(format),
            },
            _ => placeholder_text(format),
        }
    }

    pub fn view(&self) -> Option<&ControlsView> {
        self.view.as_ref()
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    // ---- internals ----

    fn bound_mut(&mut self) -> Option<(&mut Attachment<S>, ActionId)> {
        let attachment = self.attachment.as_mut()?;
        let action = attachment.action?;
        Some((attachment, action))
    }

    fn emit(&mut self, event_type: EventType, payload: EventPayload) {
        let report = self.events.dispatch(event_type, payload);
        if report.failed > 0 {
            log::debug!("{} listener(s) failed during dispatch", report.failed);
        }
    }

    /// Push controller state into the view.
    fn sync_view(&mut self) {
        if self.view.is_none() {
            return;
        }
        let time_text = self.current_time_display();
        let slider_value = self.current_percentage().unwrap_or(0.0);
        let play_icon = if self.is_playing() {
            PlayIcon::Pause
        } else {
            PlayIcon::Play
        };
        let format = self.config.output_format;
        let tracks = self.registry.tracks();
        let current = self.registry.current();

        if let Some(view) = self.view.as_mut() {
            view.time_text = time_text;
            view.slider_value = slider_value;
            view.play_icon = play_icon;
            view.show_tracks(tracks, current, format);
        }
    }
}

impl<S: AnimationSubject> Default for PlaybackController<S> {
    fn default() -> Self {
        Self::new(ControlsConfig::default())
    }
}
