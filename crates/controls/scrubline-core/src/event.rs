//! Event bus for playback notifications

use std::panic::{self, AssertUnwindSafe};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::registry::TrackInfo;

/// Types of control events
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum EventType {
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback stopped and rewound
    Stop,
    /// A subject was attached
    MeshAttached,
    /// The subject was detached
    MeshDetached,
    /// Slider scrubbed to a percentage
    ChangePercentage,
    /// Cursor moved by a seek
    ChangeTime,
    /// A track was selected (including the first selection)
    AnimationSelected,
    /// The selection moved to a different track
    AnimationTrackChanged,
    /// Custom user-defined event
    Custom(String),
}

impl EventType {
    /// Get the name of this event type
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Self::Play => "PLAY",
            Self::Pause => "PAUSE",
            Self::Stop => "STOP",
            Self::MeshAttached => "MESH_ATTACHED",
            Self::MeshDetached => "MESH_DETACHED",
            Self::ChangePercentage => "CHANGE_PERCENTAGE",
            Self::ChangeTime => "CHANGE_TIME",
            Self::AnimationSelected => "ANIMATION_SELECTED",
            Self::AnimationTrackChanged => "ANIMATION_TRACK_CHANGED",
            Self::Custom(name) => name,
        }
    }

    /// Check if this event reflects a play-state transition
    #[inline]
    pub fn is_playback_event(&self) -> bool {
        matches!(self, Self::Play | Self::Pause | Self::Stop)
    }

    /// Check if this event reflects a cursor move
    #[inline]
    pub fn is_seek_event(&self) -> bool {
        matches!(self, Self::ChangePercentage | Self::ChangeTime)
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "PLAY" => Self::Play,
            "PAUSE" => Self::Pause,
            "STOP" => Self::Stop,
            "MESH_ATTACHED" => Self::MeshAttached,
            "MESH_DETACHED" => Self::MeshDetached,
            "CHANGE_PERCENTAGE" => Self::ChangePercentage,
            "CHANGE_TIME" => Self::ChangeTime,
            "ANIMATION_SELECTED" => Self::AnimationSelected,
            "ANIMATION_TRACK_CHANGED" => Self::AnimationTrackChanged,
            custom => Self::Custom(custom.to_string()),
        }
    }
}

/// Selection details carried by `AnimationSelected` and `AnimationTrackChanged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionChange {
    pub animation_info: TrackInfo,
    /// `None` when nothing was selected before.
    pub previous_index: Option<usize>,
    pub current_index: usize,
}

/// Data attached to an event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum EventPayload {
    #[default]
    None,
    /// Seconds for `ChangeTime`, percent for `ChangePercentage`
    Value(f64),
    Text(String),
    Selection(SelectionChange),
}

impl EventPayload {
    #[inline]
    pub fn as_value(&self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_selection(&self) -> Option<&SelectionChange> {
        match self {
            Self::Selection(selection) => Some(selection),
            _ => None,
        }
    }
}

/// An emitted event with its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub event_type: EventType,
    pub payload: EventPayload,
}

impl ControlEvent {
    pub fn new(event_type: EventType, payload: EventPayload) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Event listener trait for handling control events
pub trait EventListener {
    /// Handle a control event
    fn on_event(&mut self, event: &ControlEvent);

    /// Get the event types this listener is interested in
    fn interested_events(&self) -> Vec<EventType> {
        // Default: interested in all events
        vec![]
    }

    /// Check if this listener is interested in a specific event type
    fn is_interested_in(&self, event_type: &EventType) -> bool {
        let interested = self.interested_events();
        interested.is_empty() || interested.contains(event_type)
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&EventPayload)>;

/// Outcome of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners that ran to completion
    pub delivered: usize,
    /// Listeners that panicked; their failure did not stop the others
    pub failed: usize,
}

/// Synchronous publish/subscribe bus.
///
/// Callbacks registered with [`EventBus::on`] run first, in registration
/// order, followed by wildcard [`EventListener`]s. Every invocation is isolated:
/// a listener that panics is logged and skipped, and dispatch continues.
#[derive(Default)]
pub struct EventBus {
    callbacks: HashMap<EventType, Vec<(ListenerId, Callback)>>,
    listeners: Vec<Box<dyn EventListener>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `event_type`.
    pub fn on<F>(&mut self, event_type: EventType, callback: F) -> ListenerId
    where
        F: FnMut(&EventPayload) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.callbacks
            .entry(event_type)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        for callbacks in self.callbacks.values_mut() {
            if let Some(pos) = callbacks.iter().position(|(cb_id, _)| *cb_id == id) {
                drop(callbacks.remove(pos));
                return true;
            }
        }
        false
    }

    /// Add a listener that receives every event it is interested in.
    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    /// Remove all callbacks and listeners
    pub fn clear_listeners(&mut self) {
        self.callbacks.clear();
        self.listeners.clear();
    }

    /// Deliver an event to every interested callback and listener.
    pub fn dispatch(&mut self, event_type: EventType, payload: EventPayload) -> DispatchReport {
        let mut report = DispatchReport::default();

        if let Some(callbacks) = self.callbacks.get_mut(&event_type) {
            for (_, callback) in callbacks.iter_mut() {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(&payload)));
                record(&mut report, outcome.is_ok(), &event_type);
            }
        }

        if !self.listeners.is_empty() {
            let event = ControlEvent::new(event_type, payload);
            for listener in self.listeners.iter_mut() {
                if !listener.is_interested_in(&event.event_type) {
                    continue;
                }
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
                record(&mut report, outcome.is_ok(), &event.event_type);
            }
        }

        report
    }

    /// Get the number of registered callbacks and listeners
    pub fn listener_count(&self) -> usize {
        self.callbacks.values().map(Vec::len).sum::<usize>() + self.listeners.len()
    }
}

fn record(report: &mut DispatchReport, ok: bool, event_type: &EventType) {
    if ok {
        report.delivered += 1;
    } else {
        report.failed += 1;
        log::warn!("listener for {} panicked; continuing dispatch", event_type.name());
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Listener that logs events
pub struct LoggingEventListener {
    interested_events: Vec<EventType>,
}

impl LoggingEventListener {
    /// Create a new logging event listener
    pub fn new() -> Self {
        Self {
            interested_events: vec![],
        }
    }

    /// Create a logging listener for specific event types
    pub fn for_events(events: Vec<EventType>) -> Self {
        Self {
            interested_events: events,
        }
    }
}

impl Default for LoggingEventListener {
    fn default() -> Self {
        Self::new()
    }
}

impl EventListener for LoggingEventListener {
    fn on_event(&mut self, event: &ControlEvent) {
        log::info!("{}: {:?}", event.event_type.name(), event.payload);
    }

    fn interested_events(&self) -> Vec<EventType> {
        self.interested_events.clone()
    }
}

/// Listener that collects events for testing.
///
/// Clones share storage, so one clone can be handed to the bus while another
/// is kept for assertions.
#[derive(Clone, Default)]
pub struct CollectingEventListener {
    events: std::rc::Rc<std::cell::RefCell<Vec<ControlEvent>>>,
    interested_events: Vec<EventType>,
}

impl CollectingEventListener {
    /// Create a new collecting event listener
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collecting listener for specific event types
    pub fn for_events(events: Vec<EventType>) -> Self {
        Self {
            events: Default::default(),
            interested_events: events,
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<ControlEvent> {
        self.events.borrow().clone()
    }

    /// Names of collected events, in order
    pub fn names(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|e| e.event_type.name().to_string())
            .collect()
    }

    /// Get the number of collected events
    pub fn event_count(&self) -> usize {
        self.events.borrow().len()
    }

    /// Clear collected events
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &EventType) -> Vec<ControlEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| &e.event_type == event_type)
            .cloned()
            .collect()
    }
}

impl EventListener for CollectingEventListener {
    fn on_event(&mut self, event: &ControlEvent) {
        self.events.borrow_mut().push(event.clone());
    }

    fn interested_events(&self) -> Vec<EventType> {
        self.interested_events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn logging_listener_filters_by_interest() {
        let everything = LoggingEventListener::new();
        assert!(everything.is_interested_in(&EventType::ChangeTime));

        let playback = LoggingEventListener::for_events(vec![EventType::Play, EventType::Stop]);
        assert!(playback.is_interested_in(&EventType::Stop));
        assert!(!playback.is_interested_in(&EventType::ChangeTime));

        let mut bus = EventBus::new();
        bus.add_listener(Box::new(playback));
        assert_eq!(bus.dispatch(EventType::Play, EventPayload::None).delivered, 1);
        assert_eq!(bus.dispatch(EventType::Pause, EventPayload::None).delivered, 0);
    }

    #[test]
    fn clear_listeners_removes_callbacks_and_listeners() {
        let mut bus = EventBus::new();
        bus.on(EventType::Play, |_| {});
        bus.add_listener(Box::new(LoggingEventListener::default()));
        assert_eq!(bus.listener_count(), 2);

        bus.clear_listeners();
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(bus.dispatch(EventType::Play, EventPayload::None), DispatchReport::default());
    }

    #[test]
    fn test_event_type_classification() {
        assert!(EventType::Play.is_playback_event());
        assert!(!EventType::Play.is_seek_event());
        assert!(EventType::ChangeTime.is_seek_event());
        assert!(!EventType::MeshAttached.is_playback_event());
    }

    #[test]
    fn event_names_round_trip() {
        for event in [
            EventType::Play,
            EventType::MeshDetached,
            EventType::AnimationTrackChanged,
            EventType::Custom("custom-event".into()),
        ] {
            assert_eq!(EventType::from(event.name()), event);
        }
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            bus.on(EventType::Play, move |_| seen.borrow_mut().push(tag));
        }

        let report = bus.dispatch(EventType::Play, EventPayload::None);
        assert_eq!(report.delivered, 3);
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn panicking_callback_does_not_stop_dispatch() {
        let mut bus = EventBus::new();
        let reached = Rc::new(RefCell::new(false));
        bus.on(EventType::Stop, |_| panic!("Callback error"));
        {
            let reached = reached.clone();
            bus.on(EventType::Stop, move |_| *reached.borrow_mut() = true);
        }

        let report = bus.dispatch(EventType::Stop, EventPayload::None);
        assert_eq!(
            report,
            DispatchReport {
                delivered: 1,
                failed: 1
            }
        );
        assert!(*reached.borrow());
    }

    #[test]
    fn dispatch_without_listeners_is_noop() {
        let mut bus = EventBus::new();
        let calls = Rc::new(RefCell::new(0));
        {
            let calls = calls.clone();
            bus.on(EventType::Play, move |_| *calls.borrow_mut() += 1);
        }
        let report = bus.dispatch(EventType::Custom("non-existent".into()), EventPayload::None);
        assert_eq!(report, DispatchReport::default());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn off_removes_callback() {
        let mut bus = EventBus::new();
        let id = bus.on(EventType::Pause, |_| {});
        assert_eq!(bus.listener_count(), 1);
        assert!(bus.off(id));
        assert!(!bus.off(id));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_event_listener_filtering() {
        let mut bus = EventBus::new();
        let collector = CollectingEventListener::for_events(vec![EventType::ChangeTime]);
        bus.add_listener(Box::new(collector.clone()));

        bus.dispatch(EventType::Play, EventPayload::None);
        bus.dispatch(EventType::ChangeTime, EventPayload::Value(5.5));

        assert_eq!(collector.event_count(), 1);
        assert_eq!(collector.events()[0].payload.as_value(), Some(5.5));
    }
}
