//! Scrubline Core (engine-agnostic playback controls)
//!
//! A playback controller for animation clips that backs a scrubber-style UI:
//! play/pause/stop, time and percentage seeking, multi-clip selection and a
//! continuously updated time display. The animation engine is reached through
//! the traits in [`engine`]; [`memory`] provides a headless implementation.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod event;
pub mod format;
pub mod memory;
pub mod registry;
pub mod view;

// Re-exports for consumers (hosts and engine adapters)
pub use config::{AttachOptions, ControlsConfig, TimeValue};
pub use controller::{PlaybackController, PlaybackState};
pub use engine::{
    ActionId, AnimationMixer, AnimationSubject, Clip, Clock, ManualClock, SystemClock,
};
pub use error::ControlsError;
pub use event::{
    CollectingEventListener, ControlEvent, DispatchReport, EventBus, EventListener, EventPayload,
    EventType, ListenerId, LoggingEventListener, SelectionChange,
};
pub use format::{
    format_time, format_track_summary, percentage_of, time_at_percentage, TimeFormat, TimeParts,
};
pub use memory::{ClipMixer, ClipSet, ClipSpec, LoopMode};
pub use registry::{TrackInfo, TrackRegistry};
pub use view::{ControlsView, PlayIcon, TrackSelectorView};

/// Result type for control operations
pub type Result<T> = core::result::Result<T, ControlsError>;
