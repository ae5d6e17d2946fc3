//! Boundary traits for the animation engine and the frame clock.
//!
//! The controls never compute poses. They talk to an engine through three seams:
//! a [`Clip`] describes one animation resource, an [`AnimationSubject`] is the
//! renderable entity that owns clips, and an [`AnimationMixer`] (created per
//! attachment) owns the per-clip actions and advances them each frame.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Opaque handle to an action owned by a mixer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u32);

/// Metadata of one animation clip.
pub trait Clip {
    /// Display name, if the asset carries one.
    fn name(&self) -> Option<&str>;
    /// Duration in seconds.
    fn duration(&self) -> f64;
    /// Number of keyframe tracks inside the clip.
    fn sub_track_count(&self) -> usize;
    /// Stable identifier, if the asset carries one.
    fn uuid(&self) -> Option<&str>;
}

/// An externally owned entity with animation capability.
///
/// The controller holds the subject through an `Rc` shared with the host and
/// never drives its lifecycle.
pub trait AnimationSubject {
    type Mixer: AnimationMixer;

    /// Clips in asset order. `None` marks a clip handle that could not be
    /// resolved; cataloguing such a subject fails.
    fn clips(&self) -> Vec<Option<&dyn Clip>>;

    /// Create the mixer that will drive this subject's actions.
    fn create_mixer(&self) -> Self::Mixer;
}

/// Engine-side owner of per-clip actions.
pub trait AnimationMixer {
    /// Action binding `clip_index` to the subject. Repeated calls for the same
    /// clip return the same action.
    fn clip_action(&mut self, clip_index: usize) -> ActionId;

    fn play(&mut self, action: ActionId);
    fn stop(&mut self, action: ActionId);
    fn is_running(&self, action: ActionId) -> bool;

    fn time(&self, action: ActionId) -> f64;
    fn set_time(&mut self, action: ActionId, time: f64);

    fn is_paused(&self, action: ActionId) -> bool;
    fn set_paused(&mut self, action: ActionId, paused: bool);

    /// Advance every running action by `delta_seconds`.
    fn update(&mut self, delta_seconds: f64);
}

/// Source of elapsed frame time.
pub trait Clock {
    /// Seconds elapsed since the previous call.
    fn delta(&mut self) -> f64;
}

/// Wall clock. The first call measures from construction.
#[derive(Debug)]
pub struct SystemClock {
    last: instant::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: instant::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn delta(&mut self) -> f64 {
        let now = instant::Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f64()
    }
}

/// Deterministic clock fed with explicit deltas, for headless hosts and tests.
///
/// Clones share the same queue, so a host can keep one handle while the
/// controller owns another. Each call to [`Clock::delta`] drains the queue.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    pending: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `seconds` for the next read.
    pub fn advance(&self, seconds: f64) {
        self.pending.set(self.pending.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn delta(&mut self) -> f64 {
        self.pending.replace(0.0)
    }
}
