//! Headless engine: clip metadata plus a mixer that advances action time.
//!
//! Useful for hosts without a renderer (servers, CLIs, previews) and as the
//! reference implementation of the engine traits in tests. Clip sets
//! deserialize from JSON, e.g. `{"clips": [{"name": "Walk", "duration": 10.0,
//! "tracks": 2}]}`; a `null` entry models an unresolved clip handle.

use serde::{Deserialize, Serialize};

use crate::engine::{ActionId, AnimationMixer, AnimationSubject, Clip};

/// Loop behaviour applied when an action reaches the end of its clip.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoopMode {
    /// Clamp at the end and stop running.
    Once,
    /// Wrap around to the start.
    #[default]
    Loop,
}

/// Clip metadata record.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ClipSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration: f64,
    /// Number of keyframe tracks
    #[serde(default)]
    pub tracks: usize,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl ClipSpec {
    pub fn new(name: impl Into<String>, duration: f64, tracks: usize) -> Self {
        Self {
            name: Some(name.into()),
            duration,
            tracks,
            uuid: None,
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }
}

impl Clip for ClipSpec {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn sub_track_count(&self) -> usize {
        self.tracks
    }

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }
}

/// A subject described only by its clips.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ClipSet {
    #[serde(default)]
    pub clips: Vec<Option<ClipSpec>>,
    #[serde(default)]
    pub loop_mode: LoopMode,
}

impl ClipSet {
    pub fn new(clips: impl IntoIterator<Item = ClipSpec>) -> Self {
        Self {
            clips: clips.into_iter().map(Some).collect(),
            loop_mode: LoopMode::default(),
        }
    }

    pub fn with_loop_mode(mut self, mode: LoopMode) -> Self {
        self.loop_mode = mode;
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl AnimationSubject for ClipSet {
    type Mixer = ClipMixer;

    fn clips(&self) -> Vec<Option<&dyn Clip>> {
        self.clips
            .iter()
            .map(|clip| clip.as_ref().map(|clip| clip as &dyn Clip))
            .collect()
    }

    fn create_mixer(&self) -> ClipMixer {
        let durations = self
            .clips
            .iter()
            .map(|clip| clip.as_ref().map_or(0.0, |clip| clip.duration.max(0.0)))
            .collect();
        ClipMixer::new(durations, self.loop_mode)
    }
}

/// State of one action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionState {
    pub clip_index: usize,
    pub duration: f64,
    pub time: f64,
    pub running: bool,
    pub paused: bool,
    /// Number of `play` calls, for diagnostics
    pub play_calls: u32,
    /// Number of `stop` calls, for diagnostics
    pub stop_calls: u32,
}

impl ActionState {
    fn new(clip_index: usize, duration: f64) -> Self {
        Self {
            clip_index,
            duration,
            time: 0.0,
            running: false,
            paused: false,
            play_calls: 0,
            stop_calls: 0,
        }
    }

    fn step(&mut self, dt: f64, mode: LoopMode) {
        if !self.running || self.paused {
            return;
        }
        self.time += dt;
        if self.duration <= 0.0 {
            self.time = 0.0;
            return;
        }
        match mode {
            LoopMode::Once => {
                if self.time >= self.duration {
                    self.time = self.duration;
                    self.running = false;
                }
            }
            LoopMode::Loop => {
                if self.time >= self.duration || self.time < 0.0 {
                    self.time = self.time.rem_euclid(self.duration);
                }
            }
        }
    }
}

/// Mixer owning one action per clip.
#[derive(Clone, Debug)]
pub struct ClipMixer {
    durations: Vec<f64>,
    loop_mode: LoopMode,
    actions: Vec<ActionState>,
    total_updates: u64,
}

impl ClipMixer {
    pub fn new(durations: Vec<f64>, loop_mode: LoopMode) -> Self {
        Self {
            durations,
            loop_mode,
            actions: Vec::new(),
            total_updates: 0,
        }
    }

    /// Inspect an action.
    #[inline]
    pub fn action(&self, id: ActionId) -> Option<&ActionState> {
        self.actions.get(id.0 as usize)
    }

    #[inline]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Number of `update` calls received.
    #[inline]
    pub fn total_updates(&self) -> u64 {
        self.total_updates
    }

    fn action_mut(&mut self, id: ActionId) -> Option<&mut ActionState> {
        self.actions.get_mut(id.0 as usize)
    }
}

impl AnimationMixer for ClipMixer {
    fn clip_action(&mut self, clip_index: usize) -> ActionId {
        if let Some(pos) = self.actions.iter().position(|a| a.clip_index == clip_index) {
            return ActionId(pos as u32);
        }
        let duration = self.durations.get(clip_index).copied().unwrap_or(0.0);
        self.actions.push(ActionState::new(clip_index, duration));
        ActionId((self.actions.len() - 1) as u32)
    }

    fn play(&mut self, action: ActionId) {
        if let Some(state) = self.action_mut(action) {
            state.running = true;
            state.play_calls += 1;
        }
    }

    fn stop(&mut self, action: ActionId) {
        if let Some(state) = self.action_mut(action) {
            state.running = false;
            state.paused = false;
            state.time = 0.0;
            state.stop_calls += 1;
        }
    }

    fn is_running(&self, action: ActionId) -> bool {
        self.action(action)
            .map_or(false, |state| state.running && !state.paused)
    }

    fn time(&self, action: ActionId) -> f64 {
        self.action(action).map_or(0.0, |state| state.time)
    }

    fn set_time(&mut self, action: ActionId, time: f64) {
        if let Some(state) = self.action_mut(action) {
            state.time = time;
        }
    }

    fn is_paused(&self, action: ActionId) -> bool {
        self.action(action).map_or(false, |state| state.paused)
    }

    fn set_paused(&mut self, action: ActionId, paused: bool) {
        if let Some(state) = self.action_mut(action) {
            state.paused = paused;
        }
    }

    fn update(&mut self, delta_seconds: f64) {
        self.total_updates += 1;
        let mode = self.loop_mode;
        for state in self.actions.iter_mut() {
            state.step(delta_seconds, mode);
        }
    }
}
