//! Catalogue of the attached subject's clips and the current selection.

use serde::{Deserialize, Serialize};

use crate::engine::Clip;
use crate::error::ControlsError;
use crate::Result;

/// Display metadata for one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Position in the subject's clip list.
    pub index: usize,
    pub name: String,
    /// Duration in seconds; always finite and non-negative.
    pub duration: f64,
    /// Keyframe tracks inside the clip.
    pub sub_track_count: usize,
    pub uuid: String,
}

impl TrackInfo {
    /// Extract metadata from a clip, filling in a generated name and uuid when
    /// the asset lacks them. A malformed duration is recorded as zero.
    pub fn from_clip(clip: &dyn Clip, index: usize) -> Self {
        let name = match clip.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Animation {}", index + 1),
        };
        let uuid = match clip.uuid() {
            Some(uuid) if !uuid.is_empty() => uuid.to_string(),
            _ => format!("animation-{index}"),
        };
        let duration = clip.duration();
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };

        Self {
            index,
            name,
            duration,
            sub_track_count: clip.sub_track_count(),
            uuid,
        }
    }
}

/// Ordered track list plus the selected index.
///
/// Rebuilt wholesale on every attach and cleared on detach; never patched.
#[derive(Debug, Default, Clone)]
pub struct TrackRegistry {
    tracks: Vec<TrackInfo>,
    current: Option<usize>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalogue with one entry per clip, in order, and clear the
    /// selection. Fails without touching the registry if any clip is missing.
    pub fn rebuild<'a, I>(&mut self, clips: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<&'a dyn Clip>>,
    {
        let tracks = clips
            .into_iter()
            .enumerate()
            .map(|(index, clip)| {
                clip.map(|clip| TrackInfo::from_clip(clip, index))
                    .ok_or(ControlsError::MissingClip { index })
            })
            .collect::<Result<Vec<_>>>()?;

        self.tracks = tracks;
        self.current = None;
        Ok(())
    }

    /// Mark `index` as current. Pure bookkeeping; playback is untouched.
    pub fn select(&mut self, index: usize) -> Result<&TrackInfo> {
        if index >= self.tracks.len() {
            return Err(ControlsError::IndexOutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        self.current = Some(index);
        Ok(&self.tracks[index])
    }

    /// First track with this name, in list order.
    #[inline]
    pub fn find_by_name(&self, name: &str) -> Option<&TrackInfo> {
        self.tracks.iter().find(|track| track.name == name)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TrackInfo> {
        self.tracks.get(index)
    }

    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    #[inline]
    pub fn current(&self) -> Option<&TrackInfo> {
        self.current.and_then(|index| self.tracks.get(index))
    }

    #[inline]
    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    /// Owned copy of the catalogue; callers may mutate it freely.
    pub fn to_vec(&self) -> Vec<TrackInfo> {
        self.tracks.clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn has_multiple(&self) -> bool {
        self.tracks.len() > 1
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
    }
}
