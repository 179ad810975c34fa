//! Track types for the timeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::Clip;

fn default_volume() -> f64 {
    1.0
}

/// Kind of track.
///
/// Defaults to `Video` so legacy project data without a kind field keeps
/// loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    #[default]
    Video,
    Audio,
}

/// An ordered lane of clips of one kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: Uuid,
    /// Track name
    pub name: String,
    /// Ordinal index; track 0 is the primary video track
    pub index: usize,
    /// Track kind
    #[serde(default)]
    pub kind: TrackKind,
    /// Clips on this track, in timeline order
    pub clips: Vec<Clip>,
    /// Track volume, applied to every clip on the track
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Mutes every clip on the track
    #[serde(default)]
    pub muted: bool,
}

impl Track {
    /// Create a new video track.
    pub fn new_video(name: impl Into<String>, index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            index,
            kind: TrackKind::Video,
            clips: Vec::new(),
            volume: 1.0,
            muted: false,
        }
    }

    /// Create a new audio track.
    pub fn new_audio(name: impl Into<String>, index: usize) -> Self {
        Self {
            kind: TrackKind::Audio,
            ..Self::new_video(name, index)
        }
    }

    /// Add a clip, keeping the list ordered by start time.
    pub fn add_clip(&mut self, mut clip: Clip) {
        clip.track_index = self.index;
        let at = self
            .clips
            .partition_point(|c| c.start_time <= clip.start_time);
        self.clips.insert(at, clip);
    }

    /// The clip active at `position`, if any.
    ///
    /// At most one for well-formed data; on overlapping clips the first
    /// match wins and the rest are ignored.
    pub fn clip_at(&self, position: f64) -> Option<&Clip> {
        self.clips.iter().find(|c| c.contains(position))
    }

    /// Resolved gain for a clip on this track: clip volume × track volume,
    /// zero when either is muted.
    pub fn gain_for(&self, clip: &Clip) -> f64 {
        if self.muted || clip.muted {
            0.0
        } else {
            clip.volume * self.volume
        }
    }

    /// Timeline position where the last clip on this track ends.
    pub fn end(&self) -> f64 {
        self.clips.iter().map(|c| c.end_time).fold(0.0, f64::max)
    }
}
