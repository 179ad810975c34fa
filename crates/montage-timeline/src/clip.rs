//! Clip types for the timeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_volume() -> f64 {
    1.0
}

/// A trimmed reference to a source media file, placed at an absolute
/// timeline interval.
///
/// Clips are immutable value records: edits replace a clip wholesale.
/// `[start_time, end_time)` is half-open; `trim_start`/`trim_end` are
/// offsets into the source media's native duration defining the used
/// sub-range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: Uuid,
    /// Media registry reference
    pub media_id: Uuid,
    /// Index of the owning track
    pub track_index: usize,
    /// Timeline start in seconds (inclusive)
    pub start_time: f64,
    /// Timeline end in seconds (exclusive)
    pub end_time: f64,
    /// Seconds trimmed off the head of the source
    #[serde(default)]
    pub trim_start: f64,
    /// Seconds trimmed off the tail of the source
    #[serde(default)]
    pub trim_end: f64,
    /// Clip volume, multiplied with the track volume
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Mutes this clip only
    #[serde(default)]
    pub muted: bool,
    /// Fade-in duration in seconds
    #[serde(default)]
    pub fade_in: f64,
    /// Fade-out duration in seconds
    #[serde(default)]
    pub fade_out: f64,
}

impl Clip {
    /// Create an untrimmed clip covering `[start_time, end_time)`.
    pub fn new(media_id: Uuid, track_index: usize, start_time: f64, end_time: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            media_id,
            track_index,
            start_time,
            end_time,
            trim_start: 0.0,
            trim_end: 0.0,
            volume: 1.0,
            muted: false,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }

    /// Timeline span of the clip in seconds.
    pub fn span(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Half-open interval containment test.
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start_time && position < self.end_time
    }

    /// Map a timeline position onto the source media's own clock.
    ///
    /// Returns `trim_start + (position - start_time)` clamped to the usable
    /// source range `[trim_start, source_duration - trim_end]`.
    pub fn source_offset_at(&self, position: f64, source_duration: f64) -> f64 {
        let raw = self.trim_start + (position - self.start_time);
        raw.clamp(self.trim_start, (source_duration - self.trim_end).max(self.trim_start))
    }

    /// Source out point (seconds into the source where the used range ends).
    pub fn source_out(&self, source_duration: f64) -> f64 {
        (source_duration - self.trim_end).max(self.trim_start)
    }

    /// Check the trim invariant `span == source_duration - trim_start - trim_end`.
    ///
    /// Enforced by the editing layer; the engine may assume it and only uses
    /// this check to log suspect data.
    pub fn trim_consistent(&self, source_duration: f64) -> bool {
        let trimmed = source_duration - self.trim_start - self.trim_end;
        (self.span() - trimmed).abs() < 1e-6
    }
}
