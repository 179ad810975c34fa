//! Project type — the full editable composition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::track::Track;

/// The full editable composition: tracks plus an authoritative duration.
///
/// `duration` is the project length and is independent of clip extents —
/// a project may end after its last clip (trailing black/silence) or be
/// edited down below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,
    /// Project name
    pub name: String,
    /// Ordered tracks
    pub tracks: Vec<Track>,
    /// Authoritative project length in seconds
    pub duration: f64,
}

impl Project {
    /// Create a new empty project.
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tracks: Vec::new(),
            duration,
        }
    }

    /// Append a track.
    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Timeline position where the last clip on any track ends.
    pub fn clip_end(&self) -> f64 {
        self.tracks.iter().map(|t| t.end()).fold(0.0, f64::max)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled Project", 0.0)
    }
}
