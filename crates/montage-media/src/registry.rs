//! Media registry — the engine's read-only view of imported media.

use std::collections::HashMap;
use std::path::PathBuf;

use montage_core::{MontageError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Metadata for one imported media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Registry ID referenced by clips
    pub id: Uuid,
    /// Absolute path to the source file
    pub path: PathBuf,
    /// Native duration in seconds
    pub duration: f64,
    /// Video or audio-only
    pub kind: MediaKind,
    /// Native width, video only
    pub width: Option<u32>,
    /// Native height, video only
    pub height: Option<u32>,
    /// Whether the file carries an audio stream
    pub has_audio: bool,
}

impl MediaInfo {
    /// Describe a video file.
    pub fn video(id: Uuid, path: impl Into<PathBuf>, duration: f64, width: u32, height: u32) -> Self {
        Self {
            id,
            path: path.into(),
            duration,
            kind: MediaKind::Video,
            width: Some(width),
            height: Some(height),
            has_audio: true,
        }
    }

    /// Describe an audio-only file.
    pub fn audio(id: Uuid, path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            id,
            path: path.into(),
            duration,
            kind: MediaKind::Audio,
            width: None,
            height: None,
            has_audio: true,
        }
    }
}

/// Lookup interface consumed by the playback engine and export renderer.
///
/// Population is owned by the (out-of-scope) import pipeline. A miss is a
/// fatal per-operation error for the caller, not a model invariant
/// violation.
pub trait MediaRegistry: Send + Sync {
    fn lookup(&self, id: Uuid) -> Option<MediaInfo>;
}

/// Extension helpers over any registry.
pub trait MediaRegistryExt: MediaRegistry {
    /// Lookup that converts a miss into [`MontageError::MediaNotFound`].
    fn require(&self, id: Uuid) -> Result<MediaInfo> {
        self.lookup(id)
            .ok_or_else(|| MontageError::MediaNotFound(format!("media {id} is not registered")))
    }
}

impl<R: MediaRegistry + ?Sized> MediaRegistryExt for R {}

/// Simple owned registry, used directly by tests and small hosts.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: HashMap<Uuid, MediaInfo>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a media file, replacing any previous entry with the same id.
    pub fn insert(&mut self, info: MediaInfo) {
        self.entries.insert(info.id, info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MediaRegistry for InMemoryRegistry {
    fn lookup(&self, id: Uuid) -> Option<MediaInfo> {
        self.entries.get(&id).cloned()
    }
}
