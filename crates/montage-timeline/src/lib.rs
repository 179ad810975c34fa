//! Montage Timeline - Timeline data model
//!
//! Implements the editable composition structure:
//! - Projects containing ordered tracks
//! - Tracks containing trimmed clips placed at absolute timeline intervals
//! - The pure clip-resolution query shared by preview and export

pub mod clip;
pub mod project;
pub mod resolver;
pub mod track;

pub use clip::Clip;
pub use project::Project;
pub use resolver::{next_clip_after, resolve_at, ActiveClips};
pub use track::{Track, TrackKind};
