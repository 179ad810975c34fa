//! Montage Playback - the interactive preview engine
//!
//! A finite-state orchestrator that owns one video render surface and
//! on-demand audio-only players, consumes the clip resolver and the audio
//! graph, and exposes play/pause/seek/rate/volume plus playhead and
//! end-of-timeline notifications.
//!
//! Control flow is event-driven: every asynchronous media operation
//! (attach, seek, play) is answered by a named [`SurfaceEvent`], and the
//! per-display-tick [`PlaybackEngine::advance`] call only republishes
//! position and walks through gaps — it never decides clip transitions.

pub mod engine;
pub mod scheduler;
pub mod surface;
pub mod testing;

pub use engine::{PlaybackEngine, PlaybackEvent, PlaybackState, PlayerBackend};
pub use scheduler::FrameTicker;
pub use surface::{SurfaceEvent, VideoSurface};
