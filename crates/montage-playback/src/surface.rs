//! The render surface abstraction.
//!
//! The engine drives one video output element through this trait. Every
//! asynchronous operation is a command here and an event back through
//! [`PlaybackEngine::handle_event`](crate::engine::PlaybackEngine::handle_event):
//!
//! - `attach` is answered by [`SurfaceEvent::CanPlay`] once enough of the
//!   source is buffered,
//! - `seek` by [`SurfaceEvent::Seeked`],
//! - `play` by [`SurfaceEvent::Started`] once frames are actually
//!   advancing (the surface clock must not be trusted before that),
//! - reaching the end of the attached source raises [`SurfaceEvent::Ended`].

use std::path::Path;

use montage_core::Result;

/// Event raised by the render surface. Stray or late events are legal;
/// the engine guards every transition on its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The attached source is buffered enough to start.
    CanPlay,
    /// A requested seek has completed.
    Seeked,
    /// Playback has actually started; the surface clock is now valid.
    Started,
    /// The attached source played to its end.
    Ended,
    /// The surface failed to load, seek, or play.
    Error(String),
}

/// The single video output element owned by a playback engine instance.
pub trait VideoSurface {
    /// Attach a source file and begin buffering it. Does not seek or play.
    fn attach(&mut self, path: &Path) -> Result<()>;

    /// Seek to an absolute position in the attached source, in seconds.
    fn seek(&mut self, seconds: f64) -> Result<()>;

    /// Start or resume playback of the attached source.
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping the source attached.
    fn pause(&mut self);

    /// Detach the source and blank the surface.
    fn clear(&mut self);

    /// Playback rate multiplier.
    fn set_rate(&mut self, rate: f64);

    /// Output gain for the source's own audio.
    fn set_volume(&mut self, gain: f64);

    /// Current position of the surface's native clock, in seconds into
    /// the attached source. Only meaningful after [`SurfaceEvent::Started`].
    fn position(&self) -> f64;
}
