//! Montage Media - media registry and FFmpeg probing
//!
//! The compositing engine never reads media files itself; it consumes
//! metadata (path, duration, kind) from a registry owned by the import
//! pipeline. This crate defines that interface, an in-memory
//! implementation, and the `ffprobe` wrapper used by export validation.

pub mod probe;
pub mod registry;

pub use probe::{ffmpeg_available, probe, ProbeResult};
pub use registry::{InMemoryRegistry, MediaInfo, MediaKind, MediaRegistry, MediaRegistryExt};
