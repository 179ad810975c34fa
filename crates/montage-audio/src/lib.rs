//! Montage Audio - the playback mixing graph
//!
//! Mixes N concurrently-playing media sources with independent volume and
//! fade envelopes into one master output. The graph is generic over an
//! [`AudioElement`] so the playback engine can drive real players in a host
//! and scripted fakes in tests.
//!
//! Architecture:
//! - `FadeEnvelope`: linear ramp evaluated against the engine's clock
//! - `AudioGraph`: per-source gain × envelope × master, one-time binding

pub mod envelope;
pub mod graph;

pub use envelope::FadeEnvelope;
pub use graph::{AudioElement, AudioGraph};
