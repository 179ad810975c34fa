//! The audio mixing graph.
//!
//! Wraps playable media elements into per-source nodes
//! (`element → gain → fade → master`) and owns the one-time binding of an
//! element into the graph.

use std::collections::HashMap;

use montage_core::Result;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::envelope::FadeEnvelope;

/// A playable audio sink the graph can drive.
///
/// Real hosts wrap their player objects; tests use scripted fakes.
pub trait AudioElement {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64) -> Result<()>;
    /// Apply the resolved output gain. Called every graph tick.
    fn set_gain(&mut self, gain: f64);
}

struct SourceNode<E> {
    element: E,
    gain: f64,
    envelope: FadeEnvelope,
}

/// Mixing graph: per-source gain and fade envelope into a shared master bus.
pub struct AudioGraph<E: AudioElement> {
    sources: HashMap<Uuid, SourceNode<E>>,
    master: f64,
    activated: bool,
}

impl<E: AudioElement> AudioGraph<E> {
    /// Create a suspended graph. Call [`resume`](Self::resume) before use.
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            master: 1.0,
            activated: false,
        }
    }

    /// Activate the output route.
    ///
    /// Callers invoke this lazily before first use and must tolerate an
    /// error from backends that cannot open an output route yet; until
    /// activation the graph falls back to pushing gains straight at the
    /// elements, which is also what this in-process implementation does
    /// after activation.
    pub fn resume(&mut self) -> Result<()> {
        if !self.activated {
            self.activated = true;
            debug!("audio graph activated");
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.activated
    }

    /// Bind an element into the graph under `source_id` with the resolved
    /// base gain (clip volume × track volume).
    ///
    /// Binding is one-time per source id: a second call for an id already
    /// bound is a no-op that keeps the existing node and returns `false`.
    pub fn bind(&mut self, source_id: Uuid, element: E, gain: f64) -> bool {
        if self.sources.contains_key(&source_id) {
            warn!(%source_id, "rebind rejected; reusing existing audio node");
            return false;
        }
        let mut node = SourceNode {
            element,
            gain,
            envelope: FadeEnvelope::new(),
        };
        node.element.set_gain(gain * self.master);
        self.sources.insert(source_id, node);
        true
    }

    /// Whether `source_id` currently has a node in the graph.
    pub fn is_bound(&self, source_id: Uuid) -> bool {
        self.sources.contains_key(&source_id)
    }

    /// Number of bound sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Seek the underlying element of a bound source.
    pub fn seek(&mut self, source_id: Uuid, seconds: f64) -> Result<()> {
        if let Some(node) = self.sources.get_mut(&source_id) {
            node.element.seek(seconds)?;
        }
        Ok(())
    }

    /// Start playback of a bound source.
    pub fn play(&mut self, source_id: Uuid) -> Result<()> {
        if let Some(node) = self.sources.get_mut(&source_id) {
            node.element.play()?;
        }
        Ok(())
    }

    /// Set the base gain of a bound source.
    pub fn set_volume(&mut self, source_id: Uuid, value: f64, now: f64) {
        if let Some(node) = self.sources.get_mut(&source_id) {
            node.gain = value.max(0.0);
            let env = node.envelope.value_at(now);
            node.element.set_gain(node.gain * env * self.master);
        }
    }

    /// Linear fade-in ramp `from`→1 over `duration` seconds, starting now.
    pub fn apply_fade_in(&mut self, source_id: Uuid, from: f64, duration: f64, now: f64) {
        if let Some(node) = self.sources.get_mut(&source_id) {
            node.envelope.ramp(from.clamp(0.0, 1.0), 1.0, duration, now);
        }
    }

    /// Linear fade-out ramp `from`→0 over `duration` seconds, starting now.
    pub fn apply_fade_out(&mut self, source_id: Uuid, from: f64, duration: f64, now: f64) {
        if let Some(node) = self.sources.get_mut(&source_id) {
            node.envelope.ramp(from.clamp(0.0, 1.0), 0.0, duration, now);
        }
    }

    /// Master bus volume, clamped to [0, 1].
    pub fn set_master_volume(&mut self, value: f64, now: f64) {
        self.master = value.clamp(0.0, 1.0);
        self.tick(now);
    }

    pub fn master_volume(&self) -> f64 {
        self.master
    }

    /// Advance every envelope and push resolved gains to the elements.
    pub fn tick(&mut self, now: f64) {
        for node in self.sources.values_mut() {
            let env = node.envelope.value_at(now);
            node.element.set_gain(node.gain * env * self.master);
        }
    }

    /// Disconnect and forget a source, returning its element for teardown.
    pub fn unbind(&mut self, source_id: Uuid) -> Option<E> {
        self.sources.remove(&source_id).map(|mut node| {
            node.element.pause();
            node.element
        })
    }

    /// Disconnect every source. No bound-but-orphaned element survives.
    pub fn unbind_all(&mut self) {
        for (_, mut node) in self.sources.drain() {
            node.element.pause();
        }
    }
}

impl<E: AudioElement> Default for AudioGraph<E> {
    fn default() -> Self {
        Self::new()
    }
}
