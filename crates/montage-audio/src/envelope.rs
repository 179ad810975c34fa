//! Linear fade envelopes.
//!
//! Evaluated against the engine's monotonic clock (`f64` seconds) rather
//! than wall time so tests can drive them with synthetic deltas.

/// A gain envelope: a held level plus at most one in-flight linear ramp.
#[derive(Debug, Clone)]
pub struct FadeEnvelope {
    level: f64,
    ramp: Option<Ramp>,
}

#[derive(Debug, Clone)]
struct Ramp {
    from: f64,
    to: f64,
    start: f64,
    duration: f64,
}

impl FadeEnvelope {
    /// Unity envelope, no ramp.
    pub fn new() -> Self {
        Self {
            level: 1.0,
            ramp: None,
        }
    }

    /// Start a linear ramp `from`→`to` over `duration` seconds, replacing
    /// any ramp already in flight. A zero duration applies `to` at once.
    pub fn ramp(&mut self, from: f64, to: f64, duration: f64, now: f64) {
        if duration <= 0.0 {
            self.level = to;
            self.ramp = None;
            return;
        }
        self.ramp = Some(Ramp {
            from,
            to,
            start: now,
            duration,
        });
        self.level = from;
    }

    /// Hold a fixed level, cancelling any ramp.
    pub fn set_level(&mut self, level: f64) {
        self.level = level;
        self.ramp = None;
    }

    /// Evaluate the envelope, retiring the ramp once it completes.
    pub fn value_at(&mut self, now: f64) -> f64 {
        if let Some(ramp) = &self.ramp {
            let t = (now - ramp.start) / ramp.duration;
            if t >= 1.0 {
                self.level = ramp.to;
                self.ramp = None;
            } else if t > 0.0 {
                self.level = ramp.from + (ramp.to - ramp.from) * t;
            }
        }
        self.level
    }

    /// True while a ramp is in flight.
    pub fn is_ramping(&self) -> bool {
        self.ramp.is_some()
    }
}

impl Default for FadeEnvelope {
    fn default() -> Self {
        Self::new()
    }
}
