//! Encoder progress parsing.
//!
//! FFmpeg's `-progress pipe:1` stream is key=value lines. The elapsed
//! output time arrives as `out_time_ms` — which, despite the name, is in
//! microseconds — with an `out_time=HH:MM:SS.ffffff` fallback.

use montage_core::format_eta;

/// A progress update forwarded to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportProgress {
    /// Completion percentage, 0–100.
    pub percent: f64,
    /// Human-readable remaining-time estimate, once enough has been
    /// observed to extrapolate the encoding rate.
    pub time_remaining: Option<String>,
}

/// Incremental parser over the progress stream.
pub struct ProgressParser {
    total_duration: f64,
    encoded: f64,
}

impl ProgressParser {
    pub fn new(total_duration: f64) -> Self {
        Self {
            total_duration,
            encoded: 0.0,
        }
    }

    /// Consume one line of the progress stream. `elapsed_wall` is seconds
    /// since the encoder was spawned, used to estimate the remaining time
    /// from the observed encoding rate.
    pub fn parse_line(&mut self, line: &str, elapsed_wall: f64) -> Option<ExportProgress> {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("out_time_ms=") {
            // Microseconds, not milliseconds.
            let micros: f64 = value.parse().ok()?;
            self.encoded = micros / 1_000_000.0;
        } else if let Some(value) = line.strip_prefix("out_time=") {
            self.encoded = parse_clock(value)?;
        } else if line == "progress=end" {
            self.encoded = self.total_duration;
        } else {
            return None;
        }
        Some(self.snapshot(elapsed_wall))
    }

    fn snapshot(&self, elapsed_wall: f64) -> ExportProgress {
        let percent = if self.total_duration > 0.0 {
            (self.encoded / self.total_duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let time_remaining = if self.encoded > 0.0 && elapsed_wall > 0.0 {
            let rate = self.encoded / elapsed_wall;
            let remaining = (self.total_duration - self.encoded).max(0.0) / rate;
            Some(format_eta(remaining))
        } else {
            None
        };
        ExportProgress {
            percent,
            time_remaining,
        }
    }
}

/// Parse `HH:MM:SS.ffffff` into seconds.
fn parse_clock(value: &str) -> Option<f64> {
    let mut parts = value.trim().splitn(3, ':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
