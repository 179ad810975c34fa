//! Time formatting helpers.
//!
//! All engine time values are `f64` seconds; these helpers render them for
//! logs and progress reporting.

/// Format seconds as `HH:MM:SS.mmm` for log output.
pub fn format_clock(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let whole = total_millis / 1000;
    let (h, m, s) = (whole / 3600, (whole / 60) % 60, whole % 60);
    format!("{h:02}:{m:02}:{s:02}.{millis:03}")
}

/// Format a remaining-time estimate as a short human string, e.g. `"1m 23s"`.
pub fn format_eta(seconds: f64) -> String {
    let seconds = seconds.max(0.0).round() as u64;
    if seconds >= 3600 {
        format!("{}h {}m", seconds / 3600, (seconds / 60) % 60)
    } else if seconds >= 60 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{seconds}s")
    }
}
