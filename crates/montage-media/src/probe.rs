//! Media file probing via `ffprobe`, without a full decode.
//!
//! Used by the export renderer for post-flight duration validation and to
//! resolve the `source` resolution class.

use std::path::Path;
use std::process::Command;

use montage_core::{MontageError, Result};
use tracing::debug;

/// Metadata extracted from a media file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// Container duration in seconds
    pub duration: f64,
    /// Width of the first video stream
    pub width: Option<u32>,
    /// Height of the first video stream
    pub height: Option<u32>,
    pub has_video: bool,
    pub has_audio: bool,
}

/// Probe a media file with `ffprobe`.
pub fn probe(path: &Path) -> Result<ProbeResult> {
    if !path.exists() {
        return Err(MontageError::MediaNotFound(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration:stream=codec_type,width,height",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| MontageError::Probe(format!("failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MontageError::Probe(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let parsed = parse_ffprobe_json(&String::from_utf8_lossy(&output.stdout))?;
    debug!(path = %path.display(), duration = parsed.duration, "probed media");
    Ok(parsed)
}

/// Check that the FFmpeg encoder is installed and responsive.
pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn parse_ffprobe_json(raw: &str) -> Result<ProbeResult> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| MontageError::Probe(format!("unreadable ffprobe output: {e}")))?;

    let duration = value["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| MontageError::Probe("ffprobe reported no duration".into()))?;

    let mut result = ProbeResult {
        duration,
        width: None,
        height: None,
        has_video: false,
        has_audio: false,
    };

    for stream in value["streams"].as_array().into_iter().flatten() {
        match stream["codec_type"].as_str() {
            Some("video") => {
                result.has_video = true;
                if result.width.is_none() {
                    result.width = stream["width"].as_u64().map(|w| w as u32);
                    result.height = stream["height"].as_u64().map(|h| h as u32);
                }
            }
            Some("audio") => result.has_audio = true,
            _ => {}
        }
    }

    Ok(result)
}
