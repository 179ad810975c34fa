//! Export output configuration.
//!
//! Container and codecs are fixed by design (H.264 + AAC in MP4); the
//! caller chooses a resolution class, frame rate, and destination.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// H.264 encoder settings, fixed per design.
pub const VIDEO_CODEC: &str = "libx264";
pub const VIDEO_CRF: u32 = 18;
pub const VIDEO_PRESET: &str = "medium";
pub const PIXEL_FORMAT: &str = "yuv420p";

/// AAC encoder settings, fixed per design.
pub const AUDIO_CODEC: &str = "aac";
pub const AUDIO_BITRATE: &str = "192k";
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Safety margin applied over the estimated output size during the
/// pre-flight disk-space check.
pub const DISK_SAFETY_MARGIN: f64 = 1.5;

/// Output resolution class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionClass {
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
    /// First referenced video's native resolution; 1080p if none found.
    #[serde(rename = "source")]
    Source,
}

impl ResolutionClass {
    /// Resolve to concrete output dimensions. `native` is the first
    /// referenced video's size, when known.
    pub fn dimensions(self, native: Option<(u32, u32)>) -> (u32, u32) {
        match self {
            Self::Hd720 => (1280, 720),
            Self::Hd1080 => (1920, 1080),
            Self::Source => native.unwrap_or((1920, 1080)),
        }
    }
}

/// Bitrate assumed for the resolved output height, in megabits per
/// second. Drives only the pre-flight disk-space estimate.
pub fn bitrate_mbps_for_height(height: u32) -> f64 {
    if height >= 1080 {
        8.0
    } else {
        5.0
    }
}

/// Export configuration supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub resolution: ResolutionClass,
    /// Integer output frame rate.
    pub frame_rate: u32,
    /// Destination file path.
    pub output_path: PathBuf,
}

impl ExportSettings {
    /// 1080p30 to the given destination.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            resolution: ResolutionClass::Hd1080,
            frame_rate: 30,
            output_path: output_path.into(),
        }
    }

    pub fn with_resolution(mut self, resolution: ResolutionClass) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }
}
