//! Pre-flight validation.
//!
//! Every check must pass before the encoder is spawned; any failure
//! aborts the export with a specific, user-facing reason and performs no
//! partial writes.

use std::fs;
use std::path::Path;

use montage_core::{MontageError, Result};
use montage_media::ffmpeg_available;
use tracing::debug;

use crate::plan::ExportPlan;
use crate::settings::DISK_SAFETY_MARGIN;

/// Validate a plan against the real environment.
///
/// Order matters for error specificity: missing sources are reported
/// before environment problems, and the encoder is only probed once the
/// cheap filesystem checks pass.
pub fn preflight(plan: &ExportPlan) -> Result<()> {
    for path in plan.source_files() {
        if !path.exists() {
            return Err(MontageError::MediaNotFound(format!(
                "source file missing: {}",
                path.display()
            )));
        }
    }

    let out_dir = output_dir(&plan.output_path);
    check_writable(&out_dir)?;
    check_disk_space(&out_dir, required_bytes(plan.bitrate_mbps, plan.duration))?;

    if !ffmpeg_available() {
        return Err(MontageError::Validation(
            "FFmpeg encoder not found or not responding; install ffmpeg and retry".into(),
        ));
    }

    debug!(output = %plan.output_path.display(), "pre-flight checks passed");
    Ok(())
}

/// Estimated output size in bytes: `bitrate_mbps × duration / 8` with the
/// safety margin applied.
pub fn required_bytes(bitrate_mbps: f64, duration_seconds: f64) -> u64 {
    let megabytes = bitrate_mbps * duration_seconds / 8.0;
    (megabytes * 1_000_000.0 * DISK_SAFETY_MARGIN) as u64
}

fn output_dir(output_path: &Path) -> std::path::PathBuf {
    match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    }
}

/// Verify writability with a scratch write/delete rather than trusting
/// permission bits.
fn check_writable(dir: &Path) -> Result<()> {
    let scratch = dir.join(format!(".montage-scratch-{}", std::process::id()));
    fs::write(&scratch, b"scratch")
        .map_err(|e| MontageError::Validation(format!(
            "output directory {} is not writable: {e}",
            dir.display()
        )))?;
    let _ = fs::remove_file(&scratch);
    Ok(())
}

fn check_disk_space(dir: &Path, required: u64) -> Result<()> {
    let available = fs2::available_space(dir).map_err(|e| {
        MontageError::Validation(format!(
            "cannot determine free space for {}: {e}",
            dir.display()
        ))
    })?;
    if available < required {
        return Err(MontageError::Validation(format!(
            "not enough disk space: need about {} MB, {} MB available",
            required / 1_000_000,
            available / 1_000_000
        )));
    }
    Ok(())
}
