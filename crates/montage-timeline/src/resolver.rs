//! Clip resolution — the pure query shared by preview and export.
//!
//! Given the track list and a time position, report which clips are active:
//! a single video clip for the preview surface and the set of concurrently
//! audible audio clips. No side effects; both the playback engine and the
//! export renderer resolve timing through this module so the two renderings
//! agree.

use smallvec::SmallVec;

use crate::clip::Clip;
use crate::track::{Track, TrackKind};

/// Clips active at a queried position, partitioned by track kind.
#[derive(Debug, Default)]
pub struct ActiveClips<'a> {
    /// The clip driving the preview surface, if any. Only the primary
    /// video track supplies this; higher video tracks are reserved for
    /// overlay compositing and never drive the preview.
    pub video: Option<&'a Clip>,
    /// Every audio-track clip whose interval contains the position.
    pub audio: SmallVec<[&'a Clip; 4]>,
}

impl ActiveClips<'_> {
    /// True when nothing is active at the queried position.
    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_empty()
    }
}

/// Resolve the clips active at `position`.
///
/// Per track, selects the clip whose half-open interval
/// `[start_time, end_time)` contains `position` — at most one per track for
/// well-formed data; on overlap the first match wins.
pub fn resolve_at(tracks: &[Track], position: f64) -> ActiveClips<'_> {
    let mut active = ActiveClips::default();
    let primary = primary_video_index(tracks);

    for track in tracks {
        match track.kind {
            TrackKind::Video => {
                if Some(track.index) == primary && active.video.is_none() {
                    active.video = track.clip_at(position);
                }
            }
            TrackKind::Audio => {
                if let Some(clip) = track.clip_at(position) {
                    active.audio.push(clip);
                }
            }
        }
    }

    active
}

/// The clip with the smallest `start_time` strictly greater than
/// `position`, scanning all tracks.
///
/// Lets callers distinguish "gap before the next clip" from "end of
/// timeline": `None` here means nothing is ever coming.
pub fn next_clip_after<'a>(tracks: &'a [Track], position: f64) -> Option<&'a Clip> {
    tracks
        .iter()
        .flat_map(|t| t.clips.iter())
        .filter(|c| c.start_time > position)
        .min_by(|a, b| a.start_time.total_cmp(&b.start_time))
}

fn primary_video_index(tracks: &[Track]) -> Option<usize> {
    tracks
        .iter()
        .filter(|t| t.kind == TrackKind::Video)
        .map(|t| t.index)
        .min()
}
