//! Cross-crate tests for the timeline model and resolver against the
//! media registry.

use montage_core::MontageError;
use montage_media::{InMemoryRegistry, MediaInfo, MediaRegistry, MediaRegistryExt};
use montage_timeline::{next_clip_after, resolve_at, Clip, Project, Track};
use uuid::Uuid;

// ── Helpers ────────────────────────────────────────────────────

struct Fixture {
    project: Project,
    registry: InMemoryRegistry,
}

fn fixture() -> Fixture {
    let mut registry = InMemoryRegistry::new();
    let video_a = Uuid::new_v4();
    let video_b = Uuid::new_v4();
    let music = Uuid::new_v4();
    registry.insert(MediaInfo::video(video_a, "/media/a.mp4", 5.0, 1920, 1080));
    registry.insert(MediaInfo::video(video_b, "/media/b.mp4", 5.0, 1920, 1080));
    registry.insert(MediaInfo::audio(music, "/media/music.wav", 30.0));

    let mut project = Project::new("Fixture", 12.0);

    let mut video = Track::new_video("V1", 0);
    video.add_clip(Clip::new(video_a, 0, 0.0, 5.0));
    video.add_clip(Clip::new(video_b, 0, 7.0, 12.0));
    project.add_track(video);

    let mut audio = Track::new_audio("A1", 1);
    let mut song = Clip::new(music, 1, 2.0, 10.0);
    song.trim_start = 4.0;
    song.trim_end = 18.0;
    audio.add_clip(song);
    project.add_track(audio);

    Fixture { project, registry }
}

// ── Resolution across kinds ────────────────────────────────────

#[test]
fn resolver_partitions_by_track_kind() {
    let fx = fixture();
    let active = resolve_at(&fx.project.tracks, 3.0);

    let video = active.video.expect("video clip at t=3");
    assert_eq!(video.start_time, 0.0);
    assert_eq!(active.audio.len(), 1);
    assert_eq!(active.audio[0].start_time, 2.0);
}

#[test]
fn gap_still_reports_running_audio() {
    let fx = fixture();
    let active = resolve_at(&fx.project.tracks, 6.0);
    assert!(active.video.is_none());
    assert_eq!(active.audio.len(), 1);
}

#[test]
fn next_clip_distinguishes_gap_from_end() {
    let fx = fixture();
    // In the video gap: something is still coming.
    let next = next_clip_after(&fx.project.tracks, 5.0).unwrap();
    assert_eq!(next.start_time, 7.0);
    // Past every clip: end of timeline.
    assert!(next_clip_after(&fx.project.tracks, 11.0).is_none());
}

// ── Model invariants against registry metadata ─────────────────

#[test]
fn trimmed_clip_satisfies_span_invariant() {
    let fx = fixture();
    let song = &fx.project.tracks[1].clips[0];
    let media = fx.registry.lookup(song.media_id).unwrap();
    // span 8 == 30 - 4 - 18
    assert!(song.trim_consistent(media.duration));
}

#[test]
fn source_offset_is_clamped_to_usable_range() {
    let fx = fixture();
    let song = &fx.project.tracks[1].clips[0];
    let media = fx.registry.lookup(song.media_id).unwrap();

    assert_eq!(song.source_offset_at(2.0, media.duration), 4.0);
    assert_eq!(song.source_offset_at(6.0, media.duration), 8.0);
    // Past the clip end the offset pins at source_duration - trim_end.
    assert_eq!(song.source_offset_at(50.0, media.duration), 12.0);
}

#[test]
fn registry_miss_is_a_resolution_error() {
    let fx = fixture();
    let err = fx.registry.require(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, MontageError::MediaNotFound(_)));
}

#[test]
fn project_duration_is_authoritative() {
    let fx = fixture();
    assert_eq!(fx.project.duration, 12.0);
    assert_eq!(fx.project.clip_end(), 12.0);

    let mut shorter = fx.project.clone();
    shorter.duration = 30.0;
    // Clips end at 12 but the project says 30; nothing recomputes it.
    assert_eq!(shorter.duration, 30.0);
}
