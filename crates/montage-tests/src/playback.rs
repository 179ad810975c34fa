//! Playback state-machine scenarios driven against the fake backend.
//!
//! These are the timing-rule tests: abutting clips transition exactly once
//! on the surface's ended signal, gaps are crossed by the advance loop,
//! seeks land at the trim-mapped source offset.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use montage_media::{InMemoryRegistry, MediaInfo};
use montage_playback::testing::{FakeBackend, FakeSurface, SurfaceCommand};
use montage_playback::{PlaybackEngine, PlaybackEvent, PlaybackState, SurfaceEvent};
use montage_timeline::{Clip, Project, Track};
use uuid::Uuid;

use crate::init_logging;

// ── Helpers ────────────────────────────────────────────────────

struct Rig {
    engine: PlaybackEngine<FakeBackend>,
    surface: FakeSurface,
    backend: FakeBackend,
    events: Receiver<PlaybackEvent>,
}

fn rig(project: Project, registry: InMemoryRegistry) -> Rig {
    init_logging();
    let surface = FakeSurface::new();
    let backend = FakeBackend::new();
    let (engine, events) = PlaybackEngine::new(
        backend.clone(),
        surface.clone(),
        Arc::new(registry),
        project,
    );
    Rig {
        engine,
        surface,
        backend,
        events,
    }
}

/// Answer the attach→seek→play handshake the way a healthy surface would.
fn complete_load(engine: &mut PlaybackEngine<FakeBackend>) {
    engine.handle_event(SurfaceEvent::CanPlay);
    engine.handle_event(SurfaceEvent::Seeked);
    engine.handle_event(SurfaceEvent::Started);
}

fn ended_count(events: &Receiver<PlaybackEvent>) -> usize {
    events
        .try_iter()
        .filter(|e| matches!(e, PlaybackEvent::Ended))
        .count()
}

fn playheads(events: &Receiver<PlaybackEvent>) -> Vec<f64> {
    events
        .try_iter()
        .filter_map(|e| match e {
            PlaybackEvent::Playhead(t) => Some(t),
            PlaybackEvent::Ended => None,
        })
        .collect()
}

// ── Abutting clips ─────────────────────────────────────────────

#[test]
fn abutting_clips_transition_once_with_zero_pauses() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let mut registry = InMemoryRegistry::new();
    registry.insert(MediaInfo::video(a, "/media/a.mp4", 5.0, 1920, 1080));
    registry.insert(MediaInfo::video(b, "/media/b.mp4", 5.0, 1920, 1080));

    let mut project = Project::new("Abutting", 10.0);
    let mut track = Track::new_video("V1", 0);
    track.add_clip(Clip::new(a, 0, 0.0, 5.0));
    track.add_clip(Clip::new(b, 0, 5.0, 10.0));
    project.add_track(track);

    let mut rig = rig(project, registry);
    rig.engine.play(Some(0.0)).unwrap();
    assert_eq!(rig.engine.state(), PlaybackState::Loading);
    complete_load(&mut rig.engine);
    assert_eq!(rig.engine.state(), PlaybackState::Playing);

    // The first clip plays out; its ended signal is the sole transition
    // trigger.
    rig.surface.0.lock().position = 5.0;
    rig.engine.handle_event(SurfaceEvent::Ended);
    assert_eq!(rig.engine.playhead(), 5.0);
    complete_load(&mut rig.engine);

    assert_eq!(rig.engine.state(), PlaybackState::Playing);
    let state = rig.surface.0.lock();
    assert_eq!(state.attach_count(), 2);
    assert_eq!(state.pause_count(), 0);
    drop(state);
    assert_eq!(ended_count(&rig.events), 0);
}

// ── Gap crossing ───────────────────────────────────────────────

#[test]
fn gap_is_crossed_by_wall_clock_and_next_clip_attaches() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let mut registry = InMemoryRegistry::new();
    registry.insert(MediaInfo::video(a, "/media/a.mp4", 5.0, 1920, 1080));
    registry.insert(MediaInfo::video(b, "/media/b.mp4", 3.0, 1920, 1080));

    let mut project = Project::new("Gapped", 10.0);
    let mut track = Track::new_video("V1", 0);
    track.add_clip(Clip::new(a, 0, 0.0, 5.0));
    track.add_clip(Clip::new(b, 0, 7.0, 10.0));
    project.add_track(track);

    let mut rig = rig(project, registry);
    rig.engine.play(Some(0.0)).unwrap();
    complete_load(&mut rig.engine);

    rig.surface.0.lock().position = 5.0;
    rig.engine.handle_event(SurfaceEvent::Ended);

    // No clip at 5.0 but one is coming: surface blanks, playback holds.
    assert_eq!(rig.engine.state(), PlaybackState::Playing);
    assert!(rig.surface.0.lock().attached.is_none());
    rig.events.try_iter().count(); // drain history

    // Advance through the gap in quarter-second ticks.
    let mut ticks = 0;
    while rig.engine.state() == PlaybackState::Playing && rig.engine.playhead() < 7.0 {
        rig.engine.advance(0.25);
        ticks += 1;
        assert!(ticks < 20, "gap crossing did not terminate");
    }

    // The playhead advanced continuously from 5 to 7...
    let seen = playheads(&rig.events);
    assert!(seen.windows(2).all(|w| w[1] >= w[0]), "playhead went backwards");
    assert!(seen.iter().any(|&t| t > 5.0 && t < 7.0));
    assert_eq!(*seen.last().unwrap(), 7.0);

    // ...and the second clip was picked up without user action.
    assert_eq!(rig.engine.state(), PlaybackState::Loading);
    complete_load(&mut rig.engine);
    assert_eq!(rig.engine.state(), PlaybackState::Playing);
    assert_eq!(ended_count(&rig.events), 0);
    assert_eq!(rig.surface.0.lock().pause_count(), 0);
}

#[test]
fn upcoming_clip_is_preloaded_inside_the_horizon() {
    let b = Uuid::new_v4();
    let mut registry = InMemoryRegistry::new();
    registry.insert(MediaInfo::video(b, "/media/b.mp4", 3.0, 1920, 1080));

    let mut project = Project::new("Preload", 10.0);
    let mut track = Track::new_video("V1", 0);
    track.add_clip(Clip::new(b, 0, 7.0, 10.0));
    project.add_track(track);

    let mut rig = rig(project, registry);
    // Start inside the leading gap.
    rig.engine.play(Some(6.4)).unwrap();
    assert_eq!(rig.engine.state(), PlaybackState::Playing);
    assert_eq!(rig.surface.0.lock().attach_count(), 0);

    // One tick later the clip is within the 0.5 s horizon.
    rig.engine.advance(0.2);
    assert_eq!(rig.surface.0.lock().attach_count(), 1);

    // Arrival skips the attach and goes straight to positioning.
    rig.engine.advance(0.4);
    assert_eq!(rig.engine.state(), PlaybackState::Loading);
    assert_eq!(rig.surface.0.lock().attach_count(), 1);
    complete_load(&mut rig.engine);
    assert_eq!(rig.engine.state(), PlaybackState::Playing);
}

// ── Seeking ────────────────────────────────────────────────────

#[test]
fn seek_maps_through_trim_and_resumes() {
    let media = Uuid::new_v4();
    let mut registry = InMemoryRegistry::new();
    registry.insert(MediaInfo::video(media, "/media/trimmed.mp4", 7.0, 1920, 1080));

    let mut project = Project::new("Seek", 20.0);
    let mut track = Track::new_video("V1", 0);
    let mut clip = Clip::new(media, 0, 10.0, 14.0);
    clip.trim_start = 1.0;
    clip.trim_end = 2.0;
    track.add_clip(clip);
    project.add_track(track);

    let mut rig = rig(project, registry);
    rig.engine.play(Some(10.0)).unwrap();
    complete_load(&mut rig.engine);

    rig.engine.seek(12.0).unwrap();
    assert_eq!(rig.engine.state(), PlaybackState::Seeking);
    assert!(rig
        .surface
        .0
        .lock()
        .commands
        .contains(&SurfaceCommand::Seek(3.0)));

    // Seek completion resumes playback through the load handshake.
    rig.engine.handle_event(SurfaceEvent::Seeked);
    complete_load(&mut rig.engine);
    assert_eq!(rig.engine.state(), PlaybackState::Playing);

    rig.engine.advance(0.0);
    assert_eq!(rig.engine.playhead(), 12.0);
}

#[test]
fn seek_into_gap_blanks_the_surface() {
    let a = Uuid::new_v4();
    let mut registry = InMemoryRegistry::new();
    registry.insert(MediaInfo::video(a, "/media/a.mp4", 5.0, 1920, 1080));

    let mut project = Project::new("SeekGap", 10.0);
    let mut track = Track::new_video("V1", 0);
    track.add_clip(Clip::new(a, 0, 0.0, 5.0));
    project.add_track(track);

    let mut rig = rig(project, registry);
    rig.engine.seek(8.0).unwrap();

    assert_eq!(rig.engine.state(), PlaybackState::Idle);
    assert!(rig.surface.0.lock().attached.is_none());
    // The position update was still published.
    assert_eq!(playheads(&rig.events), vec![8.0]);
}

// ── Audio lifecycle ────────────────────────────────────────────

#[test]
fn audio_clip_starts_and_stops_during_gap() {
    let a = Uuid::new_v4();
    let music = Uuid::new_v4();
    let mut registry = InMemoryRegistry::new();
    registry.insert(MediaInfo::video(a, "/media/a.mp4", 5.0, 1920, 1080));
    registry.insert(MediaInfo::audio(music, "/media/sting.wav", 1.0));

    let mut project = Project::new("AudioGap", 8.0);
    let mut video = Track::new_video("V1", 0);
    video.add_clip(Clip::new(a, 0, 0.0, 5.0));
    project.add_track(video);
    let mut audio = Track::new_audio("A1", 1);
    audio.add_clip(Clip::new(music, 1, 5.5, 6.5));
    project.add_track(audio);

    let mut rig = rig(project, registry);
    rig.engine.play(Some(0.0)).unwrap();
    complete_load(&mut rig.engine);
    rig.surface.0.lock().position = 5.0;
    rig.engine.handle_event(SurfaceEvent::Ended);
    assert_eq!(rig.engine.state(), PlaybackState::Playing);

    // Cross into the audio clip's window.
    rig.engine.advance(0.25); // 5.25
    assert!(rig.backend.opened.lock().is_empty());
    rig.engine.advance(0.25); // 5.5
    {
        let opened = rig.backend.opened.lock();
        assert_eq!(opened.len(), 1);
        assert!(opened[0].0.lock().playing);
        assert_eq!(opened[0].0.lock().path, std::path::PathBuf::from("/media/sting.wav"));
    }

    // Past its end the element is stopped and unbound; with nothing left
    // anywhere, playback ends.
    for _ in 0..4 {
        rig.engine.advance(0.25); // → 6.5
    }
    {
        let opened = rig.backend.opened.lock();
        assert!(!opened[0].0.lock().playing);
    }
    assert_eq!(rig.engine.state(), PlaybackState::Idle);
    assert_eq!(ended_count(&rig.events), 1);
}

#[test]
fn destroy_leaves_no_bound_elements() {
    let music = Uuid::new_v4();
    let mut registry = InMemoryRegistry::new();
    registry.insert(MediaInfo::audio(music, "/media/bed.wav", 8.0));

    let mut project = Project::new("AudioOnly", 8.0);
    let mut audio = Track::new_audio("A1", 0);
    audio.add_clip(Clip::new(music, 0, 0.0, 8.0));
    project.add_track(audio);

    let mut rig = rig(project, registry);
    rig.engine.play(None).unwrap();
    assert_eq!(rig.engine.state(), PlaybackState::Playing);
    assert!(rig.backend.opened.lock()[0].0.lock().playing);

    rig.engine.destroy();
    assert_eq!(rig.engine.state(), PlaybackState::Idle);
    assert!(!rig.backend.opened.lock()[0].0.lock().playing);
}

// ── End of timeline ────────────────────────────────────────────

#[test]
fn last_clip_ending_emits_playback_end_once() {
    let a = Uuid::new_v4();
    let mut registry = InMemoryRegistry::new();
    registry.insert(MediaInfo::video(a, "/media/a.mp4", 5.0, 1920, 1080));

    let mut project = Project::new("Single", 5.0);
    let mut track = Track::new_video("V1", 0);
    track.add_clip(Clip::new(a, 0, 0.0, 5.0));
    project.add_track(track);

    let mut rig = rig(project, registry);
    rig.engine.play(Some(0.0)).unwrap();
    complete_load(&mut rig.engine);

    rig.surface.0.lock().position = 5.0;
    rig.engine.handle_event(SurfaceEvent::Ended);

    assert_eq!(rig.engine.state(), PlaybackState::Idle);
    assert_eq!(ended_count(&rig.events), 1);

    // A late duplicate ended signal is a stray and must not re-fire.
    rig.engine.handle_event(SurfaceEvent::Ended);
    assert_eq!(ended_count(&rig.events), 0);
}
