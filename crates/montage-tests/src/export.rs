//! Export synthesis exercised over realistic projects.
//!
//! Process execution is covered by unit tests in `montage-export`; these
//! tests verify that full projects compile into programs with the same
//! timing rules the preview resolves.

use montage_export::{synthesize, ExportSettings, PlanInput, ProgressParser, ResolutionClass};
use montage_media::{InMemoryRegistry, MediaInfo};
use montage_timeline::{Clip, Project, Track};
use uuid::Uuid;

fn editing_session() -> (Project, InMemoryRegistry) {
    let mut registry = InMemoryRegistry::new();
    let intro = Uuid::new_v4();
    let body = Uuid::new_v4();
    let music = Uuid::new_v4();
    registry.insert(MediaInfo::video(intro, "/media/intro.mp4", 4.0, 1280, 720));
    registry.insert(MediaInfo::video(body, "/media/body.mp4", 12.0, 1920, 1080));
    registry.insert(MediaInfo::audio(music, "/media/music.wav", 60.0));

    // intro [0,4), gap [4,6), body [6,14); music under everything.
    let mut project = Project::new("Session", 15.0);

    let mut video = Track::new_video("V1", 0);
    video.add_clip(Clip::new(intro, 0, 0.0, 4.0));
    let mut main = Clip::new(body, 0, 6.0, 14.0);
    main.trim_start = 2.0;
    main.trim_end = 2.0;
    video.add_clip(main);
    project.add_track(video);

    let mut audio = Track::new_audio("A1", 1);
    audio.volume = 0.5;
    let mut bed = Clip::new(music, 1, 0.0, 15.0);
    bed.trim_end = 45.0;
    bed.volume = 0.8;
    audio.add_clip(bed);
    project.add_track(audio);

    (project, registry)
}

#[test]
fn full_session_compiles_into_one_valid_program() {
    let (project, registry) = editing_session();
    let plan = synthesize(&project, &registry, &ExportSettings::new("/tmp/session.mp4")).unwrap();

    assert!(plan.graph.validate().is_ok());
    assert_eq!(plan.duration, 15.0);

    let rendered = plan.graph.render();
    // Both video windows are present and non-overlapping with the gap.
    assert!(rendered.contains("between(t,0.0000,4.0000)"));
    assert!(rendered.contains("between(t,6.0000,14.0000)"));
    // The trimmed body clip reads its source from 2s to 10s.
    assert!(rendered.contains("trim=start=2.0000:end=10.0000"));
    assert!(rendered.contains("setpts=PTS-STARTPTS+6.0000/TB"));
    // Audio contributions: intro, body, and music over the silent base.
    assert!(rendered.contains("amix=inputs=4:duration=longest"));
    // Music gain = 0.8 clip × 0.5 track.
    assert!(rendered.contains("volume=0.4000"));
}

#[test]
fn gap_renders_from_the_base_layer_not_by_shrinking() {
    let (project, registry) = editing_session();
    let plan = synthesize(&project, &registry, &ExportSettings::new("/tmp/session.mp4")).unwrap();

    // The base layer is bounded by the full project duration, so the
    // [4,6) gap and the [14,15) tail come out black/silent.
    let args = plan.ffmpeg_args();
    assert!(args.iter().any(|a| a == "15.0000"));
    let synthetic = plan
        .inputs
        .iter()
        .filter(|i| matches!(i, PlanInput::Synthetic(_)))
        .count();
    assert_eq!(synthetic, 2);
}

#[test]
fn export_resolution_follows_first_video_source() {
    let (project, registry) = editing_session();
    let settings = ExportSettings::new("/tmp/session.mp4")
        .with_resolution(ResolutionClass::Source)
        .with_frame_rate(25);
    let plan = synthesize(&project, &registry, &settings).unwrap();

    // First referenced video is the 720p intro.
    assert_eq!((plan.width, plan.height), (1280, 720));
    assert_eq!(plan.frame_rate, 25);
    assert!(plan.graph.render().contains("scale=1280:720"));
}

#[test]
fn encoder_configuration_is_fixed_h264_aac() {
    let (project, registry) = editing_session();
    let plan = synthesize(&project, &registry, &ExportSettings::new("/tmp/session.mp4")).unwrap();
    let args = plan.ffmpeg_args();

    let pairs: Vec<(&str, &str)> = args
        .windows(2)
        .map(|w| (w[0].as_str(), w[1].as_str()))
        .collect();
    assert!(pairs.contains(&("-c:v", "libx264")));
    assert!(pairs.contains(&("-c:a", "aac")));
    assert!(pairs.contains(&("-map", "[vout]")));
    assert!(pairs.contains(&("-map", "[aout]")));
    assert!(pairs.contains(&("-progress", "pipe:1")));
    assert_eq!(args.last().unwrap(), "/tmp/session.mp4");
}

#[test]
fn progress_stream_maps_to_percent_of_project_duration() {
    let (project, registry) = editing_session();
    let plan = synthesize(&project, &registry, &ExportSettings::new("/tmp/session.mp4")).unwrap();

    let mut parser = ProgressParser::new(plan.duration);
    let update = parser.parse_line("out_time_ms=7500000", 3.0).unwrap();
    assert!((update.percent - 50.0).abs() < 0.01);
    assert!(update.time_remaining.is_some());
}
