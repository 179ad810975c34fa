//! Program synthesis — compile a project into an executable export plan.
//!
//! The output timeline is modeled as a fixed-length base layer (blank
//! video + silent audio spanning the full project duration) onto which
//! every clip is composited as a time-windowed overlay or mix
//! contribution. Gaps therefore render as black/silence instead of
//! shrinking the output, and the timing rules are the same half-open
//! intervals the preview resolves.

use std::collections::HashMap;
use std::path::PathBuf;

use montage_core::{MontageError, Result};
use montage_media::{MediaKind, MediaRegistry, MediaRegistryExt};
use montage_timeline::{Clip, Project, Track, TrackKind};
use tracing::debug;

use crate::filter::{FilterChain, FilterGraph, FilterOp};
use crate::settings::{self, bitrate_mbps_for_height, ExportSettings};

/// One encoder input.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanInput {
    /// A referenced source file.
    File(PathBuf),
    /// A generated source (the blank/silent base layer), given as a
    /// lavfi source spec; the plan's duration bounds it at spawn time.
    Synthetic(String),
}

/// A validated, executable composition program.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub inputs: Vec<PlanInput>,
    pub graph: FilterGraph,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    /// Output duration in seconds — always the full project duration.
    pub duration: f64,
    /// Assumed output bitrate for the disk-space estimate.
    pub bitrate_mbps: f64,
    pub output_path: PathBuf,
}

/// Index of the blank video base input.
const BASE_VIDEO_INPUT: usize = 0;
/// Index of the silent audio base input.
const BASE_AUDIO_INPUT: usize = 1;

/// Compile `project` against `registry` into an export plan.
///
/// Fails synchronously on registry misses, an empty project duration, or
/// a program that does not validate; nothing is spawned here.
pub fn synthesize(
    project: &Project,
    registry: &dyn MediaRegistry,
    settings: &ExportSettings,
) -> Result<ExportPlan> {
    if project.duration <= 0.0 {
        return Err(MontageError::InvalidParameter(
            "project duration must be positive".into(),
        ));
    }

    let video_clips = collect_video_clips(&project.tracks);
    let audio_clips = collect_audio_clips(&project.tracks, registry)?;

    let native = first_native_resolution(&video_clips, registry);
    let (width, height) = settings.resolution.dimensions(native);

    let mut inputs = vec![
        PlanInput::Synthetic(format!(
            "color=c=black:s={width}x{height}:r={fps}",
            fps = settings.frame_rate
        )),
        PlanInput::Synthetic(format!(
            "anullsrc=channel_layout=stereo:sample_rate={}",
            settings::AUDIO_SAMPLE_RATE
        )),
    ];
    let mut input_index: HashMap<PathBuf, usize> = HashMap::new();

    let mut graph = FilterGraph::new();

    // Video: trim each clip to its used source range, shift it onto the
    // output clock, scale, and overlay it only inside its own window.
    // Chained sequentially so each clip affects nothing outside its window.
    let mut upstream = format!("{BASE_VIDEO_INPUT}:v");
    let clip_count = video_clips.len();
    for (i, clip) in video_clips.iter().enumerate() {
        let media = registry.require(clip.media_id)?;
        let index = register_input(&mut inputs, &mut input_index, media.path.clone());

        let label = format!("v{i}");
        graph.push(FilterChain::new(
            [format!("{index}:v")],
            vec![
                FilterOp::Trim {
                    start: clip.trim_start,
                    end: clip.source_out(media.duration),
                },
                FilterOp::SetPtsOffset {
                    offset: clip.start_time,
                },
                FilterOp::Scale { width, height },
            ],
            label.clone(),
        ));

        let out = if i + 1 == clip_count {
            "vout".to_string()
        } else {
            format!("ov{i}")
        };
        graph.push(FilterChain::new(
            [upstream.clone(), label],
            vec![FilterOp::Overlay {
                from: clip.start_time,
                until: clip.end_time,
            }],
            out.clone(),
        ));
        upstream = out;
    }
    if video_clips.is_empty() {
        graph.push(FilterChain::new(
            [upstream],
            vec![FilterOp::Null],
            "vout",
        ));
    }

    // Audio: every audio-bearing clip (video-with-audio or audio-only, on
    // any track) is trimmed, delayed to its start time, leveled, and
    // summed with the silent base. The base keeps the mix at full project
    // length.
    let mut mix_inputs = vec![format!("{BASE_AUDIO_INPUT}:a")];
    for (j, (clip, gain)) in audio_clips.iter().enumerate() {
        let media = registry.require(clip.media_id)?;
        let index = register_input(&mut inputs, &mut input_index, media.path.clone());

        let label = format!("a{j}");
        graph.push(FilterChain::new(
            [format!("{index}:a")],
            vec![
                FilterOp::ATrim {
                    start: clip.trim_start,
                    end: clip.source_out(media.duration),
                },
                FilterOp::AResetPts,
                FilterOp::Volume { gain: *gain },
                FilterOp::Delay {
                    millis: (clip.start_time * 1000.0).round() as u64,
                },
            ],
            label.clone(),
        ));
        mix_inputs.push(label);
    }
    if mix_inputs.len() > 1 {
        let n = mix_inputs.len();
        graph.push(FilterChain::new(
            mix_inputs,
            vec![FilterOp::AMix { inputs: n }],
            "aout",
        ));
    } else {
        graph.push(FilterChain::new(
            mix_inputs,
            vec![FilterOp::ANull],
            "aout",
        ));
    }

    graph.validate()?;
    debug!(
        video = clip_count,
        audio = audio_clips.len(),
        duration = project.duration,
        "synthesized export plan"
    );

    Ok(ExportPlan {
        inputs,
        graph,
        width,
        height,
        frame_rate: settings.frame_rate,
        duration: project.duration,
        bitrate_mbps: bitrate_mbps_for_height(height),
        output_path: settings.output_path.clone(),
    })
}

impl ExportPlan {
    /// Full FFmpeg argument list for this plan.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into()];

        for input in &self.inputs {
            match input {
                PlanInput::File(path) => {
                    args.push("-i".into());
                    args.push(path.to_string_lossy().into_owned());
                }
                PlanInput::Synthetic(spec) => {
                    args.push("-f".into());
                    args.push("lavfi".into());
                    args.push("-t".into());
                    args.push(format!("{:.4}", self.duration));
                    args.push("-i".into());
                    args.push(spec.clone());
                }
            }
        }

        args.push("-filter_complex".into());
        args.push(self.graph.render());
        args.extend(["-map".into(), "[vout]".into(), "-map".into(), "[aout]".into()]);

        args.extend([
            "-c:v".into(),
            settings::VIDEO_CODEC.into(),
            "-preset".into(),
            settings::VIDEO_PRESET.into(),
            "-crf".into(),
            settings::VIDEO_CRF.to_string(),
            "-pix_fmt".into(),
            settings::PIXEL_FORMAT.into(),
            "-r".into(),
            self.frame_rate.to_string(),
        ]);
        args.extend([
            "-c:a".into(),
            settings::AUDIO_CODEC.into(),
            "-b:a".into(),
            settings::AUDIO_BITRATE.into(),
            "-ar".into(),
            settings::AUDIO_SAMPLE_RATE.to_string(),
        ]);

        // Bound the output at the authoritative project duration.
        args.extend(["-t".into(), format!("{:.4}", self.duration)]);

        args.extend([
            "-progress".into(),
            "pipe:1".into(),
            "-nostats".into(),
            "-loglevel".into(),
            "error".into(),
        ]);

        args.push(self.output_path.to_string_lossy().into_owned());
        args
    }

    /// Paths of every referenced source file.
    pub fn source_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.inputs.iter().filter_map(|input| match input {
            PlanInput::File(path) => Some(path),
            PlanInput::Synthetic(_) => None,
        })
    }
}

fn register_input(
    inputs: &mut Vec<PlanInput>,
    index: &mut HashMap<PathBuf, usize>,
    path: PathBuf,
) -> usize {
    *index.entry(path.clone()).or_insert_with(|| {
        inputs.push(PlanInput::File(path));
        inputs.len() - 1
    })
}

/// Video-track clips in compositing order: lower tracks first, then by
/// start time, so higher tracks overlay lower ones.
fn collect_video_clips(tracks: &[Track]) -> Vec<&Clip> {
    let mut sorted_tracks: Vec<&Track> = tracks
        .iter()
        .filter(|t| t.kind == TrackKind::Video)
        .collect();
    sorted_tracks.sort_by_key(|t| t.index);

    let mut clips = Vec::new();
    for track in sorted_tracks {
        let mut on_track: Vec<&Clip> = track.clips.iter().collect();
        on_track.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        clips.extend(on_track);
    }
    clips
}

/// Audio-bearing clips on any track, paired with their resolved gain
/// (clip volume × track volume, zero when muted).
fn collect_audio_clips<'a>(
    tracks: &'a [Track],
    registry: &dyn MediaRegistry,
) -> Result<Vec<(&'a Clip, f64)>> {
    let mut clips = Vec::new();
    for track in tracks {
        for clip in &track.clips {
            let media = registry.require(clip.media_id)?;
            if media.has_audio {
                clips.push((clip, track.gain_for(clip)));
            }
        }
    }
    clips.sort_by(|(a, _), (b, _)| a.start_time.total_cmp(&b.start_time));
    Ok(clips)
}

fn first_native_resolution(
    video_clips: &[&Clip],
    registry: &dyn MediaRegistry,
) -> Option<(u32, u32)> {
    video_clips.iter().find_map(|clip| {
        let media = registry.lookup(clip.media_id)?;
        if media.kind == MediaKind::Video {
            Some((media.width?, media.height?))
        } else {
            None
        }
    })
}
