//! The playback state machine.
//!
//! States: `Idle` (not playing), `Loading` (a clip's media is being
//! attached and positioned), `Playing` (advancing; surface active or
//! intentionally blank for a gap), `Transitioning` (handling end-of-clip;
//! re-entrant calls are rejected), `Seeking` (a user seek is outstanding).
//!
//! Two rules keep the racing event sources honest:
//!
//! 1. Clip-to-clip transitions are event-driven only. The surface `Ended`
//!    event is the sole trigger — the advance loop never polls the
//!    timeline boundary, which would race when two clips abut exactly.
//! 2. Every externally-triggered callback re-checks the engine state
//!    before acting; stray or late events are dropped, not trusted.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use montage_audio::{AudioElement, AudioGraph, FadeEnvelope};
use montage_core::{format_clock, Result};
use montage_media::{MediaInfo, MediaRegistry, MediaRegistryExt};
use montage_timeline::{next_clip_after, resolve_at, Clip, Project, TrackKind};

use crate::surface::{SurfaceEvent, VideoSurface};

/// How long to wait for `Seeked` before assuming the surface silently
/// completed the seek.
const SEEK_FALLBACK_SECS: f64 = 1.0;

/// Lookahead window for background-attaching an upcoming clip while the
/// surface sits blank in a gap, in timeline seconds.
const PRELOAD_HORIZON_SECS: f64 = 0.5;

/// Host integration point: the one video surface the engine owns, plus
/// on-demand audio-only players for audio-track clips.
pub trait PlayerBackend {
    type Surface: VideoSurface;
    type Audio: AudioElement;

    /// Open an audio-only player for the given file.
    fn open_audio(&mut self, path: &std::path::Path) -> Result<Self::Audio>;
}

/// Engine state. Initial: `Idle`. No terminal state; the engine is
/// reusable until [`PlaybackEngine::destroy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Playing,
    Transitioning,
    Seeking,
}

/// Notification to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Current playhead position in seconds; high-frequency.
    Playhead(f64),
    /// Playback reached the end of the timeline (or failed terminally);
    /// emitted once per play session.
    Ended,
}

/// Which reply the in-flight load handshake is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadStep {
    CanPlay,
    Seeked,
    Started,
}

enum Pending {
    /// Attaching and positioning a clip on the surface.
    Load {
        clip: Clip,
        offset: f64,
        autoplay: bool,
        step: LoadStep,
        since: f64,
    },
    /// A user-initiated in-place seek on the surface.
    Seek { resume: bool, since: f64 },
}

/// The playback engine. One instance owns one render surface and one
/// audio graph; multiple engines are fully independent.
pub struct PlaybackEngine<B: PlayerBackend> {
    backend: B,
    surface: B::Surface,
    audio: AudioGraph<B::Audio>,
    registry: Arc<dyn MediaRegistry>,
    project: Project,

    state: PlaybackState,
    playhead: f64,
    rate: f64,
    master_volume: f64,
    /// Monotonic engine clock, advanced by `advance(dt)`.
    clock: f64,

    /// The video clip the surface is (being) attached to. Recorded before
    /// any asynchronous load completes so re-entrant gap logic is
    /// suppressed during the load race.
    current_clip: Option<Clip>,
    current_media: Option<MediaInfo>,
    /// Source currently attached to the surface, including preloads.
    attached_path: Option<PathBuf>,
    preload_in_flight: bool,
    pending: Option<Pending>,

    /// Playing audio clips by id, with their timeline end. Audio elements
    /// have no `Ended` wiring; the advance loop retires them by position.
    playing_audio: HashMap<Uuid, f64>,
    /// Fade-outs scheduled for graph sources: (source, start clock, duration).
    audio_fades: Vec<(Uuid, f64, f64)>,

    /// Fade envelope for the surface's own audio.
    surface_env: FadeEnvelope,
    /// Scheduled surface fade-out: (start clock, wall-clock duration).
    surface_fade_out_at: Option<(f64, f64)>,

    events: Sender<PlaybackEvent>,
}

impl<B: PlayerBackend> PlaybackEngine<B> {
    /// Create an engine over a backend, its surface, and a media registry.
    /// Returns the engine plus the UI event receiver.
    pub fn new(
        backend: B,
        surface: B::Surface,
        registry: Arc<dyn MediaRegistry>,
        project: Project,
    ) -> (Self, Receiver<PlaybackEvent>) {
        let (events, rx) = unbounded();
        let engine = Self {
            backend,
            surface,
            audio: AudioGraph::new(),
            registry,
            project,
            state: PlaybackState::Idle,
            playhead: 0.0,
            rate: 1.0,
            master_volume: 1.0,
            clock: 0.0,
            current_clip: None,
            current_media: None,
            attached_path: None,
            preload_in_flight: false,
            pending: None,
            playing_audio: HashMap::new(),
            audio_fades: Vec::new(),
            surface_env: FadeEnvelope::new(),
            surface_fade_out_at: None,
            events,
        };
        (engine, rx)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn is_playing(&self) -> bool {
        !matches!(self.state, PlaybackState::Idle)
    }

    /// Swap in a fresh project snapshot. The model is never partially
    /// mutated; edits arrive wholesale through here.
    pub fn update_project(&mut self, project: Project) {
        self.project = project;
        self.preload_in_flight = false;
        if let Some(current) = &self.current_clip {
            let still_there = self
                .project
                .tracks
                .iter()
                .flat_map(|t| t.clips.iter())
                .any(|c| c.id == current.id);
            if !still_there {
                debug!("current clip removed by edit; blanking surface");
                self.pause();
                self.current_clip = None;
                self.current_media = None;
                self.attached_path = None;
                self.surface.clear();
            }
        }
    }

    // ── Transport operations ───────────────────────────────────────

    /// Start playback, optionally from a new position.
    pub fn play(&mut self, start_time: Option<f64>) -> Result<()> {
        if self.state == PlaybackState::Transitioning {
            warn!("play() ignored while a clip transition is in flight");
            return Ok(());
        }
        if self.state == PlaybackState::Playing && start_time.is_none() {
            return Ok(());
        }
        if let Some(t) = start_time {
            self.playhead = t.clamp(0.0, self.project.duration);
        }

        let video = resolve_at(&self.project.tracks, self.playhead)
            .video
            .cloned();

        self.sync_audio_clips();

        match video {
            Some(clip) => self.begin_load(clip, true),
            None => {
                let has_future = next_clip_after(&self.project.tracks, self.playhead).is_some();
                if has_future || !self.playing_audio.is_empty() {
                    // Gap: stay in Playing with a blank surface and let the
                    // advance loop detect the next clip's arrival.
                    self.surface.clear();
                    self.current_clip = None;
                    self.current_media = None;
                    self.attached_path = None;
                    self.state = PlaybackState::Playing;
                    info!(playhead = self.playhead, "playing through gap");
                } else {
                    debug!("play() found nothing now or later");
                    self.end_playback();
                }
            }
        }
        Ok(())
    }

    /// Stop playback. Idempotent; also one of the two cancellation
    /// primitives (the other is `seek`).
    pub fn pause(&mut self) {
        self.surface.pause();
        self.audio.unbind_all();
        self.playing_audio.clear();
        self.audio_fades.clear();
        self.pending = None;
        self.preload_in_flight = false;
        self.state = PlaybackState::Idle;
    }

    /// Move the playhead. Pauses first if playing, repositions or reloads
    /// the surface, always emits a playhead update, and resumes if
    /// playback was active.
    pub fn seek(&mut self, time: f64) -> Result<()> {
        if self.state == PlaybackState::Transitioning {
            warn!("seek() ignored while a clip transition is in flight");
            return Ok(());
        }
        let was_playing = matches!(
            self.state,
            PlaybackState::Playing | PlaybackState::Loading | PlaybackState::Seeking
        );
        if was_playing {
            self.pause();
        }
        self.playhead = time.clamp(0.0, self.project.duration);
        self.emit_playhead();
        debug!(to = %format_clock(self.playhead), "seek");

        let target = resolve_at(&self.project.tracks, self.playhead)
            .video
            .cloned();

        match target {
            Some(clip) => {
                let same_clip = self.current_clip.as_ref().map(|c| c.id) == Some(clip.id)
                    && self.attached_path.is_some();
                if same_clip {
                    // Cheap in-place seek on the already-attached source.
                    let media = match &self.current_media {
                        Some(m) => m.clone(),
                        None => self.registry.require(clip.media_id)?,
                    };
                    let offset = clip.source_offset_at(self.playhead, media.duration);
                    self.state = PlaybackState::Seeking;
                    self.pending = Some(Pending::Seek {
                        resume: was_playing,
                        since: self.clock,
                    });
                    if let Err(e) = self.surface.seek(offset) {
                        self.pending = None;
                        self.state = PlaybackState::Idle;
                        return Err(e);
                    }
                } else if was_playing {
                    self.play(None)?;
                } else {
                    self.begin_load(clip, false);
                }
            }
            None => {
                self.surface.clear();
                self.current_clip = None;
                self.current_media = None;
                self.attached_path = None;
                if was_playing {
                    self.play(None)?;
                }
            }
        }
        Ok(())
    }

    /// Playback rate multiplier.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate.clamp(0.25, 4.0);
        self.surface.set_rate(self.rate);
    }

    /// Master output volume, clamped to [0, 1].
    pub fn set_volume(&mut self, volume: f64) {
        self.master_volume = volume.clamp(0.0, 1.0);
        self.audio.set_master_volume(self.master_volume, self.clock);
        self.apply_surface_volume();
    }

    /// Tear the engine down: pause, unbind every audio source, release
    /// the surface. No bound-but-orphaned element survives this call.
    pub fn destroy(&mut self) {
        self.pause();
        self.surface.clear();
        self.current_clip = None;
        self.current_media = None;
        self.attached_path = None;
        info!("playback engine destroyed");
    }

    // ── Surface events ─────────────────────────────────────────────

    /// Feed a surface event into the state machine. The host forwards
    /// these from its media backend; fakes push them directly in tests.
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::CanPlay => self.on_can_play(),
            SurfaceEvent::Seeked => self.on_seeked(),
            SurfaceEvent::Started => self.on_started(),
            SurfaceEvent::Ended => self.on_ended(),
            SurfaceEvent::Error(message) => self.on_surface_error(message),
        }
    }

    fn on_can_play(&mut self) {
        // Preload completions and stray readiness signals also land here.
        if self.state != PlaybackState::Loading {
            return;
        }
        let offset = match &self.pending {
            Some(Pending::Load {
                step: LoadStep::CanPlay,
                offset,
                ..
            }) => *offset,
            _ => return,
        };
        match self.surface.seek(offset) {
            Ok(()) => {
                if let Some(Pending::Load { step, since, .. }) = &mut self.pending {
                    *step = LoadStep::Seeked;
                    *since = self.clock;
                }
            }
            Err(e) => {
                error!("surface seek failed during load: {e}");
                self.end_playback();
            }
        }
    }

    fn on_seeked(&mut self) {
        match self.state {
            PlaybackState::Seeking => {
                let Some(Pending::Seek { resume, .. }) = self.pending.take() else {
                    return;
                };
                self.state = PlaybackState::Idle;
                self.emit_playhead();
                if resume {
                    if let Err(e) = self.play(None) {
                        error!("failed to resume after seek: {e}");
                        self.end_playback();
                    }
                }
            }
            PlaybackState::Loading => {
                if matches!(
                    self.pending,
                    Some(Pending::Load {
                        step: LoadStep::Seeked,
                        ..
                    })
                ) {
                    self.finish_positioning();
                }
            }
            _ => {}
        }
    }

    fn on_started(&mut self) {
        let Some(Pending::Load {
            step: LoadStep::Started,
            ..
        }) = &self.pending
        else {
            return;
        };
        let Some(Pending::Load { clip, offset, .. }) = self.pending.take() else {
            return;
        };
        self.state = PlaybackState::Playing;
        let offset_in_clip = offset - clip.trim_start;
        self.schedule_surface_fades(&clip, offset_in_clip);
        self.apply_surface_volume();
        debug!(
            clip = %clip.id,
            playhead = self.playhead,
            "clip playing"
        );
    }

    fn on_ended(&mut self) {
        // Sole trigger for same-track clip transitions. Guarded: a stray
        // or late event (paused, mid-load, or no clip attached) is dropped.
        if self.state != PlaybackState::Playing || self.current_clip.is_none() {
            debug!("ignoring stray ended event");
            return;
        }
        self.state = PlaybackState::Transitioning;

        let Some(ended) = self.current_clip.take() else {
            return;
        };
        self.playhead = ended.end_time;
        self.emit_playhead();
        self.sync_audio_clips();

        let next = resolve_at(&self.project.tracks, self.playhead)
            .video
            .cloned();
        match next {
            Some(clip) => {
                debug!(from = %ended.id, to = %clip.id, "seamless clip transition");
                self.begin_load(clip, true);
            }
            None => {
                if next_clip_after(&self.project.tracks, self.playhead).is_some() {
                    // Gap ahead: blank the surface and keep advancing.
                    self.surface.clear();
                    self.current_media = None;
                    self.attached_path = None;
                    self.state = PlaybackState::Playing;
                } else {
                    self.end_playback();
                }
            }
        }
    }

    fn on_surface_error(&mut self, message: String) {
        error!("render surface error: {message}");
        self.end_playback();
    }

    // ── Advance loop ───────────────────────────────────────────────

    /// Advance one display tick. `dt` is wall-clock seconds since the
    /// previous tick. Republishes position and walks gaps; never decides
    /// clip transitions.
    pub fn advance(&mut self, dt: f64) {
        self.clock += dt;
        self.audio.tick(self.clock);
        self.fire_due_audio_fades();
        self.check_pending_timeout();

        if self.state != PlaybackState::Playing {
            return;
        }

        if let Some(clip) = self.current_clip.clone() {
            // The surface's native clock is ground truth while a clip is
            // attached; a wall-clock integration would drift against it.
            self.playhead = clip.start_time + (self.surface.position() - clip.trim_start);
            self.apply_surface_volume();
            self.emit_playhead();
            self.sync_audio_clips();
        } else {
            self.playhead += dt * self.rate;
            self.emit_playhead();

            if self.playhead >= self.project.duration {
                debug!("reached project end in gap");
                self.end_playback();
                return;
            }

            self.sync_audio_clips();

            let arrived = resolve_at(&self.project.tracks, self.playhead)
                .video
                .cloned();
            if let Some(clip) = arrived {
                // begin_load records the clip as current before the
                // asynchronous load completes, closing the gap-race window.
                debug!(clip = %clip.id, "clip arrived during gap");
                self.begin_load(clip, true);
            } else {
                self.maybe_preload();
                if next_clip_after(&self.project.tracks, self.playhead).is_none()
                    && self.playing_audio.is_empty()
                {
                    self.end_playback();
                }
            }
        }
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn begin_load(&mut self, clip: Clip, autoplay: bool) {
        let media = match self.registry.require(clip.media_id) {
            Ok(m) => m,
            Err(e) => {
                error!(clip = %clip.id, "cannot load clip: {e}");
                self.end_playback();
                return;
            }
        };
        if !clip.trim_consistent(media.duration) {
            warn!(clip = %clip.id, "clip trim does not match source duration");
        }

        let position = self.playhead.max(clip.start_time);
        let offset = clip.source_offset_at(position, media.duration);
        let already_attached = self.attached_path.as_deref() == Some(media.path.as_path());

        self.state = PlaybackState::Loading;
        self.preload_in_flight = false;
        self.current_clip = Some(clip.clone());
        self.current_media = Some(media.clone());
        self.surface_env.set_level(1.0);
        self.surface_fade_out_at = None;

        if already_attached {
            // Preloaded, or the neighboring clip shares the source file:
            // skip straight to positioning.
            match self.surface.seek(offset) {
                Ok(()) => {
                    self.pending = Some(Pending::Load {
                        clip,
                        offset,
                        autoplay,
                        step: LoadStep::Seeked,
                        since: self.clock,
                    });
                }
                Err(e) => {
                    error!("surface seek failed: {e}");
                    self.end_playback();
                }
            }
        } else {
            match self.surface.attach(&media.path) {
                Ok(()) => {
                    self.attached_path = Some(media.path.clone());
                    self.pending = Some(Pending::Load {
                        clip,
                        offset,
                        autoplay,
                        step: LoadStep::CanPlay,
                        since: self.clock,
                    });
                }
                Err(e) => {
                    error!("surface attach failed: {e}");
                    self.end_playback();
                }
            }
        }
    }

    /// The surface is positioned; either start playback or settle back to
    /// idle for a paused load.
    fn finish_positioning(&mut self) {
        let Some(Pending::Load {
            clip,
            offset,
            autoplay,
            ..
        }) = self.pending.take()
        else {
            return;
        };
        if !autoplay {
            self.state = PlaybackState::Idle;
            return;
        }
        match self.surface.play() {
            Ok(()) => {
                self.surface.set_rate(self.rate);
                self.pending = Some(Pending::Load {
                    clip,
                    offset,
                    autoplay,
                    step: LoadStep::Started,
                    since: self.clock,
                });
            }
            Err(e) => {
                error!("surface play failed: {e}");
                self.end_playback();
            }
        }
    }

    /// Bounded fallback: surfaces occasionally swallow `Seeked`; after a
    /// timeout the handshake proceeds as if it had arrived.
    fn check_pending_timeout(&mut self) {
        let load_timed_out = matches!(
            &self.pending,
            Some(Pending::Load {
                step: LoadStep::Seeked,
                since,
                ..
            }) if self.clock - since > SEEK_FALLBACK_SECS
        );
        if load_timed_out {
            warn!("seek completion timed out; continuing load");
            self.finish_positioning();
            return;
        }
        let seek_timed_out = matches!(
            &self.pending,
            Some(Pending::Seek { since, .. }) if self.clock - since > SEEK_FALLBACK_SECS
        );
        if seek_timed_out {
            warn!("seek completion timed out; settling");
            self.on_seeked();
        }
    }

    /// Start audio clips whose window the playhead has entered and retire
    /// the ones it has passed.
    fn sync_audio_clips(&mut self) {
        let playhead = self.playhead;

        let expired: Vec<Uuid> = self
            .playing_audio
            .iter()
            .filter(|(_, &end)| playhead >= end)
            .map(|(&id, _)| id)
            .collect();
        for id in expired {
            debug!(source = %id, "audio clip finished");
            self.audio.unbind(id);
            self.playing_audio.remove(&id);
            self.audio_fades.retain(|(fid, _, _)| *fid != id);
        }

        let to_start: Vec<Clip> = resolve_at(&self.project.tracks, playhead)
            .audio
            .iter()
            .filter(|c| !self.playing_audio.contains_key(&c.id))
            .map(|c| (*c).clone())
            .collect();
        for clip in to_start {
            if let Err(e) = self.start_audio_clip(&clip) {
                error!(clip = %clip.id, "failed to start audio clip: {e}");
            }
        }
    }

    fn start_audio_clip(&mut self, clip: &Clip) -> Result<()> {
        if self.audio.is_bound(clip.id) {
            warn!(clip = %clip.id, "audio clip already bound; skipping");
            return Ok(());
        }
        let media = self.registry.require(clip.media_id)?;

        // Lazy activation; a failure here is tolerated by pushing volumes
        // directly at the element instead of erroring the whole play call.
        if let Err(e) = self.audio.resume() {
            warn!("audio graph activation failed, using direct element volume: {e}");
        }

        let mut element = self.backend.open_audio(&media.path)?;
        let offset = clip.source_offset_at(self.playhead.max(clip.start_time), media.duration);
        element.seek(offset)?;

        let gain = self.track_gain(clip);
        self.audio.bind(clip.id, element, gain);

        let offset_in_clip = (self.playhead - clip.start_time).max(0.0);
        if clip.fade_in > 0.0 && offset_in_clip < clip.fade_in {
            let from = offset_in_clip / clip.fade_in;
            let remaining = (clip.fade_in - offset_in_clip) / self.rate;
            self.audio.apply_fade_in(clip.id, from, remaining, self.clock);
        }
        if clip.fade_out > 0.0 {
            self.schedule_audio_fade_out(clip, offset_in_clip);
        }

        self.audio.play(clip.id)?;
        self.playing_audio.insert(clip.id, clip.end_time);
        debug!(clip = %clip.id, offset, "audio clip playing");
        Ok(())
    }

    fn schedule_audio_fade_out(&mut self, clip: &Clip, offset_in_clip: f64) {
        let span = clip.span();
        let window_start = span - clip.fade_out;
        if clip.fade_out >= span || offset_in_clip >= window_start {
            // Already inside the window (or the fade outlasts the clip):
            // ramp immediately from the proportionally-remaining level.
            let remaining = (span - offset_in_clip).max(0.0);
            let from = (remaining / clip.fade_out).clamp(0.0, 1.0);
            self.audio
                .apply_fade_out(clip.id, from, remaining / self.rate, self.clock);
        } else {
            let delay = (window_start - offset_in_clip) / self.rate;
            self.audio_fades
                .push((clip.id, self.clock + delay, clip.fade_out / self.rate));
        }
    }

    fn fire_due_audio_fades(&mut self) {
        let clock = self.clock;
        let due: Vec<(Uuid, f64)> = self
            .audio_fades
            .iter()
            .filter(|(_, at, _)| clock >= *at)
            .map(|(id, _, dur)| (*id, *dur))
            .collect();
        if due.is_empty() {
            return;
        }
        self.audio_fades.retain(|(_, at, _)| clock < *at);
        for (id, duration) in due {
            self.audio.apply_fade_out(id, 1.0, duration, clock);
        }
    }

    fn schedule_surface_fades(&mut self, clip: &Clip, offset_in_clip: f64) {
        self.surface_env.set_level(1.0);
        self.surface_fade_out_at = None;

        if clip.fade_in > 0.0 && offset_in_clip < clip.fade_in {
            let from = (offset_in_clip / clip.fade_in).clamp(0.0, 1.0);
            let remaining = (clip.fade_in - offset_in_clip) / self.rate;
            self.surface_env.ramp(from, 1.0, remaining, self.clock);
        }

        if clip.fade_out > 0.0 {
            let span = clip.span();
            let window_start = span - clip.fade_out;
            if clip.fade_out >= span || offset_in_clip >= window_start {
                let remaining = (span - offset_in_clip).max(0.0);
                let from = (remaining / clip.fade_out).clamp(0.0, 1.0);
                self.surface_env.ramp(from, 0.0, remaining / self.rate, self.clock);
            } else {
                let delay = (window_start - offset_in_clip) / self.rate;
                self.surface_fade_out_at =
                    Some((self.clock + delay, clip.fade_out / self.rate));
            }
        }
    }

    fn apply_surface_volume(&mut self) {
        if let Some((at, duration)) = self.surface_fade_out_at {
            if self.clock >= at {
                let from = self.surface_env.value_at(self.clock);
                self.surface_env.ramp(from, 0.0, duration, self.clock);
                self.surface_fade_out_at = None;
            }
        }
        let gain = match &self.current_clip {
            Some(clip) => self.track_gain(clip),
            None => 1.0,
        };
        let level = self.surface_env.value_at(self.clock);
        self.surface.set_volume(gain * level * self.master_volume);
    }

    /// Background-attach an upcoming primary-track video clip while the
    /// surface is blank, so the eventual transition starts faster. Guarded
    /// by a single in-flight flag; purely an optimization.
    fn maybe_preload(&mut self) {
        if self.preload_in_flight {
            return;
        }
        let next = match next_clip_after(&self.project.tracks, self.playhead) {
            Some(c) => c.clone(),
            None => return,
        };
        if next.start_time - self.playhead > PRELOAD_HORIZON_SECS {
            return;
        }
        if !self.is_primary_video_clip(&next) {
            return;
        }
        let Ok(media) = self.registry.require(next.media_id) else {
            // The arrival path will surface the lookup error properly.
            return;
        };
        if self.surface.attach(&media.path).is_ok() {
            debug!(clip = %next.id, "preloading upcoming clip");
            self.attached_path = Some(media.path);
            self.preload_in_flight = true;
        }
    }

    fn is_primary_video_clip(&self, clip: &Clip) -> bool {
        let primary = self
            .project
            .tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Video)
            .map(|t| t.index)
            .min();
        self.project
            .tracks
            .iter()
            .find(|t| t.index == clip.track_index)
            .map(|t| t.kind == TrackKind::Video && Some(t.index) == primary)
            .unwrap_or(false)
    }

    fn track_gain(&self, clip: &Clip) -> f64 {
        self.project
            .tracks
            .iter()
            .find(|t| t.index == clip.track_index)
            .map(|t| t.gain_for(clip))
            .unwrap_or(if clip.muted { 0.0 } else { clip.volume })
    }

    fn emit_playhead(&self) {
        let _ = self.events.send(PlaybackEvent::Playhead(self.playhead));
    }

    fn end_playback(&mut self) {
        self.pause();
        let _ = self.events.send(PlaybackEvent::Ended);
    }
}

impl<B: PlayerBackend> Drop for PlaybackEngine<B> {
    fn drop(&mut self) {
        self.audio.unbind_all();
    }
}
