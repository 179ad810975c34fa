//! Scripted playback backend for headless tests.
//!
//! Records every command the engine issues and lets the test push surface
//! events and move the fake clocks by hand, so state-machine behavior can
//! be exercised without a real media backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use montage_audio::AudioElement;
use montage_core::{MontageError, Result};
use parking_lot::Mutex;

use crate::engine::PlayerBackend;
use crate::surface::VideoSurface;

/// A command the engine issued to the fake surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Attach(PathBuf),
    Seek(f64),
    Play,
    Pause,
    Clear,
    SetRate(f64),
}

/// Observable state of the fake surface.
#[derive(Debug, Default)]
pub struct FakeSurfaceState {
    pub commands: Vec<SurfaceCommand>,
    pub attached: Option<PathBuf>,
    pub playing: bool,
    /// Position reported by [`VideoSurface::position`]; tests move it.
    pub position: f64,
    pub volume: f64,
    pub rate: f64,
    /// Makes the next `attach` fail, for error-path tests.
    pub fail_attach: bool,
}

impl FakeSurfaceState {
    /// Count of `Pause` commands observed.
    pub fn pause_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::Pause))
            .count()
    }

    /// Count of `Attach` commands observed.
    pub fn attach_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::Attach(_)))
            .count()
    }
}

/// Shared-handle fake surface; clone one side into the engine and keep the
/// other to script it.
#[derive(Clone, Default)]
pub struct FakeSurface(pub Arc<Mutex<FakeSurfaceState>>);

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoSurface for FakeSurface {
    fn attach(&mut self, path: &Path) -> Result<()> {
        let mut state = self.0.lock();
        if state.fail_attach {
            return Err(MontageError::Surface("scripted attach failure".into()));
        }
        state.commands.push(SurfaceCommand::Attach(path.to_path_buf()));
        state.attached = Some(path.to_path_buf());
        state.playing = false;
        state.position = 0.0;
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        let mut state = self.0.lock();
        state.commands.push(SurfaceCommand::Seek(seconds));
        state.position = seconds;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.0.lock();
        state.commands.push(SurfaceCommand::Play);
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.0.lock();
        state.commands.push(SurfaceCommand::Pause);
        state.playing = false;
    }

    fn clear(&mut self) {
        let mut state = self.0.lock();
        state.commands.push(SurfaceCommand::Clear);
        state.attached = None;
        state.playing = false;
        state.position = 0.0;
    }

    fn set_rate(&mut self, rate: f64) {
        let mut state = self.0.lock();
        state.commands.push(SurfaceCommand::SetRate(rate));
        state.rate = rate;
    }

    fn set_volume(&mut self, gain: f64) {
        self.0.lock().volume = gain;
    }

    fn position(&self) -> f64 {
        self.0.lock().position
    }
}

/// Observable state of one fake audio element.
#[derive(Debug, Default)]
pub struct FakeAudioState {
    pub path: PathBuf,
    pub playing: bool,
    pub position: f64,
    pub gain: f64,
}

/// Shared-handle fake audio-only player.
#[derive(Clone)]
pub struct FakeAudio(pub Arc<Mutex<FakeAudioState>>);

impl AudioElement for FakeAudio {
    fn play(&mut self) -> Result<()> {
        self.0.lock().playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.0.lock().playing = false;
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        self.0.lock().position = seconds;
        Ok(())
    }

    fn set_gain(&mut self, gain: f64) {
        self.0.lock().gain = gain;
    }
}

/// Backend handing out fake audio players and remembering every one it
/// created so tests can inspect them after the engine unbinds.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub opened: Arc<Mutex<Vec<FakeAudio>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlayerBackend for FakeBackend {
    type Surface = FakeSurface;
    type Audio = FakeAudio;

    fn open_audio(&mut self, path: &Path) -> Result<Self::Audio> {
        let audio = FakeAudio(Arc::new(Mutex::new(FakeAudioState {
            path: path.to_path_buf(),
            gain: 1.0,
            ..Default::default()
        })));
        self.opened.lock().push(audio.clone());
        Ok(audio)
    }
}
