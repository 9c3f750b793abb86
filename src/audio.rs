use crate::errors::AudioError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Track
///
/// The two background tracks: one for the card, one for the letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Birthday,
    Letter,
}

impl Track {
    pub fn file_name(&self) -> &'static str {
        match self {
            Track::Birthday => "happy-birthday-piano.mp3",
            Track::Letter => "bye.mp3",
        }
    }
}

const DEFAULT_VOLUME: f32 = 0.5;

// 1. AudioOutput Contract
/// AudioOutput
///
/// The playback backend. Tracks always loop; `start` replaces whatever was
/// playing. Failures are reported but the music manager only logs them.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn start(&self, source: &Path, volume: f32) -> Result<(), AudioError>;
    fn stop(&self);
    fn set_volume(&self, volume: f32);
}

// 2. Log-only backend (no sound device)
/// LogAudio
///
/// Backend for hosts without audio: every call is traced and succeeds.
#[derive(Clone, Default)]
pub struct LogAudio;

#[async_trait]
impl AudioOutput for LogAudio {
    async fn start(&self, source: &Path, volume: f32) -> Result<(), AudioError> {
        tracing::info!(source = %source.display(), volume, "Background music started");
        Ok(())
    }

    fn stop(&self) {
        tracing::info!("Background music paused");
    }

    fn set_volume(&self, volume: f32) {
        tracing::debug!(volume, "Background music volume changed");
    }
}

#[derive(Debug, Clone, Copy)]
struct MusicState {
    track: Option<Track>,
    playing: bool,
    volume: f32,
}

/// BackgroundMusic
///
/// The audio manager the pages talk to. Fire-and-forget: none of its operations
/// return an error, backend failures end up in the log.
pub struct BackgroundMusic {
    output: Arc<dyn AudioOutput>,
    audio_dir: PathBuf,
    state: Mutex<MusicState>,
}

impl BackgroundMusic {
    pub fn new(output: Arc<dyn AudioOutput>, audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            output,
            audio_dir: audio_dir.into(),
            state: Mutex::new(MusicState {
                track: None,
                playing: false,
                volume: DEFAULT_VOLUME,
            }),
        }
    }

    fn state(&self) -> MusicState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut MusicState)) {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner));
    }

    pub fn is_playing(&self) -> bool {
        self.state().playing
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state().track
    }

    pub fn volume(&self) -> f32 {
        self.state().volume
    }

    /// play
    ///
    /// Starts `track`. Already playing the same track is a no-op; playing another
    /// track stops it first.
    pub async fn play(&self, track: Track) {
        let current = self.state();
        if current.playing && current.track == Some(track) {
            return;
        }
        if current.playing {
            self.output.stop();
        }

        self.update(|s| {
            s.track = Some(track);
            s.playing = false;
        });

        let source = self.audio_dir.join(track.file_name());
        match self.output.start(&source, current.volume).await {
            Ok(()) => self.update(|s| s.playing = true),
            Err(e) => tracing::warn!(error = %e, "Could not play music"),
        }
    }

    pub fn pause(&self) {
        if self.state().playing {
            self.output.stop();
            self.update(|s| s.playing = false);
        }
    }

    /// change_track
    ///
    /// Selects `track`, resuming playback only if music was playing before.
    pub async fn change_track(&self, track: Track) {
        let was_playing = self.is_playing();
        self.pause();
        self.update(|s| s.track = Some(track));
        if was_playing {
            self.play(track).await;
        }
    }

    /// toggle
    ///
    /// Pauses when playing, otherwise resumes the last track (the birthday track
    /// if nothing was ever selected).
    pub async fn toggle(&self) {
        let current = self.state();
        if current.playing {
            self.pause();
        } else {
            self.play(current.track.unwrap_or(Track::Birthday)).await;
        }
    }

    pub fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.update(|s| s.volume = volume);
        self.output.set_volume(volume);
    }
}

/// MusicHandle
///
/// The concrete type used to share the music manager with the action handlers.
pub type MusicHandle = Arc<BackgroundMusic>;
