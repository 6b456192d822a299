use serde::Serialize;
use tracing::{debug, info, warn};

use super::object_url::{HandleId, ObjectUrlManager, PlayableHandle};
use crate::error::SessionError;

pub const DEFAULT_VOLUME: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackPhase {
    Unloaded,
    Loading,
    ReadyPaused,
    ReadyPlaying,
    Ended,
}

impl PlaybackPhase {
    pub fn name(self) -> &'static str {
        match self {
            PlaybackPhase::Unloaded => "unloaded",
            PlaybackPhase::Loading => "loading",
            PlaybackPhase::ReadyPaused => "paused",
            PlaybackPhase::ReadyPlaying => "playing",
            PlaybackPhase::Ended => "ended",
        }
    }

    pub fn is_ready(self) -> bool {
        matches!(
            self,
            PlaybackPhase::ReadyPaused | PlaybackPhase::ReadyPlaying | PlaybackPhase::Ended
        )
    }
}

/// Snapshot for rendering transport controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub volume: f64,
    pub is_ready: bool,
}

impl PlaybackState {
    /// `m:ss`
    pub fn format_time(seconds: f64) -> String {
        let total = if seconds.is_finite() { seconds.max(0.0) as u64 } else { 0 };
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Identifies one call to `play()`. The host answers with the same id, so a
/// late answer for a superseded attempt can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlayAttempt(pub u64);

/// What the host media element has to do.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Load(PlayableHandle),
    Play { attempt: PlayAttempt, handle: HandleId },
    Pause,
    Seek(f64),
    SetVolume(f64),
    Release(HandleId),
}

/// Owns the single playable audio session and the handle behind it.
#[derive(Debug)]
pub struct PlaybackController {
    phase: PlaybackPhase,
    handle: Option<PlayableHandle>,
    title: String,
    position: f64,
    duration: f64,
    volume: f64,
    visible: bool,
    resume_on_show: bool,
    attempts: u64,
    pending: Option<PlayAttempt>,
    commands: Vec<MediaCommand>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

impl PlaybackController {
    pub fn new(initial_volume: f64) -> Self {
        Self {
            phase: PlaybackPhase::Unloaded,
            handle: None,
            title: String::new(),
            position: 0.0,
            duration: 0.0,
            volume: clamp_unit(initial_volume),
            visible: true,
            resume_on_show: false,
            attempts: 0,
            pending: None,
            commands: Vec::new(),
        }
    }

    /// Swaps in a new handle: pause, release the old one, then load.
    pub fn load(&mut self, handle: PlayableHandle, title: impl Into<String>, urls: &mut ObjectUrlManager) {
        self.drop_current(urls);
        self.title = title.into();
        info!(handle = %handle.id(), title = %self.title, "loading output");
        self.commands.push(MediaCommand::Load(handle.clone()));
        self.handle = Some(handle);
        self.phase = PlaybackPhase::Loading;
    }

    pub fn unload(&mut self, urls: &mut ObjectUrlManager) {
        if self.handle.is_some() {
            info!(title = %self.title, "unloading output");
        }
        self.drop_current(urls);
        self.title.clear();
    }

    fn drop_current(&mut self, urls: &mut ObjectUrlManager) {
        if self.phase == PlaybackPhase::ReadyPlaying {
            self.commands.push(MediaCommand::Pause);
        }
        if let Some(old) = self.handle.take() {
            urls.release(Some(&old));
            self.commands.push(MediaCommand::Release(old.id()));
        }
        self.phase = PlaybackPhase::Unloaded;
        self.position = 0.0;
        self.duration = 0.0;
        self.pending = None;
        self.resume_on_show = false;
    }

    fn is_current(&self, id: HandleId) -> bool {
        self.handle.as_ref().is_some_and(|h| h.id() == id)
    }

    /// Metadata for the loaded handle: Loading -> ReadyPaused.
    pub fn on_metadata(&mut self, id: HandleId, duration_seconds: f64) -> bool {
        if !self.is_current(id) || self.phase != PlaybackPhase::Loading {
            debug!(handle = %id, "ignoring stale metadata");
            return false;
        }
        self.duration = if duration_seconds.is_finite() { duration_seconds.max(0.0) } else { 0.0 };
        self.position = 0.0;
        self.phase = PlaybackPhase::ReadyPaused;
        self.commands.push(MediaCommand::SetVolume(self.volume));
        debug!(handle = %id, duration = self.duration, "metadata loaded");
        true
    }

    pub fn on_time_update(&mut self, id: HandleId, position_seconds: f64) {
        if self.is_current(id) && self.phase.is_ready() {
            self.position = self.clamp_position(position_seconds);
        }
    }

    /// Natural end of track: ReadyPlaying -> Ended with position = duration.
    pub fn on_ended(&mut self, id: HandleId) -> bool {
        if !self.is_current(id) || self.phase != PlaybackPhase::ReadyPlaying {
            debug!(handle = %id, "ignoring stale end of track");
            return false;
        }
        self.phase = PlaybackPhase::Ended;
        self.position = self.duration;
        self.pending = None;
        true
    }

    /// Optimistically enters ReadyPlaying; the host settles the attempt later.
    pub fn play(&mut self) -> Result<PlayAttempt, SessionError> {
        match self.phase {
            PlaybackPhase::ReadyPaused => {}
            PlaybackPhase::Ended => {
                self.position = 0.0;
                self.commands.push(MediaCommand::Seek(0.0));
            }
            PlaybackPhase::ReadyPlaying => {
                return Err(SessionError::InvalidTransition {
                    operation: "play",
                    state: self.phase.name(),
                })
            }
            PlaybackPhase::Unloaded | PlaybackPhase::Loading => {
                return Err(SessionError::NotReady { operation: "play" })
            }
        }
        let Some(handle) = self.handle.as_ref().map(|h| h.id()) else {
            return Err(SessionError::NotReady { operation: "play" });
        };
        // An explicit play settles whatever was remembered on hide.
        self.resume_on_show = false;
        self.attempts += 1;
        let attempt = PlayAttempt(self.attempts);
        self.pending = Some(attempt);
        self.phase = PlaybackPhase::ReadyPlaying;
        self.commands.push(MediaCommand::Play { attempt, handle });
        Ok(attempt)
    }

    /// Resolution of a play attempt. A rejection reverts to ReadyPaused and is
    /// handed back as an error; answers for superseded attempts are dropped.
    pub fn settle_play(&mut self, attempt: PlayAttempt, result: Result<(), String>) -> Result<(), SessionError> {
        if self.pending != Some(attempt) {
            debug!(attempt = attempt.0, "ignoring stale play result");
            return Ok(());
        }
        self.pending = None;
        match result {
            Ok(()) => Ok(()),
            Err(reason) => {
                if self.phase == PlaybackPhase::ReadyPlaying {
                    self.phase = PlaybackPhase::ReadyPaused;
                }
                warn!(attempt = attempt.0, %reason, "playback rejected");
                Err(SessionError::PlaybackRejected { reason })
            }
        }
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.phase != PlaybackPhase::ReadyPlaying {
            return Err(SessionError::InvalidTransition {
                operation: "pause",
                state: self.phase.name(),
            });
        }
        self.resume_on_show = false;
        self.pause_now();
        Ok(())
    }

    fn pause_now(&mut self) {
        self.phase = PlaybackPhase::ReadyPaused;
        self.pending = None;
        self.commands.push(MediaCommand::Pause);
    }

    /// Clamps to [0, duration]. Seeking back from Ended leaves the track paused.
    pub fn seek(&mut self, seconds: f64) -> Result<f64, SessionError> {
        if !self.phase.is_ready() {
            return Err(SessionError::NotReady { operation: "seek" });
        }
        self.position = self.clamp_position(seconds);
        if self.phase == PlaybackPhase::Ended && self.position < self.duration {
            self.phase = PlaybackPhase::ReadyPaused;
        }
        self.commands.push(MediaCommand::Seek(self.position));
        Ok(self.position)
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<f64, SessionError> {
        if !self.phase.is_ready() {
            return Err(SessionError::NotReady { operation: "set volume" });
        }
        self.volume = clamp_unit(volume);
        self.commands.push(MediaCommand::SetVolume(self.volume));
        Ok(self.volume)
    }

    /// Pause when hidden, resume on show if we were playing when hidden.
    pub fn set_visible(&mut self, visible: bool) -> Option<Result<PlayAttempt, SessionError>> {
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        if !visible {
            self.resume_on_show = self.phase == PlaybackPhase::ReadyPlaying;
            if self.resume_on_show {
                debug!("hidden while playing, pausing");
                self.pause_now();
            }
            return None;
        }
        if std::mem::take(&mut self.resume_on_show) {
            debug!("visible again, resuming");
            return Some(self.play());
        }
        None
    }

    pub fn take_commands(&mut self) -> Vec<MediaCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            is_playing: self.phase == PlaybackPhase::ReadyPlaying,
            position_seconds: self.position,
            duration_seconds: self.duration,
            volume: self.volume,
            is_ready: self.phase.is_ready(),
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn handle(&self) -> Option<&PlayableHandle> {
        self.handle.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn resume_pending(&self) -> bool {
        self.resume_on_show
    }

    fn clamp_position(&self, seconds: f64) -> f64 {
        if seconds.is_nan() {
            return 0.0;
        }
        seconds.clamp(0.0, self.duration)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Suggested file name when saving the output: `Clip (Robotic Voice)` ->
/// `clip-(robotic-voice).mp3`.
pub fn download_name(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}.mp3", slug)
}
