use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::cancel::CompletionTimers;
use super::effect::SideEffect;
use super::progress::{status_label, ProgressEvent, ProgressSimulator};
use super::time::{Millis, CELEBRATION_MS, COMPLETION_DELAY_MS, MESSAGE_HIDE_MS};
use crate::catalog::{VoiceCatalog, VoiceModel, VoiceModelId};
use crate::error::SessionError;
use crate::kernel::event::HostSignal;
use crate::media::playback::DEFAULT_VOLUME;
use crate::media::{ObjectUrlManager, PlayAttempt, PlayableHandle, PlaybackController, UploadedFile};
use crate::memory::history::{HistoryRecord, HistoryStore};

/// Externally visible state of the upload -> convert -> play flow.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    FileSelected,
    ModelSelected,
    Converting { progress: f64 },
    Completed(PlayableHandle),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FileSelected => "file selected",
            SessionState::ModelSelected => "model selected",
            SessionState::Converting { .. } => "converting",
            SessionState::Completed(_) => "completed",
        }
    }
}

#[derive(Debug)]
enum Phase {
    Selecting,
    /// The model is fixed when the run starts; later selections apply to the
    /// next run.
    Converting { model: VoiceModel },
    Completed,
    Disposed,
}

/// Orchestrates one user's conversions. Owns every timer, every handle and
/// the playback controller, so teardown can reclaim all of them.
#[derive(Debug)]
pub struct ConversionSession {
    catalog: VoiceCatalog,
    file: Option<UploadedFile>,
    model: Option<VoiceModelId>,
    phase: Phase,
    simulator: ProgressSimulator,
    timers: CompletionTimers,
    urls: ObjectUrlManager,
    player: PlaybackController,
    history: HistoryStore,
    show_completion_message: bool,
    show_celebration: bool,
    effects: Vec<SideEffect>,
    /// Stamps history records. The only wall-clock read in the kernel.
    wall_clock: fn() -> DateTime<Utc>,
}

impl ConversionSession {
    pub fn new(catalog: VoiceCatalog, history: HistoryStore, initial_volume: f64) -> Self {
        Self {
            catalog,
            file: None,
            model: None,
            phase: Phase::Selecting,
            simulator: ProgressSimulator::new(),
            timers: CompletionTimers::new(),
            urls: ObjectUrlManager::new(),
            player: PlaybackController::new(initial_volume),
            history,
            show_completion_message: false,
            show_celebration: false,
            effects: Vec::new(),
            wall_clock: Utc::now,
        }
    }

    /// Replaces the source of history timestamps.
    pub fn with_wall_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.wall_clock = clock;
        self
    }

    pub fn with_defaults() -> Self {
        Self::new(VoiceCatalog::builtin(), HistoryStore::in_memory(), DEFAULT_VOLUME)
    }

    fn guard(&self, operation: &'static str) -> Result<(), SessionError> {
        if matches!(self.phase, Phase::Disposed) {
            return Err(SessionError::InvalidTransition {
                operation,
                state: "disposed",
            });
        }
        Ok(())
    }

    /// Replaces the file from any state. An in-flight run is cancelled and the
    /// current output is released.
    pub fn select_file(&mut self, file: UploadedFile) -> Result<(), SessionError> {
        self.guard("select a file")?;
        self.cancel_all();
        self.player.unload(&mut self.urls);
        self.sync_media();
        info!(file = file.name(), size = %file.display_size(), "file selected");
        self.file = Some(file);
        self.phase = Phase::Selecting;
        Ok(())
    }

    pub fn select_model(&mut self, id: VoiceModelId) -> Result<(), SessionError> {
        self.guard("select a model")?;
        let model = self.catalog.get(id).ok_or(SessionError::UnknownModel(id.0))?;
        info!(model = %model.name, "model selected");
        self.model = Some(id);
        Ok(())
    }

    pub fn start_conversion(&mut self, now: Millis) -> Result<(), SessionError> {
        self.guard("start a conversion")?;
        let rejected = |state: &SessionState| SessionError::InvalidTransition {
            operation: "start a conversion",
            state: state.name(),
        };
        if matches!(self.phase, Phase::Converting { .. }) || self.file.is_none() {
            return Err(rejected(&self.state()));
        }
        let Some(model) = self.model.and_then(|id| self.catalog.get(id)).cloned() else {
            return Err(rejected(&self.state()));
        };

        self.cancel_all();
        let run = self.simulator.start(now);
        info!(run, model = %model.name, "conversion started");
        self.phase = Phase::Converting { model };
        self.effects.push(SideEffect::Progress {
            percent: 0.0,
            label: status_label(0.0),
        });
        Ok(())
    }

    /// Points the output at a past conversion. File and model selection are
    /// left alone.
    pub fn select_history_entry(&mut self, id: &str) -> Result<(), SessionError> {
        self.guard("select a history entry")?;
        let unavailable = || SessionError::HistorySourceUnavailable(id.to_string());
        let record = self.history.get(id).ok_or_else(unavailable)?;
        let source = record.source().cloned().ok_or_else(unavailable)?;
        let title = record.converted_file_name.clone();

        self.player.unload(&mut self.urls);
        let handle = self.urls.acquire(&source);
        self.player.load(handle, title, &mut self.urls);
        self.sync_media();
        info!(record = id, "history entry selected");
        Ok(())
    }

    /// Runs every timer due at or before `now`.
    pub fn advance(&mut self, now: Millis) {
        if matches!(self.phase, Phase::Disposed) {
            return;
        }

        for event in self.simulator.advance(now) {
            match event {
                ProgressEvent::Advanced { percent, .. } => {
                    debug!(percent, "progress");
                    self.effects.push(SideEffect::Progress {
                        percent,
                        label: status_label(percent),
                    });
                }
                ProgressEvent::Completed { at } => {
                    self.timers.completion.arm(at.after(COMPLETION_DELAY_MS));
                    self.set_completion_message(true);
                    self.set_celebration(true);
                }
            }
        }

        if let Some(at) = self.timers.completion.fire(now) {
            self.finish_conversion(at);
        }
        if self.timers.message_hide.fire(now).is_some() {
            self.set_completion_message(false);
        }
        if self.timers.celebration.fire(now).is_some() {
            self.set_celebration(false);
        }
    }

    fn finish_conversion(&mut self, at: Millis) {
        let Phase::Converting { model } = std::mem::replace(&mut self.phase, Phase::Selecting) else {
            warn!("completion fired outside a conversion, ignoring");
            return;
        };
        let Some(file) = self.file.clone() else {
            warn!("completion fired without a file, ignoring");
            return;
        };

        let title = format!("{} ({})", file.base_name(), model.name);
        // Previous output goes before the new one is minted.
        self.player.unload(&mut self.urls);
        let handle = self.urls.acquire(&file);
        let record = HistoryRecord::new(title.clone(), model.name.clone(), &handle, (self.wall_clock)());
        let record_id = record.id.clone();
        self.history.append(record);
        self.player.load(handle, title.clone(), &mut self.urls);
        self.sync_media();

        self.phase = Phase::Completed;
        self.timers.message_hide.arm(at.after(MESSAGE_HIDE_MS));
        self.timers.celebration.arm(at.after(CELEBRATION_MS));
        info!(%title, "conversion finished");
        self.effects.push(SideEffect::ConversionFinished { title, record_id });
    }

    pub fn play(&mut self) -> Result<PlayAttempt, SessionError> {
        self.guard("play")?;
        let attempt = self.player.play();
        self.sync_media();
        attempt
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.guard("pause")?;
        let result = self.player.pause();
        self.sync_media();
        result
    }

    pub fn seek(&mut self, seconds: f64) -> Result<f64, SessionError> {
        self.guard("seek")?;
        let result = self.player.seek(seconds);
        self.sync_media();
        result
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<f64, SessionError> {
        self.guard("set volume")?;
        let result = self.player.set_volume(volume);
        self.sync_media();
        result
    }

    pub fn on_host(&mut self, signal: HostSignal) -> Result<(), SessionError> {
        self.guard("handle a host signal")?;
        let result = match signal {
            HostSignal::MetadataLoaded {
                handle,
                duration_seconds,
            } => {
                self.player.on_metadata(handle, duration_seconds);
                Ok(())
            }
            HostSignal::TimeUpdate {
                handle,
                position_seconds,
            } => {
                self.player.on_time_update(handle, position_seconds);
                Ok(())
            }
            HostSignal::Ended { handle } => {
                self.player.on_ended(handle);
                Ok(())
            }
            HostSignal::PlaySettled { attempt, result } => self.player.settle_play(attempt, result),
            HostSignal::VisibilityChanged { visible } => match self.player.set_visible(visible) {
                Some(Err(e)) => Err(e),
                _ => Ok(()),
            },
        };
        self.sync_media();
        result
    }

    /// Stops the ticker and every chained timer of the current run.
    pub fn cancel_all(&mut self) {
        let ticker = self.simulator.cancel();
        let chained = self.timers.cancel_all();
        if ticker || chained > 0 {
            debug!(ticker, chained, "pending timers cancelled");
        }
        self.set_completion_message(false);
        self.set_celebration(false);
    }

    /// Mandatory teardown: no timer left pending, no handle left live.
    pub fn dispose(&mut self) {
        if matches!(self.phase, Phase::Disposed) {
            return;
        }
        self.cancel_all();
        self.player.unload(&mut self.urls);
        self.sync_media();
        self.urls.release_all();
        self.phase = Phase::Disposed;
        info!(
            acquired = self.urls.acquired_total(),
            released = self.urls.released_total(),
            "session disposed"
        );
    }

    pub fn take_effects(&mut self) -> Vec<SideEffect> {
        std::mem::take(&mut self.effects)
    }

    fn sync_media(&mut self) {
        self.effects
            .extend(self.player.take_commands().into_iter().map(SideEffect::Media));
    }

    fn set_completion_message(&mut self, shown: bool) {
        if self.show_completion_message != shown {
            self.show_completion_message = shown;
            self.effects.push(SideEffect::CompletionMessage(shown));
        }
    }

    fn set_celebration(&mut self, shown: bool) {
        if self.show_celebration != shown {
            self.show_celebration = shown;
            self.effects.push(SideEffect::Celebration(shown));
        }
    }

    pub fn state(&self) -> SessionState {
        match &self.phase {
            Phase::Converting { .. } => {
                return SessionState::Converting {
                    progress: self.simulator.percent(),
                }
            }
            Phase::Completed => {
                if let Some(handle) = self.player.handle() {
                    return SessionState::Completed(handle.clone());
                }
            }
            Phase::Selecting | Phase::Disposed => {}
        }
        match (&self.file, &self.model) {
            (Some(_), Some(_)) => SessionState::ModelSelected,
            (Some(_), None) => SessionState::FileSelected,
            (None, _) => SessionState::Idle,
        }
    }

    pub fn can_convert(&self) -> bool {
        matches!(self.phase, Phase::Selecting | Phase::Completed)
            && self.file.is_some()
            && self.model.is_some()
    }

    pub fn is_converting(&self) -> bool {
        matches!(self.phase, Phase::Converting { .. })
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.phase, Phase::Disposed)
    }

    /// True while the ticker or any chained timer could still fire.
    pub fn has_pending_timers(&self) -> bool {
        self.simulator.is_running() || self.timers.any_pending()
    }

    pub fn progress(&self) -> f64 {
        self.simulator.percent()
    }

    pub fn status_label(&self) -> &'static str {
        self.simulator.label()
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn selected_model(&self) -> Option<&VoiceModel> {
        self.model.and_then(|id| self.catalog.get(id))
    }

    pub fn output_title(&self) -> Option<&str> {
        self.player.handle().map(|_| self.player.title())
    }

    pub fn show_completion_message(&self) -> bool {
        self.show_completion_message
    }

    pub fn show_celebration(&self) -> bool {
        self.show_celebration
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn player(&self) -> &PlaybackController {
        &self.player
    }

    pub fn urls(&self) -> &ObjectUrlManager {
        &self.urls
    }
}

impl Drop for ConversionSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
