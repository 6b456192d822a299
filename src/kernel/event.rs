use crate::catalog::VoiceModelId;
use crate::media::{HandleId, PlayAttempt, UploadedFile};

#[derive(Debug, Clone)]
pub enum Event {
    /// User actions (file picker, model list, buttons, sliders).
    Input(InputEvent),
    /// Answers and notifications from the host media element / page.
    Host(HostSignal),
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    FileSelected(UploadedFile),
    ModelSelected(VoiceModelId),
    ConvertRequested,
    HistorySelected(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostSignal {
    MetadataLoaded { handle: HandleId, duration_seconds: f64 },
    TimeUpdate { handle: HandleId, position_seconds: f64 },
    Ended { handle: HandleId },
    PlaySettled { attempt: PlayAttempt, result: Result<(), String> },
    VisibilityChanged { visible: bool },
}
