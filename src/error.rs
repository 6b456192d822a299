use thiserror::Error;

/// Every failure the conversion kernel can report.
///
/// None of these are fatal. The reactor turns them into notices and keeps
/// stepping; callers that drive a `ConversionSession` directly can treat an
/// `Err` as "ignored, nothing changed".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The host refused to start playback (autoplay policy and similar).
    #[error("playback was rejected: {reason}")]
    PlaybackRejected { reason: String },

    /// The operation is not allowed in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    /// Transport controls are inert until metadata has loaded.
    #[error("{operation} ignored: no audio is ready")]
    NotReady { operation: &'static str },

    #[error("history persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("unknown voice model id {0}")]
    UnknownModel(u32),

    #[error("unsupported media `{name}` ({media_type})")]
    UnsupportedMedia { name: String, media_type: String },

    /// History entries restored from a previous session carry no audio.
    #[error("history entry {0} has no playable source in this session")]
    HistorySourceUnavailable(String),
}
