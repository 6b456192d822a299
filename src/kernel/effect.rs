use crate::error::SessionError;
use crate::media::MediaCommand;

/// Everything a kernel step asks the outside world to do. The kernel itself
/// never performs I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Non-fatal problem to surface to the user.
    Notice(SessionError),
    Progress { percent: f64, label: &'static str },
    Media(MediaCommand),
    ConversionFinished { title: String, record_id: String },
    CompletionMessage(bool),
    Celebration(bool),
}
