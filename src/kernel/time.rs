use serde::{Deserialize, Serialize};

/// Virtual kernel time in milliseconds since the session started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Millis(pub u64);

/// Cadence of the simulated conversion ticker.
pub const PROGRESS_TICK_MS: u64 = 150;
/// Pause between reaching 100% and finalizing the conversion.
pub const COMPLETION_DELAY_MS: u64 = 1_000;
/// How long the completion message lingers after finalizing.
pub const MESSAGE_HIDE_MS: u64 = 1_000;
/// How long the celebration effect runs after finalizing.
pub const CELEBRATION_MS: u64 = 4_000;

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn after(self, ms: u64) -> Self {
        Millis(self.0.saturating_add(ms))
    }
}
