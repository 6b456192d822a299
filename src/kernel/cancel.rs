use super::time::Millis;

/// A one-shot timer slot. Firing or cancelling empties it, so a deadline can
/// never fire twice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Millis>,
}

impl Deadline {
    pub fn arm(&mut self, at: Millis) {
        self.at = Some(at);
    }

    /// Returns true if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.at.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    pub fn at(&self) -> Option<Millis> {
        self.at
    }

    /// Consumes the deadline if `now` has reached it and returns the instant
    /// it was scheduled for.
    pub fn fire(&mut self, now: Millis) -> Option<Millis> {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                Some(at)
            }
            _ => None,
        }
    }
}

/// The chained timers that follow a finished progress run: the completion
/// delay, then the two cosmetic clean-ups it schedules.
#[derive(Debug, Default)]
pub struct CompletionTimers {
    pub completion: Deadline,
    pub message_hide: Deadline,
    pub celebration: Deadline,
}

impl CompletionTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every pending timer. Returns how many were pending.
    pub fn cancel_all(&mut self) -> usize {
        [
            self.completion.cancel(),
            self.message_hide.cancel(),
            self.celebration.cancel(),
        ]
        .iter()
        .filter(|pending| **pending)
        .count()
    }

    pub fn any_pending(&self) -> bool {
        self.completion.is_armed() || self.message_hide.is_armed() || self.celebration.is_armed()
    }
}
