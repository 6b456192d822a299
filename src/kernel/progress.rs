use tracing::debug;

use super::cancel::Deadline;
use super::time::{Millis, PROGRESS_TICK_MS};

pub const PREPARING_LABEL: &str = "Preparing…";

/// Highest satisfied threshold wins.
pub const STATUS_LABELS: [(f64, &str); 5] = [
    (10.0, "Analyzing audio file…"),
    (30.0, "Processing voice patterns…"),
    (60.0, "Applying voice model…"),
    (85.0, "Finalizing conversion…"),
    (100.0, "Conversion complete!"),
];

pub fn status_label(percent: f64) -> &'static str {
    STATUS_LABELS
        .iter()
        .rev()
        .find(|(threshold, _)| percent >= *threshold)
        .map(|(_, label)| *label)
        .unwrap_or(PREPARING_LABEL)
}

/// Tiered increment: slow start, faster middle, slow finish.
pub fn step_for(percent: f64) -> f64 {
    if percent < 30.0 {
        1.0
    } else if percent < 60.0 {
        1.5
    } else if percent < 90.0 {
        2.0
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    Advanced { percent: f64, at: Millis },
    /// Emitted exactly once per run, right after the tick that reached 100.
    Completed { at: Millis },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorStatus {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Timed, cancelable fake conversion. Owns its ticker deadline; nothing else
/// can drive `percent`.
#[derive(Debug)]
pub struct ProgressSimulator {
    percent: f64,
    status: SimulatorStatus,
    next_tick: Deadline,
    run: u64,
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSimulator {
    pub fn new() -> Self {
        Self {
            percent: 0.0,
            status: SimulatorStatus::Idle,
            next_tick: Deadline::default(),
            run: 0,
        }
    }

    /// Starts a fresh run at 0%. A run still in flight is cancelled first.
    /// Returns the new run number.
    pub fn start(&mut self, now: Millis) -> u64 {
        if self.status == SimulatorStatus::Running {
            self.cancel();
        }
        self.run += 1;
        self.percent = 0.0;
        self.status = SimulatorStatus::Running;
        self.next_tick.arm(now.after(PROGRESS_TICK_MS));
        debug!(run = self.run, "progress run started");
        self.run
    }

    /// Stops emission without completing. Safe to call repeatedly and after
    /// natural completion; returns true only when a live run was stopped.
    pub fn cancel(&mut self) -> bool {
        if self.status != SimulatorStatus::Running {
            return false;
        }
        self.next_tick.cancel();
        self.status = SimulatorStatus::Cancelled;
        debug!(run = self.run, percent = self.percent, "progress run cancelled");
        true
    }

    /// Fires every tick due at or before `now`, in order.
    pub fn advance(&mut self, now: Millis) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while self.status == SimulatorStatus::Running {
            let Some(at) = self.next_tick.fire(now) else {
                break;
            };
            self.percent = (self.percent + step_for(self.percent)).min(100.0);
            events.push(ProgressEvent::Advanced {
                percent: self.percent,
                at,
            });

            if self.percent >= 100.0 {
                self.status = SimulatorStatus::Completed;
                events.push(ProgressEvent::Completed { at });
                debug!(run = self.run, "progress run completed");
            } else {
                self.next_tick.arm(at.after(PROGRESS_TICK_MS));
            }
        }
        events
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn label(&self) -> &'static str {
        status_label(self.percent)
    }

    pub fn status(&self) -> SimulatorStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SimulatorStatus::Running
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn next_tick_at(&self) -> Option<Millis> {
        self.next_tick.at()
    }
}
