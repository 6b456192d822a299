use timbre::kernel::progress::{status_label, step_for, ProgressEvent, ProgressSimulator, SimulatorStatus};
use timbre::kernel::time::{Millis, PROGRESS_TICK_MS};

fn completions(events: &[ProgressEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
        .count()
}

fn percents(events: &[ProgressEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Advanced { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect()
}

#[test]
fn test_status_labels_follow_thresholds() {
    let expected = [
        (0.0, "Preparing…"),
        (9.0, "Preparing…"),
        (10.0, "Analyzing audio file…"),
        (29.0, "Analyzing audio file…"),
        (30.0, "Processing voice patterns…"),
        (59.0, "Processing voice patterns…"),
        (60.0, "Applying voice model…"),
        (84.0, "Applying voice model…"),
        (85.0, "Finalizing conversion…"),
        (99.0, "Finalizing conversion…"),
        (100.0, "Conversion complete!"),
    ];
    for (percent, label) in expected {
        assert_eq!(status_label(percent), label, "label at {}%", percent);
    }
}

#[test]
fn test_step_tiers() {
    assert_eq!(step_for(0.0), 1.0);
    assert_eq!(step_for(29.0), 1.0);
    assert_eq!(step_for(30.0), 1.5);
    assert_eq!(step_for(58.5), 1.5);
    assert_eq!(step_for(60.0), 2.0);
    assert_eq!(step_for(88.0), 2.0);
    assert_eq!(step_for(90.0), 1.0);
    assert_eq!(step_for(99.0), 1.0);
}

#[test]
fn test_tick_by_tick_is_monotonic_bounded_and_completes_once() {
    let mut sim = ProgressSimulator::new();
    sim.start(Millis(0));

    let mut all = Vec::new();
    let mut now = Millis(0);
    for _ in 0..200 {
        now = now.after(PROGRESS_TICK_MS);
        all.extend(sim.advance(now));
    }

    let values = percents(&all);
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "progress must never go down");
    assert!(values.iter().all(|p| (0.0..=100.0).contains(p)));
    assert_eq!(values.last().copied(), Some(100.0));
    assert_eq!(values.len(), 75, "30 + 20 + 15 + 10 ticks");
    assert_eq!(completions(&all), 1);
    assert_eq!(sim.status(), SimulatorStatus::Completed);
    assert_eq!(sim.next_tick_at(), None);
}

#[test]
fn test_completion_follows_the_hundred_percent_tick() {
    let mut sim = ProgressSimulator::new();
    sim.start(Millis(0));

    let events = sim.advance(Millis(75 * PROGRESS_TICK_MS));
    let n = events.len();
    assert_eq!(
        events[n - 2],
        ProgressEvent::Advanced { percent: 100.0, at: Millis(75 * PROGRESS_TICK_MS) }
    );
    assert_eq!(events[n - 1], ProgressEvent::Completed { at: Millis(75 * PROGRESS_TICK_MS) });

    // Nothing more after completion.
    assert!(sim.advance(Millis(1_000_000)).is_empty());
}

#[test]
fn test_no_tick_before_cadence() {
    let mut sim = ProgressSimulator::new();
    sim.start(Millis(1_000));
    assert!(sim.advance(Millis(1_149)).is_empty());
    let events = sim.advance(Millis(1_150));
    assert_eq!(percents(&events), vec![1.0]);
    assert_eq!(sim.label(), "Preparing…");
}

#[test]
fn test_cancel_prevents_completion_and_is_idempotent() {
    let mut sim = ProgressSimulator::new();
    sim.start(Millis(0));
    sim.advance(Millis(3_000));
    let frozen = sim.percent();

    assert!(sim.cancel());
    assert!(!sim.cancel());
    assert!(!sim.cancel());

    let later = sim.advance(Millis(60_000));
    assert!(later.is_empty(), "cancelled run must stay silent");
    assert_eq!(sim.percent(), frozen);
    assert_eq!(sim.status(), SimulatorStatus::Cancelled);
}

#[test]
fn test_cancel_after_completion_is_noop() {
    let mut sim = ProgressSimulator::new();
    sim.start(Millis(0));
    sim.advance(Millis(20_000));
    assert!(!sim.cancel());
    assert_eq!(sim.status(), SimulatorStatus::Completed);
    assert_eq!(sim.percent(), 100.0);
}

#[test]
fn test_restart_replaces_running_ticker() {
    let mut sim = ProgressSimulator::new();
    let first = sim.start(Millis(0));
    sim.advance(Millis(1_500));
    assert_eq!(sim.percent(), 10.0);

    let second = sim.start(Millis(1_500));
    assert_ne!(first, second);
    assert_eq!(sim.percent(), 0.0);

    // Only one ticker: a single step per cadence from the new start.
    let events = sim.advance(Millis(1_650));
    assert_eq!(percents(&events), vec![1.0]);

    let rest = sim.advance(Millis(1_500 + 75 * PROGRESS_TICK_MS));
    assert_eq!(completions(&rest), 1);
}
