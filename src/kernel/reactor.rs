use tokio::sync::mpsc;
use tokio::time::{interval, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::effect::SideEffect;
use super::event::{Event, InputEvent};
use super::session::ConversionSession;
use super::time::Millis;
use crate::media::MediaCommand;

#[derive(Debug, Clone)]
pub struct ReactorConfig {
    /// How often the driver wakes up to step the kernel.
    pub cadence_ms: u64,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self { cadence_ms: 50 }
    }
}

/// The page-side audio element and UI. Answers go back through `events`.
pub trait MediaHost {
    fn execute(&mut self, command: MediaCommand, events: &mpsc::Sender<Event>);

    /// Sees every other effect, for hosts that render or script around them.
    fn observe(&mut self, _effect: &SideEffect, _events: &mpsc::Sender<Event>) {}
}

pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    pub session: ConversionSession,
    pub clock: Millis,
    config: ReactorConfig,
    shutdown: CancellationToken,
    stopping: bool,
}

impl Reactor {
    pub fn new(
        receiver: mpsc::Receiver<Event>,
        tx: mpsc::Sender<Event>,
        session: ConversionSession,
        config: ReactorConfig,
    ) -> Self {
        Self {
            receiver,
            tx,
            session,
            clock: Millis::ZERO,
            config,
            shutdown: CancellationToken::new(),
            stopping: false,
        }
    }

    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// One synchronous kernel step: apply events in arrival order, then run
    /// timers up to `now`. Never awaits.
    pub fn tick_step(&mut self, now: Millis, events: Vec<Event>) -> Vec<SideEffect> {
        if now > self.clock {
            self.clock = now;
        }
        let mut notices = Vec::new();

        for event in events {
            if let Err(e) = self.apply(event) {
                warn!("{}", e);
                notices.push(SideEffect::Notice(e));
            }
        }

        self.session.advance(self.clock);

        if self.stopping {
            self.session.dispose();
        }

        let mut effects = self.session.take_effects();
        effects.extend(notices);
        effects
    }

    fn apply(&mut self, event: Event) -> Result<(), crate::error::SessionError> {
        match event {
            Event::Input(input) => match input {
                InputEvent::FileSelected(file) => self.session.select_file(file),
                InputEvent::ModelSelected(id) => self.session.select_model(id),
                InputEvent::ConvertRequested => self.session.start_conversion(self.clock),
                InputEvent::HistorySelected(id) => self.session.select_history_entry(&id),
                InputEvent::Play => self.session.play().map(|_| ()),
                InputEvent::Pause => self.session.pause(),
                InputEvent::Seek(seconds) => self.session.seek(seconds).map(|_| ()),
                InputEvent::SetVolume(volume) => self.session.set_volume(volume).map(|_| ()),
            },
            Event::Host(signal) => self.session.on_host(signal),
            Event::Shutdown => {
                info!("shutdown requested");
                self.stopping = true;
                Ok(())
            }
        }
    }

    /// Async driver loop. Runs until `Event::Shutdown` or the shutdown token
    /// fires; the session is always disposed before returning.
    pub async fn run<H: MediaHost>(&mut self, host: &mut H) {
        info!("Reactor started. Cadence: {}ms", self.config.cadence_ms);

        let started = Instant::now();
        let mut cadence = interval(Duration::from_millis(self.config.cadence_ms.max(1)));
        cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let shutdown = self.shutdown.clone();

        loop {
            let cancelled = tokio::select! {
                _ = cadence.tick() => false,
                _ = shutdown.cancelled() => true,
            };
            if cancelled {
                self.stopping = true;
            }

            let mut events = Vec::new();
            while let Ok(event) = self.receiver.try_recv() {
                events.push(event);
            }

            let now = Millis(started.elapsed().as_millis() as u64);
            let effects = self.tick_step(now, events);
            self.dispatch(effects, host);

            if self.stopping {
                break;
            }
        }

        info!(
            live_handles = self.session.urls().live_count(),
            history = self.session.history().len(),
            "Reactor stopped"
        );
    }

    fn dispatch<H: MediaHost>(&mut self, effects: Vec<SideEffect>, host: &mut H) {
        for effect in effects {
            match effect {
                SideEffect::Media(command) => host.execute(command, &self.tx),
                other => {
                    match &other {
                        SideEffect::Notice(e) => info!("[NOTICE] {}", e),
                        SideEffect::Progress { percent, label } => {
                            debug!("[PROGRESS] {:.0}% {}", percent, label)
                        }
                        SideEffect::ConversionFinished { title, .. } => {
                            info!("[OUTPUT] {}", title)
                        }
                        SideEffect::CompletionMessage(_) | SideEffect::Celebration(_) => {}
                        SideEffect::Media(_) => {}
                    }
                    host.observe(&other, &self.tx);
                }
            }
        }
    }
}
