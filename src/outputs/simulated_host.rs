use std::collections::HashMap;
use std::io::Cursor;

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::kernel::event::{Event, HostSignal, InputEvent};
use crate::kernel::reactor::MediaHost;
use crate::media::{HandleId, MediaCommand};

/// Used when the bytes are not a WAV file hound can read.
pub const FALLBACK_DURATION_SECS: f64 = 3.0;

/// Length of a WAV payload in seconds.
pub fn probe_duration(bytes: &[u8]) -> Option<f64> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).ok()?;
    let rate = reader.spec().sample_rate;
    if rate == 0 {
        return None;
    }
    Some(reader.duration() as f64 / rate as f64)
}

struct Playing {
    handle: HandleId,
    since: Instant,
    from: f64,
    stop: CancellationToken,
}

/// Stands in for the page's audio element: loads report metadata, plays
/// always succeed, and the track ends after its real duration.
pub struct SimulatedHost {
    durations: HashMap<HandleId, f64>,
    current: Option<HandleId>,
    position: f64,
    volume: f64,
    playing: Option<Playing>,
    autoplay: bool,
    exit_after_playback: bool,
}

impl SimulatedHost {
    pub fn new(autoplay: bool, exit_after_playback: bool) -> Self {
        Self {
            durations: HashMap::new(),
            current: None,
            position: 0.0,
            volume: 1.0,
            playing: None,
            autoplay,
            exit_after_playback,
        }
    }

    fn send(events: &mpsc::Sender<Event>, event: Event) {
        if let Err(e) = events.try_send(event) {
            warn!("Host event dropped: {}", e);
        }
    }

    fn stop(&mut self) -> Option<f64> {
        let playing = self.playing.take()?;
        playing.stop.cancel();
        let position = playing.from + playing.since.elapsed().as_secs_f64();
        let duration = self.durations.get(&playing.handle).copied().unwrap_or(0.0);
        self.position = position.min(duration);
        Some(self.position)
    }

    fn start(&mut self, handle: HandleId, events: &mpsc::Sender<Event>) {
        self.stop();
        let duration = self.durations.get(&handle).copied().unwrap_or(0.0);
        let remaining = (duration - self.position).max(0.0);
        let stop = CancellationToken::new();
        self.playing = Some(Playing {
            handle,
            since: Instant::now(),
            from: self.position,
            stop: stop.clone(),
        });

        debug!(handle = %handle, from = self.position, volume = self.volume, "host playing");
        let tx = events.clone();
        let exit = self.exit_after_playback;
        tokio::spawn(async move {
            tokio::select! {
                _ = sleep(Duration::from_secs_f64(remaining)) => {
                    let _ = tx.send(Event::Host(HostSignal::TimeUpdate { handle, position_seconds: duration })).await;
                    let _ = tx.send(Event::Host(HostSignal::Ended { handle })).await;
                    if exit {
                        info!("demo playback finished");
                        let _ = tx.send(Event::Shutdown).await;
                    }
                }
                _ = stop.cancelled() => {}
            }
        });
    }
}

impl MediaHost for SimulatedHost {
    fn execute(&mut self, command: MediaCommand, events: &mpsc::Sender<Event>) {
        match command {
            MediaCommand::Load(handle) => {
                self.stop();
                let duration = probe_duration(handle.source().bytes()).unwrap_or(FALLBACK_DURATION_SECS);
                info!(url = handle.url(), duration, "host loaded source");
                self.durations.insert(handle.id(), duration);
                self.current = Some(handle.id());
                self.position = 0.0;
                Self::send(
                    events,
                    Event::Host(HostSignal::MetadataLoaded {
                        handle: handle.id(),
                        duration_seconds: duration,
                    }),
                );
                if self.autoplay {
                    Self::send(events, Event::Input(InputEvent::Play));
                }
            }
            MediaCommand::Play { attempt, handle } => {
                let result = if self.current == Some(handle) {
                    self.start(handle, events);
                    Ok(())
                } else {
                    Err("source is not loaded".to_string())
                };
                Self::send(events, Event::Host(HostSignal::PlaySettled { attempt, result }));
            }
            MediaCommand::Pause => {
                if let (Some(position), Some(handle)) = (self.stop(), self.current) {
                    Self::send(
                        events,
                        Event::Host(HostSignal::TimeUpdate {
                            handle,
                            position_seconds: position,
                        }),
                    );
                }
            }
            MediaCommand::Seek(seconds) => {
                let resume = self.playing.as_ref().map(|p| p.handle);
                self.stop();
                self.position = seconds;
                if let Some(handle) = resume {
                    self.start(handle, events);
                }
            }
            MediaCommand::SetVolume(volume) => {
                self.volume = volume;
                debug!(volume, "host volume");
            }
            MediaCommand::Release(id) => {
                if self.current == Some(id) {
                    self.stop();
                    self.current = None;
                }
                self.durations.remove(&id);
                debug!(handle = %id, "host revoked source");
            }
        }
    }
}
