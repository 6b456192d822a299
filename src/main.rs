use std::io::Cursor;

use anyhow::Context;
use timbre::catalog::{VoiceCatalog, VoiceModelId};
use timbre::config::AppConfig;
use timbre::kernel::event::{Event, InputEvent};
use timbre::kernel::reactor::{Reactor, ReactorConfig};
use timbre::kernel::session::ConversionSession;
use timbre::media::upload::guess_media_type;
use timbre::media::UploadedFile;
use timbre::memory::history::HistoryStore;
use timbre::memory::store::{FileStore, KeyValueStore};
use timbre::outputs::simulated_host::SimulatedHost;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Two seconds of a 440 Hz tone, for running the demo without any input file.
fn demo_tone() -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut bytes = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec)?;
        for n in 0..spec.sample_rate * 2 {
            let t = n as f32 / spec.sample_rate as f32;
            let sample = (t * 440.0 * std::f32::consts::TAU).sin() * 0.3;
            writer.write_sample((sample * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }
    Ok(bytes)
}

fn demo_file(config: &AppConfig) -> anyhow::Result<UploadedFile> {
    let file = match &config.demo_file {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "input".to_string());
            let media_type = guess_media_type(&name).unwrap_or_default();
            UploadedFile::new(name, media_type, bytes)?
        }
        None => UploadedFile::new("clip.wav", "audio/wav", demo_tone()?)?,
    };
    Ok(file)
}

fn open_history(config: &AppConfig) -> HistoryStore {
    let store: Option<Box<dyn KeyValueStore + Send>> = match &config.store_path {
        Some(path) => match FileStore::open(path) {
            Ok(store) => Some(Box::new(store)),
            Err(e) => {
                tracing::warn!("History store unavailable, keeping history in memory: {}", e);
                None
            }
        },
        None => None,
    };
    let mut history = HistoryStore::new(store, config.history_key.clone());
    history.load();
    history
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("Timbre session booting...");

    let config = AppConfig::from_env();
    let history = open_history(&config);
    for record in history.list() {
        tracing::info!(
            "[HISTORY] {} {} <- {} ({})",
            record.time_label(),
            record.converted_file_name,
            record.original_file_name,
            record.model_name
        );
    }

    let session = ConversionSession::new(VoiceCatalog::builtin(), history, config.initial_volume);
    let (tx, rx) = mpsc::channel(100);
    let mut reactor = Reactor::new(
        rx,
        tx.clone(),
        session,
        ReactorConfig {
            cadence_ms: config.cadence_ms,
        },
    );

    let shutdown = reactor.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, tearing down");
            shutdown.cancel();
        }
    });

    // Scripted user: pick a file, pick a model, press convert.
    let file = demo_file(&config)?;
    tracing::info!("Demo input: {} ({})", file.name(), file.display_size());
    for input in [
        InputEvent::FileSelected(file),
        InputEvent::ModelSelected(VoiceModelId(config.demo_model)),
        InputEvent::ConvertRequested,
    ] {
        tx.send(Event::Input(input)).await?;
    }

    let mut host = SimulatedHost::new(true, true);
    reactor.run(&mut host).await;

    Ok(())
}
