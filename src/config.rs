use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::memory::history::HISTORY_KEY;
use crate::media::playback::DEFAULT_VOLUME;

/// Driver settings. Simulation timings are fixed constants in `kernel::time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub history_key: String,
    /// JSON file backing the history store; in-memory when unset.
    pub store_path: Option<PathBuf>,
    pub cadence_ms: u64,
    pub initial_volume: f64,
    /// Audio file for the scripted demo; a generated tone when unset.
    pub demo_file: Option<PathBuf>,
    pub demo_model: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_key: HISTORY_KEY.to_string(),
            store_path: None,
            cadence_ms: 50,
            initial_volume: DEFAULT_VOLUME,
            demo_file: None,
            demo_model: 2,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `TIMBRE_*` variables. Malformed values are
    /// reported and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup("TIMBRE_STORE") {
            config.store_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("TIMBRE_DEMO_FILE") {
            config.demo_file = Some(PathBuf::from(path));
        }
        if let Some(cadence) = parse_var(&lookup, "TIMBRE_CADENCE_MS") {
            config.cadence_ms = cadence;
        }
        if let Some(volume) = parse_var::<f64>(&lookup, "TIMBRE_VOLUME") {
            config.initial_volume = volume.clamp(0.0, 1.0);
        }
        if let Some(model) = parse_var(&lookup, "TIMBRE_DEMO_MODEL") {
            config.demo_model = model;
        }
        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring malformed {}={:?}", key, raw);
            None
        }
    }
}
