use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::store::KeyValueStore;
use crate::error::SessionError;
use crate::media::{PlayableHandle, UploadedFile};

pub const HISTORY_CAPACITY: usize = 10;
pub const HISTORY_KEY: &str = "conversionHistory";

/// One finished conversion. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub original_file_name: String,
    pub converted_file_name: String,
    pub timestamp: DateTime<Utc>,
    pub model_name: String,
    pub audio_url: String,
    /// Audio bytes stay in memory only; restored records have none.
    #[serde(skip)]
    source: Option<UploadedFile>,
}

impl HistoryRecord {
    pub fn new(
        converted_file_name: impl Into<String>,
        model_name: impl Into<String>,
        handle: &PlayableHandle,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{}-{}", timestamp.timestamp_millis(), &simple[..8]),
            original_file_name: handle.source().name().to_string(),
            converted_file_name: converted_file_name.into(),
            timestamp,
            model_name: model_name.into(),
            audio_url: handle.url().to_string(),
            source: Some(handle.source().clone()),
        }
    }

    pub fn source(&self) -> Option<&UploadedFile> {
        self.source.as_ref()
    }

    /// `HH:MM` in local time.
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// Newest-first, capacity-bounded log of conversions, mirrored into a
/// key-value store when one is available.
pub struct HistoryStore {
    records: Vec<HistoryRecord>,
    store: Option<Box<dyn KeyValueStore + Send>>,
    key: String,
}

impl HistoryStore {
    pub fn new(store: Option<Box<dyn KeyValueStore + Send>>, key: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            store,
            key: key.into(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(None, HISTORY_KEY)
    }

    /// Front insert, drop anything past capacity, then persist. Evicted
    /// records are simply dropped.
    pub fn append(&mut self, record: HistoryRecord) {
        self.records.insert(0, record);
        self.records.truncate(HISTORY_CAPACITY);
        self.persist();
    }

    pub fn list(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Replaces the in-memory list with the persisted one. Failures are logged
    /// and leave the current list untouched. Returns how many records loaded.
    pub fn load(&mut self) -> usize {
        match self.read_persisted() {
            Ok(Some(mut records)) => {
                records.truncate(HISTORY_CAPACITY);
                self.records = records;
                info!(count = self.records.len(), "conversion history restored");
                self.records.len()
            }
            Ok(None) => 0,
            Err(e) => {
                warn!("Failed to load conversion history: {}", e);
                0
            }
        }
    }

    fn read_persisted(&self) -> Result<Option<Vec<HistoryRecord>>, SessionError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(None);
        };
        let raw = store
            .get(&self.key)
            .map_err(|e| SessionError::PersistenceUnavailable(e.to_string()))?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| SessionError::PersistenceUnavailable(e.to_string())),
            None => Ok(None),
        }
    }

    /// Writes the list through. On the first failure the store is dropped and
    /// history carries on in memory for the rest of the session.
    pub fn persist(&mut self) -> bool {
        let result = match self.store.as_mut() {
            None => return false,
            Some(store) => serde_json::to_string(&self.records)
                .map_err(|e| SessionError::PersistenceUnavailable(e.to_string()))
                .and_then(|json| {
                    store
                        .set(&self.key, json)
                        .map_err(|e| SessionError::PersistenceUnavailable(e.to_string()))
                }),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save conversion history, continuing in memory: {}", e);
                self.store = None;
                false
            }
        }
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("records", &self.records.len())
            .field("persistent", &self.store.is_some())
            .field("key", &self.key)
            .finish()
    }
}
