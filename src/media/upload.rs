use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::SessionError;

pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "m4a"];

/// A user-selected audio file. Immutable once built; clones share the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    size: u64,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl UploadedFile {
    /// Accepts `audio/*`, or a known audio extension when the declared type
    /// is empty.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, SessionError> {
        let name = name.into();
        let media_type = media_type.into();
        if !is_accepted(&name, &media_type) {
            return Err(SessionError::UnsupportedMedia { name, media_type });
        }
        let bytes = bytes.into();
        Ok(Self {
            name,
            size: bytes.len() as u64,
            media_type,
            bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Name up to the first dot: `my.take.mp3` -> `my`.
    pub fn base_name(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size as f64 / (1024.0 * 1024.0))
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("media_type", &self.media_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_accepted(name: &str, media_type: &str) -> bool {
    if media_type.starts_with("audio/") {
        return true;
    }
    media_type.is_empty()
        && extension_of(name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Media type for a file name, for hosts that only know the path.
pub fn guess_media_type(name: &str) -> Option<&'static str> {
    match extension_of(name)?.as_str() {
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" => Some("audio/ogg"),
        "m4a" => Some("audio/mp4"),
        _ => None,
    }
}
