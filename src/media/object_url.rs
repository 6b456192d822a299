use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::upload::UploadedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub Uuid);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transient URL over an uploaded file's bytes. Only the manager that
/// issued it decides whether it is still live.
#[derive(Debug, Clone)]
pub struct PlayableHandle {
    id: HandleId,
    url: String,
    source: UploadedFile,
}

impl PartialEq for PlayableHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl PlayableHandle {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> &UploadedFile {
        &self.source
    }
}

/// Issues and revokes playable handles and keeps the books on them.
#[derive(Debug, Default)]
pub struct ObjectUrlManager {
    live: HashSet<HandleId>,
    acquired: u64,
    released: u64,
}

impl ObjectUrlManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always mints a fresh handle, even for a file that already has one.
    pub fn acquire(&mut self, file: &UploadedFile) -> PlayableHandle {
        let id = HandleId(Uuid::new_v4());
        self.live.insert(id);
        self.acquired += 1;
        debug!(handle = %id, file = file.name(), live = self.live.len(), "handle acquired");
        PlayableHandle {
            id,
            url: format!("blob:timbre/{}", id),
            source: file.clone(),
        }
    }

    /// Releasing a missing or already released handle is a no-op.
    pub fn release(&mut self, handle: Option<&PlayableHandle>) -> bool {
        match handle {
            Some(handle) => self.release_id(handle.id),
            None => false,
        }
    }

    pub fn release_id(&mut self, id: HandleId) -> bool {
        if self.live.remove(&id) {
            self.released += 1;
            debug!(handle = %id, live = self.live.len(), "handle released");
            true
        } else {
            false
        }
    }

    /// Teardown sweep. Anything still live at this point was leaked by its
    /// owner, so it is logged.
    pub fn release_all(&mut self) -> usize {
        let leaked = self.live.len();
        if leaked > 0 {
            warn!(leaked, "releasing handles still live at teardown");
        }
        self.released += leaked as u64;
        self.live.clear();
        leaked
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.live.contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn acquired_total(&self) -> u64 {
        self.acquired
    }

    pub fn released_total(&self) -> u64 {
        self.released
    }
}
