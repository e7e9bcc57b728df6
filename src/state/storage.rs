use battlesnake_api::TournamentId;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key under which the last loaded tournament id is remembered.
pub const TOURNAMENT_ID_KEY: &str = "battlesnake_tournament_id";

/// Tiny string key-value store persisted as a JSON object.
///
/// Failures never propagate: a missing or unreadable file reads as empty and
/// failed writes are logged.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl SessionStore {
    /// Open the store at `path`, loading whatever is already there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self { path: Some(path), entries }
    }

    /// Store that lives only for this process.
    pub fn in_memory() -> Self {
        Self { path: None, entries: BTreeMap::new() }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if self.entries.get(key) == Some(&value) {
            return;
        }
        self.entries.insert(key.to_string(), value);
        self.flush();
    }

    pub fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }

    pub fn saved_tournament_id(&self) -> Option<TournamentId> {
        let raw = self.get(TOURNAMENT_ID_KEY)?;
        match raw.parse() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("ignoring saved tournament id: {e}");
                None
            }
        }
    }

    pub fn save_tournament_id(&mut self, id: &TournamentId) {
        self.set(TOURNAMENT_ID_KEY, id.as_str());
    }

    pub fn clear_tournament_id(&mut self) {
        self.remove(TOURNAMENT_ID_KEY);
    }

    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_entries(path, &self.entries) {
            warn!("could not persist session to {}: {e}", path.display());
        } else {
            debug!("session saved to {}", path.display());
        }
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!("could not read session file {}: {e}", path.display());
            return BTreeMap::new();
        }
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("session file {} is not valid json: {e}", path.display());
        BTreeMap::new()
    })
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
    }
    let payload = serde_json::to_string_pretty(entries).map_err(|e| format!("serialize failed: {e}"))?;
    std::fs::write(path, payload).map_err(|e| format!("write failed: {e}"))
}
