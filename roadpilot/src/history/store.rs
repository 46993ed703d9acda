//! History persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use super::entry::{CappedHistory, HistoryEntry, DEFAULT_HISTORY_CAPACITY};

/// Errors reading or writing history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("history file is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistent list of recent destinations.
pub trait HistoryStore: Send + Sync {
    /// All entries, newest first.
    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Adds an entry at the front, evicting the oldest past capacity.
    fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Removes every entry.
    fn clear(&self) -> Result<(), HistoryError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    history: Mutex<CappedHistory>,
}

impl MemoryHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: Mutex::new(CappedHistory::new(capacity)),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.history.lock().entries().to_vec())
    }

    fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.history.lock().push(entry);
        Ok(())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        self.history.lock().clear();
        Ok(())
    }
}

/// Store backed by a JSON array on disk.
///
/// A missing file reads as empty. Writes go to a sibling temp file that is
/// then renamed over the original.
#[derive(Debug)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CappedHistory, HistoryError> {
        let entries = match fs::read(&self.path) {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(data) => serde_json::from_slice(&data)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(CappedHistory::from_entries(entries, self.capacity))
    }

    fn store(&self, history: &CappedHistory) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(history.entries())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), entries = history.len(), "History saved");
        Ok(())
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.load()?.into_entries())
    }

    fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock();
        let mut history = self.load()?;
        history.push(entry);
        self.store(&history)
    }

    fn clear(&self) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, millis: i64) -> HistoryEntry {
        HistoryEntry {
            name: name.to_string(),
            recorded_at_millis: millis,
            display_date: "01 Jan 00:00".to_string(),
            latitude: 41.0,
            longitude: 29.0,
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryHistoryStore::new(2);
        store.record(entry("a", 1)).unwrap();
        store.record(entry("b", 2)).unwrap();
        store.record(entry("c", 3)).unwrap();

        let names: Vec<String> = store.entries().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["c", "b"]);

        store.clear().unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileHistoryStore::new(dir.path().join("history.json"));
        assert!(store.entries().unwrap().is_empty());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let store = JsonFileHistoryStore::new(&path);
        for i in 0..12 {
            store.record(entry(&format!("p{}", i), i)).unwrap();
        }

        let reopened = JsonFileHistoryStore::new(&path);
        let entries = reopened.entries().unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].name, "p11");
        assert_eq!(entries[9].name, "p2");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_clear() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let store = JsonFileHistoryStore::new(&path);
        store.record(entry("a", 1)).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_reports_serde_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileHistoryStore::new(&path);
        assert!(matches!(store.entries(), Err(HistoryError::Serde(_))));
        assert!(matches!(store.record(entry("a", 1)), Err(HistoryError::Serde(_))));
    }
}
