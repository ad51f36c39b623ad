//! Append-only store of saved games.
//!
//! All records live as one JSON array under a single key of a string
//! key/value storage, the same layout the browser UI keeps in localStorage.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use hintboard_core::record::GameRecord;
use tracing::{info, warn};

use crate::error::StoreError;

/// Default key for the saved games list.
pub const DEFAULT_KEY: &str = "savedChessGames";

pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        // Write aside then rename so a crash never leaves half a list
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct GameRecordStore {
    storage: Box<dyn KeyValueStorage>,
    key: String,
}

impl GameRecordStore {
    pub fn new(storage: impl KeyValueStorage + 'static, key: impl Into<String>) -> Self {
        Self {
            storage: Box::new(storage),
            key: key.into(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new(), DEFAULT_KEY)
    }

    /// Strict read: missing or blank is empty, anything unreadable is an error.
    fn read(&self) -> Result<Vec<GameRecord>, StoreError> {
        match self.storage.get(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Append a record. Fails, leaving storage untouched, when the existing
    /// list cannot be read or the write fails.
    pub fn save(&mut self, record: GameRecord) -> Result<usize, StoreError> {
        let mut records = self.read()?;
        records.push(record);
        let raw = serde_json::to_string(&records)?;
        self.storage.set(&self.key, &raw)?;
        info!(key = %self.key, count = records.len(), "Game saved");
        Ok(records.len() - 1)
    }

    /// Every record in save order. Unreadable storage reads as empty.
    pub fn list_all(&self) -> Vec<GameRecord> {
        self.read().unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "Saved games unreadable; treating as empty");
            Vec::new()
        })
    }

    pub fn load(&self, index: usize) -> Result<GameRecord, StoreError> {
        let mut records = self.list_all();
        let len = records.len();
        if index >= len {
            return Err(StoreError::NotFound { index, len });
        }
        Ok(records.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.list_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
