//! Client storage and the session identifier kept in it.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

/// Storage key of the session identifier
pub const USER_ID_KEY: &str = "lisbeth_user_id";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistent string map that survives restarts
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// JSON object on disk, rewritten on every change
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) if json.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, json.as_bytes())?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.write(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.write(&map)?;
        }
        Ok(())
    }
}

/// Volatile store for tests and one-shot runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Accessor for the persisted session identifier
pub struct SessionIdentity {
    store: Box<dyn SessionStore>,
}

impl SessionIdentity {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Return the stored identifier, creating and persisting `user_<millis>`
    /// on first use
    pub fn current(&mut self) -> Result<String, StoreError> {
        if let Some(id) = self.store.get(USER_ID_KEY)?.filter(|id| !id.is_empty()) {
            return Ok(id);
        }
        let id = generate_user_id();
        self.store.set(USER_ID_KEY, &id)?;
        debug!("Created session identifier {}", id);
        Ok(id)
    }

    /// Forget the identifier; the next `current` call creates a fresh one
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.remove(USER_ID_KEY)
    }
}

fn generate_user_id() -> String {
    let millis = SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0u128, |d| d.as_millis());
    format!("user_{}", millis)
}
