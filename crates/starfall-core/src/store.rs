//! Abstract key-value persistence for profile blobs.
//!
//! Values are JSON strings. Loading never fails: a missing key yields the
//! type's default, and a malformed blob is logged, removed and replaced by the
//! default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors raised while writing persisted blobs.
#[derive(Debug)]
pub enum StoreError {
    Serialize(String),
    Deserialize(String),
    Io(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(e) => write!(f, "serialize error: {e}"),
            Self::Deserialize(e) => write!(f, "deserialize error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A string key-value store (browser localStorage or equivalent).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str);
}

/// Load a JSON blob, falling back to `T::default()` when it is missing or malformed.
pub fn load_or_default<T, S>(store: &mut S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding malformed persisted blob, using defaults");
            store.remove(key);
            T::default()
        },
    }
}

/// Serialize `value` as JSON under `key`.
pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| StoreError::Serialize(e.to_string()))?;
    store.set(key, json)
}

/// In-memory store, used by tests and the headless driver when no file is given.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Store persisted as one JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, starting empty", path.display());
                    BTreeMap::new()
                },
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        std::fs::write(&self.path, json).map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some()
            && let Err(e) = self.flush()
        {
            tracing::warn!(key, error = %e, "Failed to persist key removal");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Blob {
        kills: u32,
        name: String,
    }

    #[test]
    fn missing_key_yields_default() {
        let mut store = MemoryStore::new();
        let blob: Blob = load_or_default(&mut store, "profile");
        assert_eq!(blob, Blob::default());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let mut store = MemoryStore::new();
        let blob = Blob {
            kills: 7,
            name: "ace".into(),
        };
        save(&mut store, "profile", &blob).unwrap();
        let back: Blob = load_or_default(&mut store, "profile");
        assert_eq!(back, blob);
    }

    #[test]
    fn missing_fields_default_individually() {
        let mut store = MemoryStore::new();
        store.set("profile", r#"{"kills":3}"#.into()).unwrap();
        let blob: Blob = load_or_default(&mut store, "profile");
        assert_eq!(blob.kills, 3);
        assert_eq!(blob.name, "");
    }

    #[test]
    fn malformed_blob_is_removed_and_defaulted() {
        let mut store = MemoryStore::new();
        store.set("profile", "{not json".into()).unwrap();
        let blob: Blob = load_or_default(&mut store, "profile");
        assert_eq!(blob, Blob::default());
        assert!(store.get("profile").is_none(), "corrupt key should be removed");
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!("starfall-store-{}.json", std::process::id()));
        {
            let mut store = JsonFileStore::open(&path);
            save(&mut store, "coins", &120u64).unwrap();
        }
        let mut reopened = JsonFileStore::open(&path);
        let coins: u64 = load_or_default(&mut reopened, "coins");
        assert_eq!(coins, 120);
        let _ = std::fs::remove_file(&path);
    }
}
