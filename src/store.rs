//! Durable key-value persistence.
//!
//! Values are JSON strings. Reads go through [`load_or_default`], which turns a
//! missing or malformed value into the type's default instead of an error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};

pub const DAILY_STEPS_KEY: &str = "steps.daily";
pub const LAST_RESET_DATE_KEY: &str = "steps.last_reset_date";
pub const EXPLORATION_KEY: &str = "exploration.progress";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Decode `key` as `T`, falling back to `T::default()` on any read failure.
pub fn load_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    load(store, key).unwrap_or_default()
}

/// Decode `key` as `T`. `None` when missing, unreadable, or malformed.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("[store] read of {} failed: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("[store] discarding malformed {}: {}", key, e);
            None
        }
    }
}

/// Encode and write `value`. Failures are logged and dropped; no retry.
pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StoreError::from)
        .and_then(|json| store.set(key, &json));
    if let Err(e) = result {
        log::warn!("[store] write of {} failed: {}", key, e);
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write-through store persisted as one pretty-printed JSON object.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open `path`. A missing file starts empty; a corrupt one is logged and ignored.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("[store] {} is corrupt, starting empty: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("[store] cannot read {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&*entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct RejectingStore;

    impl KeyValueStore for RejectingStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Poisoned)
        }

        fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::WriteRejected(key.to_string()))
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "discovery_store_{}_{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_typed_round_trip() {
        let store = MemoryStore::new();
        save(&store, "toggle.motion", &true);
        save(&store, DAILY_STEPS_KEY, &4321u32);
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        save(&store, LAST_RESET_DATE_KEY, &date);

        assert!(load_or_default::<bool>(&store, "toggle.motion"));
        assert_eq!(load_or_default::<u32>(&store, DAILY_STEPS_KEY), 4321);
        assert_eq!(load::<NaiveDate>(&store, LAST_RESET_DATE_KEY), Some(date));
        assert_eq!(
            store.get(LAST_RESET_DATE_KEY).unwrap().as_deref(),
            Some("\"2026-10-19\"")
        );
    }

    #[test]
    fn test_malformed_values_fall_back_to_default() {
        let store = MemoryStore::new();
        store.set("toggle.compass", "yes please").unwrap();
        store.set(DAILY_STEPS_KEY, "-12").unwrap();

        assert!(!load_or_default::<bool>(&store, "toggle.compass"));
        assert_eq!(load_or_default::<u32>(&store, DAILY_STEPS_KEY), 0);
        assert_eq!(load::<NaiveDate>(&store, LAST_RESET_DATE_KEY), None);
    }

    #[test]
    fn test_failing_store_is_not_fatal() {
        let store = RejectingStore;
        save(&store, "toggle.shake", &true);
        assert!(!load_or_default::<bool>(&store, "toggle.shake"));
    }

    #[test]
    fn test_json_file_store_persists() {
        let path = temp_path("persist");
        let _ = fs::remove_file(&path);

        {
            let store = JsonFileStore::open(&path);
            save(&store, "toggle.barometer", &true);
            save(&store, DAILY_STEPS_KEY, &12u32);
        }

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.path(), path.as_path());
        assert!(load_or_default::<bool>(&reopened, "toggle.barometer"));
        assert_eq!(load_or_default::<u32>(&reopened, DAILY_STEPS_KEY), 12);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_json_file_store_ignores_corrupt_file() {
        let path = temp_path("corrupt");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("toggle.motion").unwrap(), None);

        store.set("toggle.motion", "true").unwrap();
        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("toggle.motion").unwrap().as_deref(), Some("true"));

        let _ = fs::remove_file(&path);
    }
}
