//! String key-value backends for the local tier.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::store::StoreError;

/// Closure passed to [`KvStore::modify`]: receives the current value (if
/// any) and returns the replacement.
pub type Modify<'a> = dyn FnMut(Option<&str>) -> Result<String, StoreError> + 'a;

/// Synchronous string storage, the durable equivalent of browser storage.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Replace the value under `key` with `f(current)` as one atomic step.
    /// If `f` fails nothing is written.
    fn modify(&self, key: &str, f: &mut Modify<'_>) -> Result<(), StoreError>;
}

fn lock(entries: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    // A panic mid-modify never leaves a half-applied map: changes are
    // built on a copy before they are committed.
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Non-durable store, used by tests.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn modify(&self, key: &str, f: &mut Modify<'_>) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        let next = f(entries.get(key).map(String::as_str))?;
        entries.insert(key.to_string(), next);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// All keys persisted as one JSON object in a single file.
///
/// Every write rewrites the file through a sibling temp file and a rename,
/// so a crash leaves either the old or the new contents on disk.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKvStore {
    /// Open (or create) the store at `path`. Parent directories are created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error("create directory", parent, e))?;
        }

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                StoreError::Local(format!("Corrupt local store {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_error("read", &path, e)),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened local store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Local(format!("Failed to encode local store: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(|e| io_error("write", &tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error("replace", &self.path, e))
    }

    /// Apply `change` to a copy of the map, persist it, then commit.
    fn write_through(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        change(&mut next)?;
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Local(format!("Failed to {action} {}: {err}", path.display()))
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write_through(|entries| {
            entries.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.write_through(|entries| {
            entries.remove(key);
            Ok(())
        })
    }

    fn modify(&self, key: &str, f: &mut Modify<'_>) -> Result<(), StoreError> {
        self.write_through(|entries| {
            let next = f(entries.get(key).map(String::as_str))?;
            entries.insert(key.to_string(), next);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn memory_modify_sees_previous_value() {
        let kv = MemoryKvStore::new();
        kv.set("counter", "1").unwrap();
        kv.modify("counter", &mut |current| {
            let n: u32 = current.unwrap_or("0").parse().unwrap();
            Ok((n + 1).to_string())
        })
        .unwrap();
        assert_eq!(kv.get("counter").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn failed_modify_writes_nothing() {
        let kv = MemoryKvStore::new();
        kv.set("k", "before").unwrap();
        let result = kv.modify("k", &mut |_| Err(StoreError::Local("nope".into())));
        assert_matches!(result, Err(StoreError::Local(_)));
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("before"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/store.json");

        let kv = FileKvStore::open(&path).unwrap();
        kv.set("tablebuilder.sections", "[]").unwrap();
        kv.set("scratch", "x").unwrap();
        kv.remove("scratch").unwrap();
        drop(kv);

        let reopened = FileKvStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("tablebuilder.sections").unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(reopened.get("scratch").unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_matches!(FileKvStore::open(&path), Err(StoreError::Local(_)));
    }
}
