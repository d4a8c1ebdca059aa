//! Key-Value store wrapper with automatic serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Raw string storage underneath a [`Cache`].
///
/// Values are opaque strings, the way a browser's local storage holds them.
pub trait KvBackend: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// List all stored keys in ascending order.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, CacheError> {
    mutex
        .lock()
        .map_err(|e| CacheError::StoreError(format!("lock poisoned: {e}")))
}

/// Volatile backend, used for tests and for sessions that opt out of persistence.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        lock(&self.entries)?.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(lock(&self.entries)?.keys().cloned().collect())
    }
}

/// Durable backend storing every key in a single JSON document on disk.
///
/// Writes go to a sibling temporary file that is renamed over the store, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileBackend {
    /// File name used inside a storage directory.
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (or lazily create) the store at `path`.
    ///
    /// The parent directory is created if missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CacheError::OpenError(format!("{}: {e}", parent.display()))
                })?;
            }
        }
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    /// Open the store file inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        Self::open(dir.as_ref().join(Self::FILE_NAME))
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an undecodable store file is moved before starting afresh.
    pub fn quarantine_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CacheError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                let aside = self.quarantine_path();
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "store file is not valid JSON, starting empty"
                );
                std::fs::rename(&self.path, &aside)?;
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let _guard = lock(&self.guard)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let _guard = lock(&self.guard)?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let _guard = lock(&self.guard)?;
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let _guard = lock(&self.guard)?;
        Ok(self.read_all()?.into_keys().collect())
    }
}

/// Type-safe cache over a [`KvBackend`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap and clones share the
/// same backend.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn KvBackend>,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    /// Wrap an arbitrary backend.
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Open a volatile in-memory cache.
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open the durable store kept in `dir`.
    ///
    /// ```rust,no_run
    /// let cache = dawa_cache::Cache::open_dir("/home/me/.local/share/dawa")?;
    /// # Ok::<(), dawa_cache::CacheError>(())
    /// ```
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::new(FileBackend::in_dir(dir)?))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        tracing::trace!(key, bytes = raw.len(), "cache set");
        self.backend.set(key, raw)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        tracing::trace!(key, "cache delete");
        self.backend.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.backend.get(key)?.is_some())
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.backend.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Token {
        value: String,
    }

    #[test]
    fn test_memory_get_missing_is_none() {
        let cache = Cache::memory();
        let value: Option<Token> = cache.get("auth:session").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_memory_set_get_delete() {
        let cache = Cache::memory();
        let token = Token {
            value: "abc".to_string(),
        };
        cache.set("auth:session", &token).unwrap();
        assert!(cache.exists("auth:session").unwrap());
        assert_eq!(cache.get::<Token>("auth:session").unwrap(), Some(token));

        cache.delete("auth:session").unwrap();
        assert!(!cache.exists("auth:session").unwrap());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let cache = Cache::memory();
        assert!(cache.delete("nothing").is_ok());
    }

    #[test]
    fn test_clones_share_backend() {
        let cache = Cache::memory();
        let other = cache.clone();
        cache.set("k", &1u32).unwrap();
        assert_eq!(other.get::<u32>("k").unwrap(), Some(1));
    }

    #[test]
    fn test_keys_sorted() {
        let cache = Cache::memory();
        cache.set("b", &1).unwrap();
        cache.set("a", &2).unwrap();
        assert_eq!(cache.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_wrong_type_is_serialize_error() {
        let cache = Cache::memory();
        cache.set("k", &"not a token").unwrap();
        let result = cache.get::<Token>("k");
        assert!(matches!(result, Err(CacheError::SerializeError(_))));
    }

    #[test]
    fn test_file_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = Cache::open_dir(dir.path()).unwrap();
            cache.set("cart:items", &vec![1, 2, 3]).unwrap();
        }
        let cache = Cache::open_dir(dir.path()).unwrap();
        assert_eq!(cache.get::<Vec<i32>>("cart:items").unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_file_backend_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::in_dir(dir.path().join("nested")).unwrap();
        assert!(backend.keys().unwrap().is_empty());
        assert_eq!(backend.get("x").unwrap(), None);
    }

    #[test]
    fn test_corrupt_store_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::in_dir(dir.path()).unwrap();
        std::fs::write(backend.path(), "{not json").unwrap();

        assert_eq!(backend.get("cart:items").unwrap(), None);
        backend.set("cart:items", "[]".to_string()).unwrap();
        assert_eq!(backend.get("cart:items").unwrap().as_deref(), Some("[]"));
        assert_eq!(
            std::fs::read_to_string(backend.quarantine_path()).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn test_file_backend_delete() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::in_dir(dir.path()).unwrap();
        backend.set("a", "1".to_string()).unwrap();
        backend.set("b", "2".to_string()).unwrap();
        backend.delete("a").unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["b".to_string()]);
    }
}
