//! Key-value byte storage used as the local mirror of diary state.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Errors that can occur while reading or writing cached values.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("Failed to encode cache value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Byte storage addressed by string keys.
///
/// Reads happen once at startup; writes overwrite the whole value.
pub trait Cache: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;
}

/// Stores each key as `<key>.json` inside a data directory.
#[derive(Clone, Debug)]
pub struct FileCache {
    data_dir: PathBuf,
}

impl FileCache {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the file path backing `key`.
    fn path(&self, key: &str) -> Result<PathBuf, CacheError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

impl Cache for FileCache {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(path, e)),
        }
    }

    /// Creates the data directory if it doesn't exist.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| CacheError::Io(self.data_dir.clone(), e))?;

        // Write then rename so a crash never leaves a half-written value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| CacheError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| CacheError::Io(path, e))?;
        Ok(())
    }
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates `key`, e.g. to simulate a cache left by a previous run.
    pub fn with_value(self, key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.lock().insert(key.to_string(), bytes.into());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Cache for MemoryCache {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.lock().get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
