//! Client-local key/value persistence.
//!
//! This is the browser-storage analogue: small string blobs under fixed
//! keys, surviving across sessions. Reads and writes are synchronous.

use std::{
  collections::HashMap,
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::{Arc, Mutex, PoisonError},
};

use crate::{Error, Result};

/// A string-valued key/value store.
pub trait KeyValueStorage: Send + Sync {
  /// The value stored under `key`, or `None` if nothing was ever written.
  fn read(&self, key: &str) -> Result<Option<String>>;

  /// Store `value` under `key`, replacing any previous value.
  fn write(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
  fn read(&self, key: &str) -> Result<Option<String>> { (**self).read(key) }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    (**self).write(key, value)
  }
}

// ─── Memory ──────────────────────────────────────────────────────────────────

/// Storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  /// Builder-style seed, mostly for tests that start from existing state.
  pub fn with_entry(self, key: &str, value: &str) -> Self {
    self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_owned(), value.to_owned());
    self
  }
}

impl KeyValueStorage for MemoryStorage {
  fn read(&self, key: &str) -> Result<Option<String>> {
    let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.get(key).cloned())
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_owned(), value.to_owned());
    Ok(())
  }
}

// ─── Files ───────────────────────────────────────────────────────────────────

/// One file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
  dir: PathBuf,
}

impl FileStorage {
  /// Use `dir` for storage, creating it if necessary.
  pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    fs::create_dir_all(&dir).map_err(|e| {
      Error::Storage(format!("creating {}: {e}", dir.display()))
    })?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  fn path_for(&self, key: &str) -> Result<PathBuf> {
    let valid = !key.is_empty()
      && key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
      return Err(Error::Storage(format!("invalid storage key: {key:?}")));
    }
    Ok(self.dir.join(key))
  }
}

impl KeyValueStorage for FileStorage {
  fn read(&self, key: &str) -> Result<Option<String>> {
    let path = self.path_for(key)?;
    match fs::read_to_string(&path) {
      Ok(value) => Ok(Some(value)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => {
        Err(Error::Storage(format!("reading {}: {e}", path.display())))
      }
    }
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    let path = self.path_for(key)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, value)
      .and_then(|()| fs::rename(&tmp, &path))
      .map_err(|e| Error::Storage(format!("writing {}: {e}", path.display())))
  }
}
