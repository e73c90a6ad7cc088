use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::backend::StorageBackend;
use crate::error::StoreError;

/// Filesystem storage medium.
///
/// Each key is stored as its own file:
/// ```text
/// {root}/
/// ├── bitespeed-current-flow.json
/// └── bitespeed-saved-flows.json
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
  root: PathBuf,
}

impl FileStorage {
  /// Open a storage directory, creating it if needed.
  pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
    let root = root.into();
    fs::create_dir_all(&root)?;
    Ok(Self { root })
  }

  /// Get the root directory of the storage.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
    let valid = !key.is_empty()
      && key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
      && !key.starts_with('.');
    if !valid {
      return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(self.root.join(format!("{}.json", key)))
  }
}

impl StorageBackend for FileStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let path = self.path_for(key)?;
    match fs::read_to_string(&path) {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let path = self.path_for(key)?;
    // Write to a sibling file first so readers never see a partial value.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, value)?;
    if let Err(e) = fs::rename(&tmp, &path) {
      let _ = fs::remove_file(&tmp);
      return Err(e.into());
    }
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), StoreError> {
    let path = self.path_for(key)?;
    match fs::remove_file(&path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}
