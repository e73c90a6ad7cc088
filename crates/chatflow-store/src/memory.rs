use std::sync::Arc;

use dashmap::DashMap;

use crate::backend::StorageBackend;
use crate::error::StoreError;

/// In-memory storage medium.
///
/// Clones share the same entries. An optional quota (in bytes, counting keys
/// and values) makes writes fail the way a full browser storage area does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  data: Arc<DashMap<String, String>>,
  quota: Option<usize>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_quota(quota: usize) -> Self {
    Self {
      data: Arc::default(),
      quota: Some(quota),
    }
  }

  /// Bytes used by every entry except `key`.
  fn used_without(&self, key: &str) -> usize {
    self
      .data
      .iter()
      .filter(|entry| entry.key() != key)
      .map(|entry| entry.key().len() + entry.value().len())
      .sum()
  }
}

impl StorageBackend for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    Ok(self.data.get(key).map(|v| v.value().clone()))
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    if let Some(quota) = self.quota {
      let needed = self.used_without(key) + key.len() + value.len();
      if needed > quota {
        return Err(StoreError::QuotaExceeded {
          key: key.to_string(),
          needed,
          quota,
        });
      }
    }

    self.data.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), StoreError> {
    self.data.remove(key);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_storage() {
    let storage = MemoryStorage::new();

    assert_eq!(storage.get("key").unwrap(), None);

    storage.set("key", "value").unwrap();
    assert_eq!(storage.get("key").unwrap(), Some("value".to_string()));

    storage.set("key", "updated").unwrap();
    assert_eq!(storage.get("key").unwrap(), Some("updated".to_string()));

    storage.remove("key").unwrap();
    assert_eq!(storage.get("key").unwrap(), None);
  }

  #[test]
  fn test_clones_share_entries() {
    let storage = MemoryStorage::new();
    let other = storage.clone();

    storage.set("key", "value").unwrap();
    assert_eq!(other.get("key").unwrap(), Some("value".to_string()));
  }

  #[test]
  fn test_quota_rejects_oversized_write() {
    let storage = MemoryStorage::with_quota(10);

    storage.set("k", "12345").unwrap();
    let err = storage.set("j", "123456").unwrap_err();
    assert!(matches!(
      err,
      StoreError::QuotaExceeded {
        needed: 13,
        quota: 10,
        ..
      }
    ));

    // Overwriting an existing key only counts the new value.
    storage.set("k", "123456789").unwrap();
    assert_eq!(storage.get("j").unwrap(), None);
  }
}
