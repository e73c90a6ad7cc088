use crate::error::StoreError;

/// A durable string-keyed medium holding string values.
///
/// Calls are synchronous; implementations use interior mutability so one
/// medium can be shared by several contexts.
pub trait StorageBackend: Send + Sync {
  /// Get the raw value stored at `key`.
  fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

  /// Store `value` at `key`, replacing any previous value.
  fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

  /// Remove `key`. Removing a missing key is not an error.
  fn remove(&self, key: &str) -> Result<(), StoreError>;
}
