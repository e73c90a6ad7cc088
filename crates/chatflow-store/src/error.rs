use thiserror::Error;

/// Error type for storage operations.
///
/// These never reach `KeyedStore` callers; the store logs them and keeps
/// going with the in-memory value.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("failed to serialize value for '{key}': {source}")]
  Serialize {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("malformed value stored at '{key}': {source}")]
  Deserialize {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("quota exceeded writing '{key}': {needed} bytes needed, {quota} allowed")]
  QuotaExceeded {
    key: String,
    needed: usize,
    quota: usize,
  },

  #[error("invalid storage key: {0}")]
  InvalidKey(String),
}
