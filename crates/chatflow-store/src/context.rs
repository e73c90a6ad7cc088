use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::error::StoreError;

/// Capacity of the change bus. Slow subscribers past this many events lag.
const EVENT_CAPACITY: usize = 64;

/// A change made to a key through one context, seen by the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
  pub key: String,
  /// The new raw value, or `None` if the key was removed.
  pub new_value: Option<String>,
  /// Context that made the change.
  pub origin: Uuid,
}

/// A storage medium together with its change bus.
///
/// Clones share both. Open one [`StorageContext`] per independent view onto
/// the medium; writes through one context are announced to all others.
#[derive(Clone)]
pub struct Storage {
  backend: Arc<dyn StorageBackend>,
  events: broadcast::Sender<StorageEvent>,
}

impl Storage {
  pub fn new(backend: impl StorageBackend + 'static) -> Self {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Self {
      backend: Arc::new(backend),
      events,
    }
  }

  /// Open a new context with its own identity.
  pub fn context(&self) -> StorageContext {
    StorageContext {
      id: Uuid::new_v4(),
      storage: self.clone(),
    }
  }
}

impl std::fmt::Debug for Storage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Storage")
      .field("subscribers", &self.events.receiver_count())
      .finish_non_exhaustive()
  }
}

/// One view onto a [`Storage`].
///
/// Stores opened on the same context share its identity, so they never see
/// each other's writes as remote changes.
#[derive(Debug, Clone)]
pub struct StorageContext {
  id: Uuid,
  storage: Storage,
}

impl StorageContext {
  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    self.storage.backend.get(key)
  }

  /// Write `value` and announce it to other contexts.
  pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    self.storage.backend.set(key, value)?;
    self.publish(key, Some(value.to_string()));
    Ok(())
  }

  /// Remove `key` and announce it to other contexts.
  pub fn remove(&self, key: &str) -> Result<(), StoreError> {
    self.storage.backend.remove(key)?;
    self.publish(key, None);
    Ok(())
  }

  /// Subscribe to changes made through any context, including this one.
  pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
    self.storage.events.subscribe()
  }

  fn publish(&self, key: &str, new_value: Option<String>) {
    // No receivers is fine
    let _ = self.storage.events.send(StorageEvent {
      key: key.to_string(),
      new_value,
      origin: self.id,
    });
  }
}
