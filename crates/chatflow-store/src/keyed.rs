use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::context::{StorageContext, StorageEvent};
use crate::error::StoreError;

/// A value mirrored into one storage key as JSON.
///
/// Reads never fail: a missing or malformed slot yields the fallback. Writes
/// are best-effort: the in-memory value always changes, and storage failures
/// are logged. Changes made to the key through other contexts are picked up
/// by [`KeyedStore::sync`] or [`KeyedStore::apply_event`].
#[derive(Debug)]
pub struct KeyedStore<T> {
  key: String,
  context: StorageContext,
  value: watch::Sender<T>,
}

impl<T> KeyedStore<T>
where
  T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
  /// Bind `key` on `context`, loading its current value or `fallback`.
  pub fn open(context: StorageContext, key: impl Into<String>, fallback: T) -> Self {
    let key = key.into();
    let initial = match read_value(&context, &key) {
      Ok(Some(value)) => value,
      Ok(None) => fallback,
      Err(e) => {
        error!(key = %key, error = %e, "failed to load stored value, using fallback");
        fallback
      }
    };

    let (value, _) = watch::channel(initial);
    Self {
      key,
      context,
      value,
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  /// Current in-memory value.
  pub fn get(&self) -> T {
    self.value.borrow().clone()
  }

  /// Observe changes to the in-memory value, local or remote.
  pub fn watch(&self) -> watch::Receiver<T> {
    self.value.subscribe()
  }

  /// Replace the value and persist it.
  pub fn set(&self, value: T) {
    self.value.send_replace(value);
    self.persist();
  }

  /// Derive the next value from the current one and persist it.
  pub fn update(&self, f: impl FnOnce(&T) -> T) {
    self.value.send_modify(|current| {
      let next = f(current);
      *current = next;
    });
    self.persist();
  }

  fn persist(&self) {
    let snapshot = self.value.borrow().clone();
    if let Err(e) = write_value(&self.context, &self.key, &snapshot) {
      error!(key = %self.key, error = %e, "failed to persist value");
    }
  }

  /// Apply a change announced on the storage bus.
  ///
  /// Returns whether the in-memory value was replaced. Events for other keys,
  /// events this context produced itself, and removals are ignored. A value
  /// that fails to parse is logged and the current value kept.
  pub fn apply_event(&self, event: &StorageEvent) -> bool {
    if event.key != self.key || event.origin == self.context.id() {
      return false;
    }

    let Some(raw) = event.new_value.as_deref() else {
      return false;
    };

    match serde_json::from_str::<T>(raw) {
      Ok(value) => {
        debug!(key = %self.key, origin = %event.origin, "applied remote change");
        self.value.send_replace(value);
        true
      }
      Err(e) => {
        error!(key = %self.key, error = %e, "failed to parse remote change, keeping current value");
        false
      }
    }
  }

  /// Follow changes made through other contexts.
  ///
  /// The task ends when the store is dropped (on the next event) or the bus
  /// closes. Must be called from within a tokio runtime.
  pub fn sync(self: &Arc<Self>) -> JoinHandle<()> {
    let mut events = self.context.subscribe();
    let store = Arc::downgrade(self);

    tokio::spawn(async move {
      loop {
        match events.recv().await {
          Ok(event) => {
            let Some(store) = store.upgrade() else {
              break;
            };
            store.apply_event(&event);
          }
          Err(broadcast::error::RecvError::Lagged(skipped)) => {
            warn!(skipped, "storage change bus lagged, some remote changes were dropped");
          }
          Err(broadcast::error::RecvError::Closed) => break,
        }
      }
    })
  }
}

fn read_value<T: DeserializeOwned>(
  context: &StorageContext,
  key: &str,
) -> Result<Option<T>, StoreError> {
  match context.get(key)? {
    Some(raw) => serde_json::from_str(&raw)
      .map(Some)
      .map_err(|source| StoreError::Deserialize {
        key: key.to_string(),
        source,
      }),
    None => Ok(None),
  }
}

fn write_value<T: Serialize>(context: &StorageContext, key: &str, value: &T) -> Result<(), StoreError> {
  let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
    key: key.to_string(),
    source,
  })?;
  context.set(key, &raw)
}
