//! Editor events and notifiers.
//!
//! Every user-visible outcome of an edit (a rejected connection, a saved
//! flow, ...) is reported as an event so a front end can turn it into a
//! message without the editor knowing how it is shown.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Outcomes reported by [`FlowEditor`](crate::FlowEditor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
  NodeAdded { node_id: String },

  NodeUpdated { node_id: String },

  NodeRemoved { node_id: String },

  Connected {
    edge_id: String,
    source: String,
    target: String,
  },

  /// A connection was refused; the flow is unchanged.
  ConnectionRejected { source: String, message: String },

  EdgeRemoved { edge_id: String },

  /// Validation failed; nothing was saved.
  SaveRejected { message: String },

  FlowSaved { flow_id: String, name: String },

  FlowLoaded { flow_id: String, name: String },

  FlowDeleted { flow_id: String },

  Cleared,
}

/// Trait for receiving editor events.
pub trait EditorNotifier: Send + Sync {
  /// Called when an editor event occurs.
  fn notify(&self, event: EditorEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl EditorNotifier for NoopNotifier {
  fn notify(&self, _event: EditorEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<EditorEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<EditorEvent>) -> Self {
    Self { sender }
  }

  /// Create a notifier together with the receiving end.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<EditorEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl EditorNotifier for ChannelNotifier {
  fn notify(&self, event: EditorEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
