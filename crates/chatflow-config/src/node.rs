use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node type for a plain text message, the only type the palette offers.
pub const TEXT_MESSAGE: &str = "textMessage";

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// Payload of a node.
///
/// `label` holds the message text. Any other keys are kept as-is so that
/// callers can attach their own fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
  #[serde(default)]
  pub label: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl NodeData {
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      extra: Map::new(),
    }
  }

  /// Copy of this data with `label` replaced and every other key kept.
  pub fn with_label(&self, label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      extra: self.extra.clone(),
    }
  }
}

/// A message node in a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: String,
  #[serde(rename = "type")]
  pub node_type: String,
  pub position: Position,
  #[serde(default)]
  pub data: NodeData,
  /// Canvas bookkeeping (`width`, `selected`, `dragging`, ...).
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}
