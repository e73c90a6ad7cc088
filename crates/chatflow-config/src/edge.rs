use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A directed connection from one node's output port to another node's input port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
  pub id: String,
  pub source: String,
  pub target: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_handle: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Edge {
  /// Build an edge between two nodes, deriving its id from the endpoints.
  pub fn connect(source: impl Into<String>, target: impl Into<String>) -> Self {
    let source = source.into();
    let target = target.into();
    Self {
      id: format!("edge-{}-{}", source, target),
      source,
      target,
      source_handle: None,
      target_handle: None,
      extra: Map::new(),
    }
  }

  pub fn with_handles(mut self, source_handle: Option<String>, target_handle: Option<String>) -> Self {
    self.source_handle = source_handle;
    self.target_handle = target_handle;
    self
  }
}
