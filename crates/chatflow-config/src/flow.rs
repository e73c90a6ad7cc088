use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::node::Node;

/// A named snapshot of a flow, created on explicit save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFlow {
  pub id: String,
  pub name: String,
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
  pub timestamp: DateTime<Utc>,
}

/// The auto-saved draft of whatever is on the canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentFlowState {
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
  pub last_saved: Option<DateTime<Utc>>,
}

impl CurrentFlowState {
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty() && self.edges.is_empty()
  }
}
