use chatflow_config::{Edge, Node};
use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::graph::Graph;

/// Check that a flow is structurally saveable.
///
/// A flow needs at least one node. With two or more nodes, at most one of
/// them may lack incoming edges. Zero such nodes (every node is a target,
/// e.g. a cycle) passes, and reachability is not checked.
pub fn validate_flow(nodes: &[Node], edges: &[Edge]) -> Result<(), FlowError> {
  if nodes.is_empty() {
    return Err(FlowError::EmptyFlow);
  }

  if nodes.len() == 1 {
    return Ok(());
  }

  let graph = Graph::new(nodes, edges);
  let count = graph.entry_points().len();
  if count > 1 {
    return Err(FlowError::MultipleEntryPoints { count });
  }

  Ok(())
}

/// Whether `source_node_id` already has an outgoing edge.
///
/// Checked before a connection is added; a `true` result means the new
/// connection must be rejected.
pub fn check_source_node_edges(source_node_id: &str, edges: &[Edge]) -> bool {
  edges.iter().any(|edge| edge.source == source_node_id)
}

/// Result-object form of [`validate_flow`], serialized as `{isValid, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
  pub is_valid: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl ValidationReport {
  pub fn check(nodes: &[Node], edges: &[Edge]) -> Self {
    Self::from(validate_flow(nodes, edges))
  }
}

impl From<Result<(), FlowError>> for ValidationReport {
  fn from(result: Result<(), FlowError>) -> Self {
    match result {
      Ok(()) => Self {
        is_valid: true,
        error: None,
      },
      Err(e) => Self {
        is_valid: false,
        error: Some(e.to_string()),
      },
    }
  }
}
