use std::collections::HashSet;

use chatflow_config::{Edge, Node};

/// Entry-point analysis of a flow.
///
/// An entry point is a node no edge targets. Entry points keep the order in
/// which their nodes appear in the input.
#[derive(Debug, Clone)]
pub struct Graph {
  entry_points: Vec<String>,
}

impl Graph {
  /// Edges pointing at unknown nodes are ignored; they never turn a known
  /// node into a non-entry point.
  pub fn new(nodes: &[Node], edges: &[Edge]) -> Self {
    let targeted: HashSet<&str> = edges.iter().map(|edge| edge.target.as_str()).collect();

    let entry_points = nodes
      .iter()
      .filter(|node| !targeted.contains(node.id.as_str()))
      .map(|node| node.id.clone())
      .collect();

    Self { entry_points }
  }

  pub fn entry_points(&self) -> &[String] {
    &self.entry_points
  }
}
