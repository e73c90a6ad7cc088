use std::sync::LazyLock;
use std::sync::atomic::{AtomicI64, Ordering};

use chatflow_config::{Node, NodeData, Position};
use chrono::Utc;
use serde_json::Map;

static NODE_IDS: LazyLock<IdGenerator> = LazyLock::new(IdGenerator::new);

/// Hands out `node_<millis>` ids that never repeat within a process.
///
/// Ids track the wall clock, but when two requests land in the same
/// millisecond (or the clock steps back) the second one gets `last + 1`.
#[derive(Debug, Default)]
pub struct IdGenerator {
  last: AtomicI64,
}

impl IdGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Next timestamp-derived value, strictly greater than the previous one.
  pub fn next_millis(&self) -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = self.last.load(Ordering::Relaxed);
    loop {
      let next = now.max(last + 1);
      match self
        .last
        .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
      {
        Ok(_) => return next,
        Err(current) => last = current,
      }
    }
  }

  /// Make sure later ids land after every `node_<n>` id in `nodes`.
  ///
  /// Ids in any other shape are ignored.
  pub fn advance_past(&self, nodes: &[Node]) {
    let highest = nodes
      .iter()
      .filter_map(|node| node.id.strip_prefix("node_")?.parse::<i64>().ok())
      .max();
    if let Some(highest) = highest {
      self.last.fetch_max(highest, Ordering::Relaxed);
    }
  }

  pub fn next_node_id(&self) -> String {
    format!("node_{}", self.next_millis())
  }

  /// Create a node with an empty label, using ids from this generator.
  pub fn create_node(&self, node_type: &str, position: Position) -> Node {
    Node {
      id: self.next_node_id(),
      node_type: node_type.to_string(),
      position,
      data: NodeData::default(),
      extra: Map::new(),
    }
  }
}

/// Create a node with an empty label at `position`.
pub fn create_node(node_type: &str, position: Position) -> Node {
  NODE_IDS.create_node(node_type, position)
}

/// Keep [`create_node`] from reusing any id already present in `nodes`.
pub fn advance_node_ids(nodes: &[Node]) {
  NODE_IDS.advance_past(nodes);
}

/// Replace the `data` of the node matching `node_id`.
///
/// The data is swapped wholesale; callers that want to keep existing keys
/// pass `old.with_label(..)` or build the merged value themselves. Every other
/// node is moved through untouched.
pub fn update_node_data(nodes: Vec<Node>, node_id: &str, new_data: NodeData) -> Vec<Node> {
  nodes
    .into_iter()
    .map(|node| {
      if node.id == node_id {
        Node {
          data: new_data.clone(),
          ..node
        }
      } else {
        node
      }
    })
    .collect()
}
