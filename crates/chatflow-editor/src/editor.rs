use chatflow_config::{Edge, Node, Position, SavedFlow};
use chatflow_persistence::FlowPersistence;
use chatflow_workflow::{
  FlowError, advance_node_ids, check_source_node_edges, create_node, update_node_data,
  validate_flow,
};
use tracing::{debug, warn};

use crate::error::EditorError;
use crate::events::{EditorEvent, EditorNotifier, NoopNotifier};

/// An editing session over one live flow.
///
/// Owns the canvas state (nodes, edges, selection) and reports every change
/// to its [`FlowPersistence`] so the draft follows along. Edits schedule
/// auto-save timers, so the editor must be driven from a tokio runtime.
#[derive(Debug)]
pub struct FlowEditor<N = NoopNotifier> {
  nodes: Vec<Node>,
  edges: Vec<Edge>,
  selected: Option<String>,
  persistence: FlowPersistence,
  notifier: N,
}

impl FlowEditor<NoopNotifier> {
  pub fn new(persistence: FlowPersistence) -> Self {
    Self::with_notifier(persistence, NoopNotifier)
  }
}

impl<N: EditorNotifier> FlowEditor<N> {
  pub fn with_notifier(persistence: FlowPersistence, notifier: N) -> Self {
    Self {
      nodes: Vec::new(),
      edges: Vec::new(),
      selected: None,
      persistence,
      notifier,
    }
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  pub fn edges(&self) -> &[Edge] {
    &self.edges
  }

  pub fn persistence(&self) -> &FlowPersistence {
    &self.persistence
  }

  pub fn persistence_mut(&mut self) -> &mut FlowPersistence {
    &mut self.persistence
  }

  pub fn node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.iter().find(|node| node.id == node_id)
  }

  pub fn selected_node(&self) -> Option<&Node> {
    self.selected.as_deref().and_then(|id| self.node(id))
  }

  /// Put the stored draft back on the canvas.
  ///
  /// Returns whether there was anything to restore.
  pub fn restore_draft(&mut self) -> bool {
    let draft = self.persistence.current_flow_state();
    if draft.is_empty() {
      return false;
    }

    advance_node_ids(&draft.nodes);
    self.nodes = draft.nodes;
    self.edges = draft.edges;
    self.selected = None;
    self.persistence.track(&self.nodes, &self.edges);
    true
  }

  /// Drop a new node of `node_type` onto the canvas.
  ///
  /// An empty type is ignored. Without a position the node lands at the origin.
  pub fn drop_node(&mut self, node_type: &str, position: Option<Position>) -> Option<Node> {
    if node_type.is_empty() {
      return None;
    }

    let node = create_node(node_type, position.unwrap_or_default());
    self.nodes.push(node.clone());
    self.changed();
    self.notifier.notify(EditorEvent::NodeAdded {
      node_id: node.id.clone(),
    });
    Some(node)
  }

  /// Connect `source`'s output to `target`'s input.
  ///
  /// Refused without changing anything when `source` already has an
  /// outgoing edge or either node is unknown.
  pub fn connect(&mut self, source: &str, target: &str) -> Result<Edge, EditorError> {
    self.connect_handles(source, target, None, None)
  }

  /// Like [`connect`](Self::connect), recording the handles the edge was
  /// drawn between.
  pub fn connect_handles(
    &mut self,
    source: &str,
    target: &str,
    source_handle: Option<String>,
    target_handle: Option<String>,
  ) -> Result<Edge, EditorError> {
    for node_id in [source, target] {
      if self.node(node_id).is_none() {
        return Err(EditorError::NodeNotFound(node_id.to_string()));
      }
    }

    if check_source_node_edges(source, &self.edges) {
      let err = FlowError::DuplicateOutgoingEdge {
        node_id: source.to_string(),
      };
      debug!(source, target, "connection rejected");
      self.notifier.notify(EditorEvent::ConnectionRejected {
        source: source.to_string(),
        message: err.to_string(),
      });
      return Err(err.into());
    }

    let edge = Edge::connect(source, target).with_handles(source_handle, target_handle);
    self.edges.push(edge.clone());
    self.changed();
    self.notifier.notify(EditorEvent::Connected {
      edge_id: edge.id.clone(),
      source: edge.source.clone(),
      target: edge.target.clone(),
    });
    Ok(edge)
  }

  pub fn select_node(&mut self, node_id: &str) -> Result<(), EditorError> {
    if self.node(node_id).is_none() {
      return Err(EditorError::NodeNotFound(node_id.to_string()));
    }
    self.selected = Some(node_id.to_string());
    Ok(())
  }

  pub fn clear_selection(&mut self) {
    self.selected = None;
  }

  /// Change a node's message text, keeping the rest of its data.
  pub fn set_label(&mut self, node_id: &str, label: &str) -> Result<(), EditorError> {
    let data = self
      .node(node_id)
      .map(|node| node.data.with_label(label))
      .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;

    self.nodes = update_node_data(std::mem::take(&mut self.nodes), node_id, data);
    self.changed();
    self.notifier.notify(EditorEvent::NodeUpdated {
      node_id: node_id.to_string(),
    });
    Ok(())
  }

  /// Remove a node and every edge touching it.
  pub fn remove_node(&mut self, node_id: &str) -> bool {
    let before = self.nodes.len();
    self.nodes.retain(|node| node.id != node_id);
    if self.nodes.len() == before {
      return false;
    }

    self
      .edges
      .retain(|edge| edge.source != node_id && edge.target != node_id);
    if self.selected.as_deref() == Some(node_id) {
      self.selected = None;
    }
    self.changed();
    self.notifier.notify(EditorEvent::NodeRemoved {
      node_id: node_id.to_string(),
    });
    true
  }

  pub fn remove_edge(&mut self, edge_id: &str) -> bool {
    let before = self.edges.len();
    self.edges.retain(|edge| edge.id != edge_id);
    if self.edges.len() == before {
      return false;
    }

    self.changed();
    self.notifier.notify(EditorEvent::EdgeRemoved {
      edge_id: edge_id.to_string(),
    });
    true
  }

  /// Name offered when asking for a flow name.
  pub fn default_flow_name(&self) -> String {
    format!("Flow {}", self.persistence.saved_flows().len() + 1)
  }

  /// Validate and save the live flow under `name`, then clear the canvas.
  ///
  /// Validation runs before the name is looked at. A missing or blank name
  /// means the user backed out: nothing is saved and `Ok(None)` is returned.
  pub fn save(&mut self, name: Option<&str>) -> Result<Option<SavedFlow>, EditorError> {
    if let Err(e) = validate_flow(&self.nodes, &self.edges) {
      warn!(error = %e, "save rejected");
      self.notifier.notify(EditorEvent::SaveRejected {
        message: e.to_string(),
      });
      return Err(e.into());
    }

    let Some(name) = name.filter(|name| !name.trim().is_empty()) else {
      return Ok(None);
    };

    let flow = self.persistence.save_flow(name);
    self.reset();
    self.notifier.notify(EditorEvent::FlowSaved {
      flow_id: flow.id.clone(),
      name: flow.name.clone(),
    });
    Ok(Some(flow))
  }

  /// Replace the canvas with a saved flow.
  ///
  /// The canvas is cleared first and the runtime gets one turn before the
  /// saved nodes and edges are applied.
  pub async fn load_flow(&mut self, flow_id: &str) -> Result<SavedFlow, EditorError> {
    let flow = self
      .persistence
      .find_flow(flow_id)
      .ok_or_else(|| EditorError::SavedFlowNotFound(flow_id.to_string()))?;

    self.reset();
    tokio::task::yield_now().await;

    advance_node_ids(&flow.nodes);
    self.nodes = flow.nodes.clone();
    self.edges = flow.edges.clone();
    self.changed();
    self.notifier.notify(EditorEvent::FlowLoaded {
      flow_id: flow.id.clone(),
      name: flow.name.clone(),
    });
    Ok(flow)
  }

  /// Delete a saved flow. Returns whether it existed.
  pub fn delete_flow(&mut self, flow_id: &str) -> bool {
    if self.persistence.find_flow(flow_id).is_none() {
      return false;
    }

    self.persistence.delete_flow(flow_id);
    self.notifier.notify(EditorEvent::FlowDeleted {
      flow_id: flow_id.to_string(),
    });
    true
  }

  /// Empty the canvas.
  pub fn clear(&mut self) {
    self.reset();
    self.notifier.notify(EditorEvent::Cleared);
  }

  fn reset(&mut self) {
    self.nodes.clear();
    self.edges.clear();
    self.selected = None;
    self.changed();
  }

  fn changed(&mut self) {
    self.persistence.observe(&self.nodes, &self.edges);
  }
}
