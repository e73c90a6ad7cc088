use std::sync::Arc;

use chatflow_config::{CurrentFlowState, Edge, Node, PersistenceConfig, SavedFlow};
use chatflow_store::{KeyedStore, StorageContext};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::debounce::Debouncer;

/// Keeps flows in storage: a debounced draft of the live canvas and a list
/// of named snapshots.
///
/// The coordinator never owns the live flow. Callers report every change
/// through [`observe`](FlowPersistence::observe) and it keeps a copy for
/// auto-saving and for [`save_flow`](FlowPersistence::save_flow).
#[derive(Debug)]
pub struct FlowPersistence {
  saved_flows: Arc<KeyedStore<Vec<SavedFlow>>>,
  current: Arc<KeyedStore<CurrentFlowState>>,
  auto_save: Debouncer<(Vec<Node>, Vec<Edge>)>,
  nodes: Vec<Node>,
  edges: Vec<Edge>,
  // Last flow handed to the debouncer.
  scheduled: (Vec<Node>, Vec<Edge>),
}

impl FlowPersistence {
  /// Open both slots named in `config` on `context`.
  pub fn new(context: StorageContext, config: &PersistenceConfig) -> Self {
    let saved_flows = Arc::new(KeyedStore::open(
      context.clone(),
      config.saved_flows_key.clone(),
      Vec::new(),
    ));
    let current = Arc::new(KeyedStore::open(
      context,
      config.current_flow_key.clone(),
      CurrentFlowState::default(),
    ));

    let draft = Arc::clone(&current);
    let auto_save = Debouncer::new(
      config.auto_save_delay(),
      move |(nodes, edges): (Vec<Node>, Vec<Edge>)| write_draft(&draft, nodes, edges),
    );

    Self {
      saved_flows,
      current,
      auto_save,
      nodes: Vec::new(),
      edges: Vec::new(),
      scheduled: (Vec::new(), Vec::new()),
    }
  }

  /// Record the live flow and schedule a draft write.
  ///
  /// Nothing is scheduled while the flow is completely empty. Only the last
  /// state of a burst of changes is written, once the auto-save window
  /// passes. Must be called from within a tokio runtime.
  pub fn observe(&mut self, nodes: &[Node], edges: &[Edge]) {
    self.nodes = nodes.to_vec();
    self.edges = edges.to_vec();

    if !self.nodes.is_empty() || !self.edges.is_empty() {
      self.scheduled = (self.nodes.clone(), self.edges.clone());
      self.auto_save.schedule(self.scheduled.clone());
    }
  }

  /// Record the live flow without scheduling a draft write.
  ///
  /// Used when the canvas is filled from the stored draft itself, which is
  /// not an edit.
  pub fn track(&mut self, nodes: &[Node], edges: &[Edge]) {
    self.nodes = nodes.to_vec();
    self.edges = edges.to_vec();
  }

  /// Write a pending draft now instead of waiting for the window.
  ///
  /// Returns whether a write happened. The written state is the one the
  /// timer would have written, not an empty flow observed after it.
  pub fn flush(&mut self) -> bool {
    if !self.auto_save.cancel() {
      return false;
    }
    let (nodes, edges) = self.scheduled.clone();
    write_draft(&self.current, nodes, edges);
    true
  }

  /// Drop any pending auto-save and reset the draft slot to empty.
  pub fn discard_draft(&mut self) {
    self.auto_save.cancel();
    self.current.set(CurrentFlowState::default());
    debug!("draft discarded");
  }

  pub fn has_pending_save(&self) -> bool {
    self.auto_save.is_pending()
  }

  /// Snapshot the observed flow under `name` and append it to the saved list.
  ///
  /// Names are not deduplicated; every call adds a new entry.
  pub fn save_flow(&self, name: &str) -> SavedFlow {
    let flow = SavedFlow {
      id: Uuid::new_v4().to_string(),
      name: name.to_string(),
      nodes: self.nodes.clone(),
      edges: self.edges.clone(),
      timestamp: Utc::now(),
    };

    let appended = flow.clone();
    self.saved_flows.update(move |prev| {
      let mut next = prev.clone();
      next.push(appended);
      next
    });

    info!(flow_id = %flow.id, name = %flow.name, nodes = flow.nodes.len(), "flow saved");
    flow
  }

  /// Remove the saved flow with `flow_id`. Unknown ids are ignored.
  pub fn delete_flow(&self, flow_id: &str) {
    if self.find_flow(flow_id).is_none() {
      debug!(flow_id, "delete of unknown flow ignored");
      return;
    }

    self.saved_flows.update(|prev| {
      prev
        .iter()
        .filter(|flow| flow.id != flow_id)
        .cloned()
        .collect()
    });
    info!(flow_id, "flow deleted");
  }

  pub fn saved_flows(&self) -> Vec<SavedFlow> {
    self.saved_flows.get()
  }

  pub fn find_flow(&self, flow_id: &str) -> Option<SavedFlow> {
    self
      .saved_flows
      .get()
      .into_iter()
      .find(|flow| flow.id == flow_id)
  }

  /// The last draft written, by this context or another.
  pub fn current_flow_state(&self) -> CurrentFlowState {
    self.current.get()
  }

  pub fn watch_saved_flows(&self) -> watch::Receiver<Vec<SavedFlow>> {
    self.saved_flows.watch()
  }

  pub fn watch_current_flow(&self) -> watch::Receiver<CurrentFlowState> {
    self.current.watch()
  }

  /// Follow both slots as other contexts write them.
  pub fn sync(&self) -> Vec<JoinHandle<()>> {
    vec![self.saved_flows.sync(), self.current.sync()]
  }
}

fn write_draft(store: &KeyedStore<CurrentFlowState>, nodes: Vec<Node>, edges: Vec<Edge>) {
  debug!(nodes = nodes.len(), edges = edges.len(), "auto-saving draft");
  store.set(CurrentFlowState {
    nodes,
    edges,
    last_saved: Some(Utc::now()),
  });
}
