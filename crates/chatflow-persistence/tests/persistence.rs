//! Draft auto-save and saved flow bookkeeping against in-memory storage.

use std::time::Duration;

use chatflow_config::{
  CURRENT_FLOW_KEY, CurrentFlowState, Edge, Node, NodeData, PersistenceConfig, Position,
  SAVED_FLOWS_KEY, SavedFlow, TEXT_MESSAGE,
};
use chatflow_persistence::FlowPersistence;
use chatflow_store::{MemoryStorage, Storage, StorageContext};
use chrono::Utc;
use serde_json::Map;
use tokio::time::sleep;

fn node(id: &str, label: &str) -> Node {
  Node {
    id: id.to_string(),
    node_type: TEXT_MESSAGE.to_string(),
    position: Position::default(),
    data: NodeData::new(label),
    extra: Map::new(),
  }
}

fn stored_draft(context: &StorageContext) -> Option<CurrentFlowState> {
  context
    .get(CURRENT_FLOW_KEY)
    .unwrap()
    .map(|raw| serde_json::from_str(&raw).unwrap())
}

fn stored_flows(context: &StorageContext) -> Vec<SavedFlow> {
  context
    .get(SAVED_FLOWS_KEY)
    .unwrap()
    .map(|raw| serde_json::from_str(&raw).unwrap())
    .unwrap_or_default()
}

#[tokio::test(start_paused = true)]
async fn test_edit_burst_writes_one_final_draft() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  let mut events = context.subscribe();

  for label in ["H", "He", "Hel", "Hello"] {
    persistence.observe(&[node("a", label)], &[]);
    sleep(Duration::from_millis(200)).await;
  }

  assert!(stored_draft(&context).is_none());
  assert!(persistence.has_pending_save());

  sleep(Duration::from_millis(1000)).await;

  let draft = stored_draft(&context).expect("draft written");
  assert_eq!(draft.nodes, vec![node("a", "Hello")]);
  assert!(draft.last_saved.is_some());
  assert_eq!(persistence.current_flow_state(), draft);

  // Exactly one write reached the medium.
  assert!(events.try_recv().is_ok());
  assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_empty_flow_is_not_auto_saved() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  persistence.observe(&[], &[]);
  sleep(Duration::from_millis(2000)).await;

  assert!(stored_draft(&context).is_none());
  assert!(!persistence.has_pending_save());
}

#[tokio::test(start_paused = true)]
async fn test_auto_save_window_is_configurable() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let config = PersistenceConfig {
    auto_save_delay_ms: 50,
    ..PersistenceConfig::default()
  };
  let mut persistence = FlowPersistence::new(storage.context(), &config);

  persistence.observe(&[node("a", "hi")], &[]);
  sleep(Duration::from_millis(60)).await;

  assert!(stored_draft(&context).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_flush_writes_pending_draft_immediately() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  assert!(!persistence.flush());

  persistence.observe(&[node("a", "hi")], &[]);
  assert!(persistence.flush());
  assert_eq!(stored_draft(&context).unwrap().nodes, vec![node("a", "hi")]);

  // The cancelled timer does not write again.
  let mut events = context.subscribe();
  sleep(Duration::from_millis(2000)).await;
  assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_save_flow_snapshots_observed_flow() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  let before = Utc::now();
  persistence.observe(&[node("a", "hi")], &[]);
  let saved = persistence.save_flow("Test");

  assert_eq!(saved.name, "Test");
  assert_eq!(saved.nodes, vec![node("a", "hi")]);
  assert!(saved.edges.is_empty());
  assert!(!saved.id.is_empty());
  assert!(saved.timestamp >= before && saved.timestamp <= Utc::now());

  assert_eq!(persistence.saved_flows(), vec![saved.clone()]);
  assert_eq!(stored_flows(&context), vec![saved]);
}

#[tokio::test]
async fn test_saving_same_name_twice_keeps_both() {
  let storage = Storage::new(MemoryStorage::new());
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  persistence.observe(&[node("a", "one")], &[]);
  let first = persistence.save_flow("Greeting");
  persistence.observe(
    &[node("a", "one"), node("b", "two")],
    &[Edge::connect("a", "b")],
  );
  let second = persistence.save_flow("Greeting");

  assert_ne!(first.id, second.id);
  let flows = persistence.saved_flows();
  assert_eq!(flows.len(), 2);
  assert_eq!(flows[0].nodes.len(), 1);
  assert_eq!(flows[1].edges.len(), 1);
}

#[tokio::test]
async fn test_delete_flow_removes_only_matching_entry() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  persistence.observe(&[node("a", "hi")], &[]);
  let keep = persistence.save_flow("Keep");
  let removed = persistence.save_flow("Drop");

  persistence.delete_flow(&removed.id);
  assert_eq!(persistence.saved_flows(), vec![keep.clone()]);
  assert_eq!(stored_flows(&context), vec![keep.clone()]);
  assert!(persistence.find_flow(&removed.id).is_none());
  assert_eq!(persistence.find_flow(&keep.id), Some(keep));
}

#[tokio::test]
async fn test_delete_unknown_flow_is_a_no_op() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  persistence.observe(&[node("a", "hi")], &[]);
  let saved = persistence.save_flow("Only");
  let mut events = context.subscribe();

  persistence.delete_flow("does-not-exist");

  assert_eq!(persistence.saved_flows(), vec![saved]);
  assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_reopening_restores_saved_flows_and_draft() {
  let storage = Storage::new(MemoryStorage::new());
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  persistence.observe(&[node("a", "hi")], &[]);
  let saved = persistence.save_flow("Restore me");
  persistence.flush();
  drop(persistence);

  let reopened = FlowPersistence::new(storage.context(), &PersistenceConfig::default());
  assert_eq!(reopened.saved_flows(), vec![saved]);
  assert_eq!(reopened.current_flow_state().nodes, vec![node("a", "hi")]);
}

#[tokio::test]
async fn test_corrupt_slots_fall_back_to_empty() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  context.set(SAVED_FLOWS_KEY, "not json").unwrap();
  context.set(CURRENT_FLOW_KEY, "{\"nodes\": 3}").unwrap();

  let persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());
  assert!(persistence.saved_flows().is_empty());
  assert_eq!(persistence.current_flow_state(), CurrentFlowState::default());
}

#[tokio::test(start_paused = true)]
async fn test_full_storage_keeps_working_in_memory() {
  let storage = Storage::new(MemoryStorage::with_quota(16));
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  persistence.observe(&[node("a", "hi")], &[]);
  let saved = persistence.save_flow("Too big");
  sleep(Duration::from_millis(1500)).await;

  assert_eq!(persistence.saved_flows(), vec![saved]);
  assert_eq!(persistence.current_flow_state().nodes.len(), 1);
  assert!(stored_flows(&context).is_empty());
  assert!(stored_draft(&context).is_none());
}

#[tokio::test]
async fn test_saves_from_another_context_are_followed() {
  let storage = Storage::new(MemoryStorage::new());
  let mut tab_a = FlowPersistence::new(storage.context(), &PersistenceConfig::default());
  let tab_b = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  let _sync = tab_b.sync();
  let mut watcher = tab_b.watch_saved_flows();

  tab_a.observe(&[node("a", "hi")], &[]);
  let saved = tab_a.save_flow("Shared");

  tokio::time::timeout(Duration::from_secs(1), watcher.changed())
    .await
    .expect("saved flows not synced")
    .unwrap();
  assert_eq!(tab_b.saved_flows(), vec![saved]);
}

#[tokio::test(start_paused = true)]
async fn test_discard_draft_empties_slot_and_cancels_pending_write() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  persistence.observe(&[node("a", "first")], &[]);
  persistence.flush();
  persistence.observe(&[node("a", "second")], &[]);
  persistence.discard_draft();
  sleep(Duration::from_millis(1500)).await;

  assert_eq!(stored_draft(&context), Some(CurrentFlowState::default()));
  assert!(persistence.current_flow_state().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_flush_after_clearing_writes_last_scheduled_flow() {
  let storage = Storage::new(MemoryStorage::new());
  let context = storage.context();
  let mut persistence = FlowPersistence::new(storage.context(), &PersistenceConfig::default());

  persistence.observe(&[node("a", "kept")], &[]);
  persistence.observe(&[], &[]);

  assert!(persistence.flush());
  assert_eq!(stored_draft(&context).unwrap().nodes, vec![node("a", "kept")]);
}
