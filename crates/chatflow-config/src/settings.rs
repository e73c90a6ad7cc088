use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Storage key of the auto-saved draft.
pub const CURRENT_FLOW_KEY: &str = "bitespeed-current-flow";

/// Storage key of the saved flows list.
pub const SAVED_FLOWS_KEY: &str = "bitespeed-saved-flows";

/// Quiet period before the draft is written, in milliseconds.
pub const AUTO_SAVE_DELAY: u64 = 1000;

/// Where flows are persisted and how eagerly the draft is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
  pub current_flow_key: String,
  pub saved_flows_key: String,
  pub auto_save_delay_ms: u64,
}

impl PersistenceConfig {
  pub fn auto_save_delay(&self) -> Duration {
    Duration::from_millis(self.auto_save_delay_ms)
  }
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      current_flow_key: CURRENT_FLOW_KEY.to_string(),
      saved_flows_key: SAVED_FLOWS_KEY.to_string(),
      auto_save_delay_ms: AUTO_SAVE_DELAY,
    }
  }
}
