//! Chatflow Config
//!
//! This crate contains the serializable types shared by every Chatflow crate:
//! the message nodes and connections that make up a flow, the saved and draft
//! snapshots written to storage, and the persistence settings.
//!
//! The JSON shape matches what the canvas produces, so documents written by
//! other tools round-trip without losing fields:
//!
//! ```json
//! {
//!   "id": "node_1717171717171",
//!   "type": "textMessage",
//!   "position": { "x": 120.0, "y": 48.5 },
//!   "data": { "label": "Hello there!" }
//! }
//! ```

mod edge;
mod flow;
mod node;
mod settings;

pub use edge::Edge;
pub use flow::{CurrentFlowState, SavedFlow};
pub use node::{Node, NodeData, Position, TEXT_MESSAGE};
pub use settings::{AUTO_SAVE_DELAY, CURRENT_FLOW_KEY, PersistenceConfig, SAVED_FLOWS_KEY};
