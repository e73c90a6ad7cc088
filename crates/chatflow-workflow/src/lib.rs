//! Chatflow Workflow
//!
//! Pure functions over a flow's nodes and edges:
//! - Structural validation before a flow is saved
//! - The single-outgoing-edge guard applied before a connection is added
//! - Node construction and immutable data updates
//!
//! Nothing here touches storage or holds state beyond the node id counter.

mod error;
mod factory;
mod graph;
mod validate;

pub use error::FlowError;
pub use factory::{IdGenerator, advance_node_ids, create_node, update_node_data};
pub use graph::Graph;
pub use validate::{ValidationReport, check_source_node_edges, validate_flow};
