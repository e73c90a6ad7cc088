//! Chatflow Persistence
//!
//! Composes two [`chatflow_store::KeyedStore`] slots into the flow
//! persistence contract:
//! - the draft slot, rewritten by a debounced auto-save after edits settle
//! - the saved flows slot, appended to on explicit save
//!
//! Storage failures are logged by the store and never surface here.

mod coordinator;
mod debounce;

pub use coordinator::FlowPersistence;
pub use debounce::Debouncer;
