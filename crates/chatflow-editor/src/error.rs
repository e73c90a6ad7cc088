use chatflow_workflow::FlowError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
  #[error(transparent)]
  Flow(#[from] FlowError),

  #[error("node not found: {0}")]
  NodeNotFound(String),

  #[error("saved flow not found: {0}")]
  SavedFlowNotFound(String),
}
