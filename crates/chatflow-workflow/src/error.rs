use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
  #[error("Cannot save flow: No nodes present")]
  EmptyFlow,

  #[error("Cannot save flow: More than one node has empty target handles")]
  MultipleEntryPoints { count: usize },

  #[error("Source handle can only have one outgoing edge")]
  DuplicateOutgoingEdge { node_id: String },
}
