//! Construction and import errors.

use crate::state::NodeId;

/// Errors raised while building a tree or importing its saved state.
///
/// These indicate programmer or data errors and are reported at construction
/// time; runtime decision failures are expressed as [`crate::Status`] values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The builder was finished without a root node.
    #[error("behavior tree '{0}' has no root node")]
    MissingRoot(String),

    /// A snapshot refers to a node id that does not exist in this tree.
    #[error("snapshot references unknown node {0}")]
    UnknownNode(NodeId),

    /// A snapshot was taken from a tree with a different shape.
    #[error("snapshot was taken from a tree with {expected} nodes, this tree has {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
