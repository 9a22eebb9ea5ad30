#![forbid(unsafe_code)]

//! Errors raised by tree operations on a [`Document`](crate::Document).

use crate::node::NodeId;

/// Error type for document tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomError {
    /// The node id does not belong to this document.
    UnknownNode(NodeId),
    /// Inserting `child` under `parent` would make a node its own ancestor.
    HierarchyRequest {
        /// The requested parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },
    /// `child` is not a direct child of `parent`.
    NotAChild {
        /// The node that was expected to be the parent.
        parent: NodeId,
        /// The node that was expected to be the child.
        child: NodeId,
    },
}

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode(node) => write!(f, "node {node} does not exist in this document"),
            Self::HierarchyRequest { parent, child } => {
                write!(f, "cannot insert {child} into its own descendant {parent}")
            }
            Self::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of {parent}")
            }
        }
    }
}

impl std::error::Error for DomError {}
