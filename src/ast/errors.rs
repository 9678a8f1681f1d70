//! Error types for tree construction and container access.
//!
//! Errors raised by a pass's own logic never pass through these types: they
//! travel in the visitor's `Output` and reach the caller unchanged.

use thiserror::Error;

use super::nodes::NodeKind;

/// Errors raised by the tree core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// A node or container was built with the wrong shape, or mutated after
    /// it was published.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// The value of an empty optional slot was read.
    #[error("value read from an empty optional slot")]
    EmptyAccess,

    /// A list element was requested outside `[0, len)`.
    #[error("index {index} out of range for a list of {len} elements")]
    Index { index: usize, len: usize },
}

/// Shape violations found while constructing a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("{node} takes {expected} fields, got {found}")]
    Arity {
        node: NodeKind,
        expected: usize,
        found: usize,
    },

    #[error("field `{field}` of {node}: {source}")]
    Field {
        node: NodeKind,
        field: &'static str,
        #[source]
        source: Box<ConstructionError>,
    },

    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: &'static str },

    #[error("sequence takes {expected} elements, got {found}")]
    SequenceArity { expected: usize, found: usize },

    #[error("{choice} has no alternative #{which}")]
    UnknownAlternative { choice: &'static str, which: usize },

    #[error("{choice} holds alternative `{found}`, not `{expected}`")]
    WrongAlternative {
        choice: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot add to a list that has already been published")]
    Sealed,
}

impl ConstructionError {
    pub(crate) fn in_field(self, node: NodeKind, field: &'static str) -> Self {
        ConstructionError::Field {
            node,
            field,
            source: Box::new(self),
        }
    }
}
