//! Typed syntax tree for the supported C subset
//!
//! This module holds the tree and its traversal protocol:
//! - [`token`]: leaf tokens with kind, source text and position
//! - [`containers`]: lists, optional slots, sequences and choices, and the
//!   field hooks node constructors run
//! - [`grammar`]: the production list every generated item comes from
//! - [`nodes`]: one struct per production, plus [`NodeKind`], [`NodeRef`]
//!   and the erased [`AnyNode`]
//! - [`visitor`]: [`Node`], [`Visitor`], and the [`DepthFirst`] walker
//! - [`errors`]: construction and access errors
//!
//! Trees are built bottom-up and never mutated afterwards, so a finished tree
//! can be shared freely between threads.

pub mod any;
pub mod containers;
pub mod errors;
pub(crate) mod grammar;
pub mod nodes;
pub mod token;
pub mod visitor;

pub use any::{FromAny, IntoAny};
pub use containers::{Choice, FieldValue, NodeList, NodeOptional, NonEmptyList, Sequence, TokenSlot};
pub use errors::{AstError, ConstructionError};
pub use nodes::*;
pub use token::{SourceLocation, Token, TokenKind};
pub use visitor::{DepthFirst, Each, Node, Visitor, Walk};
