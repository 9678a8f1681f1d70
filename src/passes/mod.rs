//! Reference analysis passes.
//!
//! Each pass is a [`Walk`](crate::ast::Walk) driven by
//! [`DepthFirst`](crate::ast::DepthFirst), and together they cover every
//! visitor shape:
//!
//! - [`token_count`]: returns a value, no context
//! - [`pretty`]: neither value nor context
//! - [`expressions`]: threads a [`Scope`] context, no value
//! - [`unsafe_calls`]: returns findings and can stop at the first one
//! - [`kinds`] and [`declarations`]: side tables filled from the hooks
//!
//! None of them touches the node definitions; they only read the tree
//! through accessors and [`NodeRef`](crate::ast::NodeRef) matches.

pub mod declarations;
pub mod expressions;
pub mod kinds;
pub mod pretty;
pub mod token_count;
pub mod unsafe_calls;

pub use declarations::{collect_declarations, Declaration, DeclarationCollector, Role, TypeClass};
pub use expressions::{extract_expressions, ExpressionExtractor, ExtractedExpression, Scope};
pub use kinds::{histogram, KindHistogram};
pub use pretty::{unparse, PrettyPrinter};
pub use token_count::{count_tokens, TokenCounter};
pub use unsafe_calls::{find_unsafe_calls, FinderConfig, Finding, UnsafeCallFinder};
