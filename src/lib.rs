//! # Introduction
//!
//! ctree parses a subset of C into a strictly typed syntax tree and runs
//! independent analysis passes over it, none of which needs to modify the
//! node definitions or inspect types at run time.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → typed tree → Visitor passes → Reports
//! ```
//!
//! 1. [`ast`]: the node catalog generated from one grammar listing, the
//!    composite containers, and the generic [`ast::Visitor`] with its
//!    depth-first walker.
//! 2. [`parser`]: tokenises the source and builds the tree, one parse
//!    method per production.
//! 3. [`passes`]: reference passes: token counting, printing, kind
//!    histograms, unsafe call detection, expression extraction and
//!    declaration classification.
//!
//! ## Example
//!
//! ```
//! use ctree::parser::parse;
//! use ctree::passes::{count_tokens, unparse};
//!
//! let unit = parse("int f(int x) { return x; }").unwrap();
//! assert_eq!(count_tokens(&unit), 11);
//! assert_eq!(unparse(&unit), "int f(int x) {\n    return x;\n}\n");
//! ```
//!
//! Trees are immutable once built and hold no interior mutability, so any
//! number of passes may walk one tree from several threads at once.

pub mod ast;
pub mod parser;
pub mod passes;
