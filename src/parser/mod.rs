//! C source code parser
//!
//! This module turns C source text into the typed tree of [`crate::ast`]:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: the [`Parser`] and its shared helpers
//! - `declarations`, `statements`, `expressions`: one `impl Parser` block
//!   per group of productions
//!
//! # Supported C Subset
//!
//! - Types: the built-in arithmetic types, `struct`/`union`, `enum`,
//!   pointers, arrays, typedef names, function pointer typedefs
//! - Declarations: functions and prototypes, global and local variables
//!   with initializers, bit-fields
//! - Statements: all of C89's, including labels, `switch` and `goto`
//! - Expressions: the full precedence ladder, casts and `sizeof`
//! - Preprocessor lines are skipped, never expanded
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with a bounded lookahead.
//! No external parser generator dependencies.

mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use lexer::{LexError, Lexer};
pub use parse::{ParseError, Parser};

use crate::ast::TranslationUnit;

/// Parses a whole source file.
pub fn parse(source: &str) -> Result<TranslationUnit, ParseError> {
    Parser::new(source)?.parse_translation_unit()
}
