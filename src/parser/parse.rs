//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: external, type and variable declarations
//! - `statements`: statements and blocks
//! - `expressions`: the expression precedence levels
//!
//! Every parse method returns the grammar node it is named after, so the
//! resulting tree has exactly the catalog shapes in [`crate::ast`].
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::ast::{NodeOptional, NonEmptyList, SourceLocation, Token, TokenKind, TranslationUnit};
use crate::parser::lexer::{LexError, Lexer};

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Names introduced by `typedef` so far; they start declarations.
    pub(crate) typedefs: FxHashSet<String>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Builds a parser over an already lexed stream. A missing end-of-file
    /// token is supplied.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let location = tokens.last().map(|t| t.location()).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", location));
        }
        Self {
            tokens,
            position: 0,
            typedefs: FxHashSet::default(),
        }
    }

    /// Parse the entire input as a translation unit.
    pub fn parse_translation_unit(&mut self) -> Result<TranslationUnit, ParseError> {
        if self.is_at_end() {
            return Err(self.error("Expected at least one external declaration"));
        }

        let first = self.parse_external_declaration()?;
        let mut rest = Vec::new();
        while !self.is_at_end() {
            rest.push(self.parse_external_declaration()?);
        }

        debug!(
            declarations = rest.len() + 1,
            typedefs = self.typedefs.len(),
            "parsed translation unit"
        );
        Ok(TranslationUnit::new(NonEmptyList::new(first, rest)))
    }

    /// Typedef names seen so far.
    pub fn typedef_names(&self) -> impl Iterator<Item = &str> {
        self.typedefs.iter().map(String::as_str)
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind()
    }

    /// Kind of the token `offset` places ahead; end of file past the end.
    pub(crate) fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.position + offset)
            .map_or(TokenKind::Eof, Token::kind)
    }

    pub(crate) fn peek_text_at(&self, offset: usize) -> &str {
        self.tokens
            .get(self.position + offset)
            .map_or("", Token::text)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(crate) fn match_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if kinds.contains(&self.peek_kind()) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// An optional single token of `kind`.
    pub(crate) fn optional(&mut self, kind: TokenKind) -> NodeOptional<Token> {
        self.match_kind(kind).into()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, ctx: &str) -> Result<Token, ParseError> {
        match self.match_kind(kind) {
            Some(token) => Ok(token),
            None => Err(self.error(format!("Expected {} {}, found {}", kind, ctx, self.peek()))),
        }
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<Token, ParseError> {
        self.expect(TokenKind::Identifier, ctx)
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<Token, ParseError> {
        self.expect(TokenKind::Semicolon, ctx)
    }

    /// True when the token `offset` ahead can only start a type: a type
    /// keyword, `const`, or a known typedef name.
    pub(crate) fn is_type_start(&self, offset: usize) -> bool {
        match self.peek_kind_at(offset) {
            TokenKind::Identifier => self.typedefs.contains(self.peek_text_at(offset)),
            kind => is_type_keyword(kind),
        }
    }

    /// True when the current item is a declaration rather than a statement.
    ///
    /// Besides [`Parser::is_type_start`], an unknown name followed by a
    /// declarator (`size_t n`, `FILE *fp;`) is taken as a type name, since
    /// preprocessor headers are never read.
    pub(crate) fn is_declaration_start(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Static | TokenKind::Auto | TokenKind::Register => true,
            TokenKind::Identifier if !self.is_type_start(0) => self.is_unknown_type_name(),
            _ => self.is_type_start(0),
        }
    }

    fn is_unknown_type_name(&self) -> bool {
        let mut offset = 1;
        while matches!(self.peek_kind_at(offset), TokenKind::Star | TokenKind::Const) {
            offset += 1;
        }
        if self.peek_kind_at(offset) != TokenKind::Identifier {
            return false;
        }
        // `a b` is never an expression; `a * b` only is when used as one.
        offset == 1
            || matches!(
                self.peek_kind_at(offset + 1),
                TokenKind::Semicolon | TokenKind::Eq | TokenKind::Comma | TokenKind::LBracket
            )
    }
}

pub(crate) fn is_type_keyword(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Const | Void | Char | Short | Int | Long | Float | Double | Signed | Unsigned | Struct
            | Union | Enum
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Choice, ExternalItem, FunctionBody};

    #[test]
    fn test_parse_simple_function() {
        let source = "int main() { return 0; }";
        let mut parser = Parser::new(source).unwrap();
        let unit = parser.parse_translation_unit().unwrap();

        assert_eq!(unit.declarations().size(), 1);
        let decl = unit.declarations().element_at(0).unwrap();
        let function = decl.item().as_function().unwrap();
        assert_eq!(function.name().text(), "main");
        assert!(!function.parameters().is_present());
        let body = function.body().as_definition().unwrap();
        assert_eq!(body.items().size(), 1);
    }

    #[test]
    fn test_parse_prototype() {
        let mut parser = Parser::new("extern int puts(const char *s);").unwrap();
        let unit = parser.parse_translation_unit().unwrap();

        let decl = unit.declarations().element_at(0).unwrap();
        assert_eq!(decl.storage().size(), 1);
        let function = decl.item().as_function().unwrap();
        assert!(matches!(function.body(), FunctionBody::Prototype(_)));
    }

    #[test]
    fn test_parse_struct() {
        let source = "struct Point { int x; int y; };";
        let mut parser = Parser::new(source).unwrap();
        let unit = parser.parse_translation_unit().unwrap();

        let decl = unit.declarations().element_at(0).unwrap();
        assert_eq!(decl.item().alternative(), "Aggregate");
        let (spec, semi) = decl.item().as_aggregate().unwrap();
        assert_eq!(semi.text(), ";");
        let (_, tag, _, members, _) = spec.form().as_definition().unwrap();
        assert_eq!(tag.value().unwrap().text(), "Point");
        assert_eq!(members.members().size(), 2);
    }

    #[test]
    fn test_typedef_registers_name() {
        let source = "typedef struct node node_t; node_t *head;";
        let mut parser = Parser::new(source).unwrap();
        let unit = parser.parse_translation_unit().unwrap();

        assert!(parser.typedef_names().any(|n| n == "node_t"));
        let variable = unit.declarations().element_at(1).unwrap();
        assert!(matches!(variable.item(), ExternalItem::Variable(_)));
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = Parser::new("  // nothing\n").unwrap().parse_translation_unit().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(2, 1));
    }

    #[test]
    fn test_error_message() {
        let err = Parser::new("int main( { }")
            .unwrap()
            .parse_translation_unit()
            .unwrap_err();
        assert!(err.to_string().starts_with("Parse error at line 1, column 11:"));
    }
}
