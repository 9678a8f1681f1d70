//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Every token keeps the exact source slice it was read from, so literals
//! retain their quotes, escapes and suffixes. Preprocessor lines are skipped
//! rather than interpreted.

use thiserror::Error;

use crate::ast::{SourceLocation, Token, TokenKind};

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexer error at line {}, column {}: {message}", location.line, location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl LexError {
    fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.current_location()));
                break;
            }

            if self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let loc = self.current_location();
        let ch = self
            .advance()
            .ok_or_else(|| LexError::new("Unexpected end of file", loc))?;

        let kind = match ch {
            '"' => self.string_literal(loc)?,
            '\'' => self.char_literal(loc)?,
            '0'..='9' => self.number_literal(ch, start, loc)?,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, start, loc)?
            }
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(start),

            '+' => {
                if self.follow('+') {
                    TokenKind::PlusPlus
                } else if self.follow('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.follow('-') {
                    TokenKind::MinusMinus
                } else if self.follow('=') {
                    TokenKind::MinusEq
                } else if self.follow('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => self.with_eq(TokenKind::Star, TokenKind::StarEq),
            '/' => self.with_eq(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.with_eq(TokenKind::Percent, TokenKind::PercentEq),
            '=' => self.with_eq(TokenKind::Eq, TokenKind::EqEq),
            '!' => self.with_eq(TokenKind::Bang, TokenKind::NotEq),
            '^' => self.with_eq(TokenKind::Caret, TokenKind::CaretEq),
            '<' => {
                if self.follow('<') {
                    self.with_eq(TokenKind::LtLt, TokenKind::LtLtEq)
                } else {
                    self.with_eq(TokenKind::Lt, TokenKind::Le)
                }
            }
            '>' => {
                if self.follow('>') {
                    self.with_eq(TokenKind::GtGt, TokenKind::GtGtEq)
                } else {
                    self.with_eq(TokenKind::Gt, TokenKind::Ge)
                }
            }
            '&' => {
                if self.follow('&') {
                    TokenKind::AndAnd
                } else {
                    self.with_eq(TokenKind::Amp, TokenKind::AmpEq)
                }
            }
            '|' => {
                if self.follow('|') {
                    TokenKind::OrOr
                } else {
                    self.with_eq(TokenKind::Pipe, TokenKind::PipeEq)
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '~' => TokenKind::Tilde,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => {
                return Err(LexError::new(
                    format!("Unexpected character: '{}'", ch),
                    loc,
                ));
            }
        };

        Ok(Token::new(kind, self.slice_from(start), loc))
    }

    /// Consumes `expected` if it is the next character.
    fn follow(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn with_eq(&mut self, plain: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.follow('=') {
            with_eq
        } else {
            plain
        }
    }

    fn string_literal(&mut self, loc: SourceLocation) -> Result<TokenKind, LexError> {
        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(TokenKind::StringLiteral);
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    if self.advance().is_none() {
                        break;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }

        Err(LexError::new("Unterminated string literal", loc))
    }

    fn char_literal(&mut self, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut length = 0;

        while let Some(ch) = self.peek() {
            match ch {
                '\'' => {
                    self.advance();
                    if length == 0 {
                        return Err(LexError::new("Empty character literal", loc));
                    }
                    return Ok(TokenKind::CharacterLiteral);
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    if self.advance().is_none() {
                        break;
                    }
                }
                _ => {
                    self.advance();
                }
            }
            length += 1;
        }

        Err(LexError::new("Unterminated character literal", loc))
    }

    /// Integer (decimal, octal, hex) or floating point literal, with suffixes.
    fn number_literal(
        &mut self,
        first: char,
        start: usize,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        if first == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            let digits = self.take_while(|c| c.is_ascii_hexdigit());
            if digits == 0 {
                return Err(LexError::new("Hex literal has no digits", loc));
            }
            self.take_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
            return Ok(TokenKind::IntegerLiteral);
        }

        let mut is_float = first == '.';
        self.take_while(|c| c.is_ascii_digit());

        if !is_float && self.peek() == Some('.') {
            is_float = true;
            self.advance();
            self.take_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = matches!(self.peek_ahead(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.advance();
                if sign {
                    self.advance();
                }
                self.take_while(|c| c.is_ascii_digit());
            }
        }

        if is_float {
            self.take_while(|c| matches!(c, 'f' | 'F' | 'l' | 'L'));
            Ok(TokenKind::FloatingPointLiteral)
        } else {
            self.take_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
            if self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(LexError::new(
                    format!("Invalid integer literal: {}", self.slice_from(start)),
                    loc,
                ));
            }
            Ok(TokenKind::IntegerLiteral)
        }
    }

    fn identifier_or_keyword(&mut self, start: usize) -> TokenKind {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let word = self.slice_from(start);
        TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier)
    }

    /// Consumes characters while `pred` holds, returning how many.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
            count += 1;
        }
        count
    }

    fn slice_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::new("Unterminated block comment", start_loc))
    }

    /// Skip a preprocessor line, following `\` continuations.
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            match ch {
                '\\' if self.peek() == Some('\n') => {
                    self.advance();
                }
                '\n' => break,
                _ => {}
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
