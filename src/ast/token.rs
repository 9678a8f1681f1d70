//! Token leaves: the atomic, childless elements of the tree.
//!
//! A [`Token`] pairs a [`TokenKind`] with the literal source text it was lexed
//! from and the position where it starts. Keeping the raw text (quotes,
//! escapes and suffixes included) is what lets a printing pass reproduce the
//! input token-for-token.

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Locations of synthetic tokens are line 0, which no lexed token has.
    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Every lexical category of the supported grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    IntegerLiteral,
    FloatingPointLiteral,
    CharacterLiteral,
    StringLiteral,

    // Identifiers
    Identifier,

    // Storage and class keywords
    Auto,
    Register,
    Static,
    Extern,
    Typedef,

    // Type keywords
    Struct,
    Union,
    Enum,
    Const,
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,

    // Statement keywords
    If,
    Else,
    Switch,
    While,
    Do,
    For,
    Goto,
    Continue,
    Break,
    Return,
    Case,
    Default,
    Sizeof,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    LtLt,  // <<
    GtGt,  // >>

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    LtLtEq,    // <<=
    GtGtEq,    // >>=
    AmpEq,     // &=
    CaretEq,   // ^=
    PipeEq,    // |=

    // Increment/Decrement
    PlusPlus,   // ++
    MinusMinus, // --

    // Member access
    Dot,   // .
    Arrow, // ->

    // Ternary
    Question, // ?
    Colon,    // :

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Ellipsis,  // ...

    // End of file
    Eof,
}

impl TokenKind {
    /// The fixed spelling of keywords and punctuators; `None` for literals,
    /// identifiers and end of file.
    pub fn spelling(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            IntegerLiteral | FloatingPointLiteral | CharacterLiteral | StringLiteral
            | Identifier | Eof => return None,
            Auto => "auto",
            Register => "register",
            Static => "static",
            Extern => "extern",
            Typedef => "typedef",
            Struct => "struct",
            Union => "union",
            Enum => "enum",
            Const => "const",
            Void => "void",
            Char => "char",
            Short => "short",
            Int => "int",
            Long => "long",
            Float => "float",
            Double => "double",
            Signed => "signed",
            Unsigned => "unsigned",
            If => "if",
            Else => "else",
            Switch => "switch",
            While => "while",
            Do => "do",
            For => "for",
            Goto => "goto",
            Continue => "continue",
            Break => "break",
            Return => "return",
            Case => "case",
            Default => "default",
            Sizeof => "sizeof",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            EqEq => "==",
            NotEq => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            AndAnd => "&&",
            OrOr => "||",
            Bang => "!",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            LtLt => "<<",
            GtGt => ">>",
            Eq => "=",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            LtLtEq => "<<=",
            GtGtEq => ">>=",
            AmpEq => "&=",
            CaretEq => "^=",
            PipeEq => "|=",
            PlusPlus => "++",
            MinusMinus => "--",
            Dot => ".",
            Arrow => "->",
            Question => "?",
            Colon => ":",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Semicolon => ";",
            Comma => ",",
            Ellipsis => "...",
        };
        Some(text)
    }

    /// Spelling of fixed tokens, or the category name of the others.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::FloatingPointLiteral => "floating point literal",
            TokenKind::CharacterLiteral => "character literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Eof => "end of file",
            other => other.spelling().unwrap_or("token"),
        }
    }

    /// Maps a word to its keyword kind.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        let kind = match word {
            "auto" => Auto,
            "register" => Register,
            "static" => Static,
            "extern" => Extern,
            "typedef" => Typedef,
            "struct" => Struct,
            "union" => Union,
            "enum" => Enum,
            "const" => Const,
            "void" => Void,
            "char" => Char,
            "short" => Short,
            "int" => Int,
            "long" => Long,
            "float" => Float,
            "double" => Double,
            "signed" => Signed,
            "unsigned" => Unsigned,
            "if" => If,
            "else" => Else,
            "switch" => Switch,
            "while" => While,
            "do" => Do,
            "for" => For,
            "goto" => Goto,
            "continue" => Continue,
            "break" => Break,
            "return" => Return,
            "case" => Case,
            "default" => Default,
            "sizeof" => Sizeof,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntegerLiteral
                | TokenKind::FloatingPointLiteral
                | TokenKind::CharacterLiteral
                | TokenKind::StringLiteral
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Eq | StarEq
                | SlashEq
                | PercentEq
                | PlusEq
                | MinusEq
                | LtLtEq
                | GtGtEq
                | AmpEq
                | CaretEq
                | PipeEq
        )
    }

    pub fn is_unary_operator(self) -> bool {
        use TokenKind::*;
        matches!(self, Amp | Star | Plus | Minus | Tilde | Bang)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntegerLiteral => write!(f, "integer literal"),
            TokenKind::FloatingPointLiteral => write!(f, "floating point literal"),
            TokenKind::CharacterLiteral => write!(f, "character literal"),
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Eof => write!(f, "end of file"),
            other => match other.spelling() {
                Some(text) => write!(f, "'{}'", text),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

/// One lexical token: the leaf of every tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    /// A token with the kind's fixed spelling and no source position.
    ///
    /// Used by the convenience constructors that supply literal punctuation
    /// on the caller's behalf.
    pub fn synthetic(kind: TokenKind) -> Self {
        Self::new(kind, kind.spelling().unwrap_or_default(), SourceLocation::default())
    }

    /// A synthetic identifier token.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(TokenKind::Identifier, name, SourceLocation::default())
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            kind if kind.is_literal() => write!(f, "{} {}", kind, self.text),
            kind => write!(f, "{}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_token_uses_spelling() {
        let star = Token::synthetic(TokenKind::Star);
        assert_eq!(star.text(), "*");
        assert!(star.location().is_synthetic());

        let arrow = Token::synthetic(TokenKind::Arrow);
        assert_eq!(arrow.text(), "->");
    }

    #[test]
    fn test_keyword_round_trip() {
        for word in ["auto", "register", "typedef", "unsigned", "sizeof", "default"] {
            let kind = TokenKind::keyword(word).unwrap();
            assert_eq!(kind.spelling(), Some(word));
        }
        assert_eq!(TokenKind::keyword("NULL"), None);
    }

    #[test]
    fn test_display() {
        let tok = Token::new(TokenKind::Identifier, "main", SourceLocation::new(1, 5));
        assert_eq!(tok.to_string(), "identifier 'main'");
        assert_eq!(TokenKind::LBrace.to_string(), "'{'");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TokenKind::PlusEq.name(), "+=");
        assert_eq!(TokenKind::Static.name(), "static");
        assert_eq!(TokenKind::CharacterLiteral.name(), "character literal");
    }

    #[test]
    fn test_operator_classes() {
        assert!(TokenKind::LtLtEq.is_assignment_operator());
        assert!(!TokenKind::LtLt.is_assignment_operator());
        assert!(TokenKind::Tilde.is_unary_operator());
        assert!(!TokenKind::PlusPlus.is_unary_operator());
    }
}
