//! Source printing.
//!
//! The printer sees only the token leaves, in tree order, and decides the
//! whitespace between them: a newline after `;` and around braces, one level
//! of indentation per open brace, and a single space between tokens unless
//! one of the pair is tight punctuation. Spaces are only ever dropped next to
//! tokens that cannot merge with a neighbour, so lexing the output again
//! yields the same token stream.

use crate::ast::{DepthFirst, Node, Token, TokenKind, Walk};

const INDENT: &str = "    ";

/// Accumulates the printed source of every token it is shown.
#[derive(Debug, Default)]
pub struct PrettyPrinter {
    out: String,
    indent: usize,
    /// Open parentheses; `;` inside a `for` header stays on the line.
    parens: usize,
    line_start: bool,
    after_close_brace: bool,
    prev: Option<TokenKind>,
}

impl PrettyPrinter {
    pub fn new() -> Self {
        Self {
            line_start: true,
            ..Self::default()
        }
    }

    /// The printed text, ending with a newline.
    pub fn finish(mut self) -> String {
        self.newline();
        self.out
    }

    fn newline(&mut self) {
        if !self.line_start {
            self.out.push('\n');
            self.line_start = true;
        }
    }

    fn print(&mut self, token: &Token) {
        let kind = token.kind();
        if std::mem::take(&mut self.after_close_brace)
            && !matches!(kind, TokenKind::Semicolon | TokenKind::Comma | TokenKind::Else)
        {
            self.newline();
        }
        if kind == TokenKind::RBrace {
            self.indent = self.indent.saturating_sub(1);
            self.newline();
        }

        if self.line_start {
            self.out.push_str(&INDENT.repeat(self.indent));
            self.line_start = false;
        } else if self.prev.is_some_and(|prev| spaced(prev, kind)) {
            self.out.push(' ');
        }
        self.out.push_str(token.text());
        self.prev = Some(kind);

        match kind {
            TokenKind::LBrace => {
                self.indent += 1;
                self.newline();
            }
            TokenKind::RBrace => self.after_close_brace = true,
            TokenKind::LParen => self.parens += 1,
            TokenKind::RParen => self.parens = self.parens.saturating_sub(1),
            TokenKind::Semicolon if self.parens == 0 => self.newline(),
            _ => {}
        }
    }
}

/// Whether a space separates `prev` and `next`.
fn spaced(prev: TokenKind, next: TokenKind) -> bool {
    use TokenKind::*;
    let tight_after = matches!(prev, Identifier | RParen | RBracket);
    match (prev, next) {
        (_, RParen | RBracket | Comma | Semicolon) => false,
        (LParen | LBracket | Dot | Arrow, _) => false,
        (_, Dot | Arrow | LParen | LBracket) if tight_after => false,
        _ => true,
    }
}

impl Walk for PrettyPrinter {
    type Output = ();

    fn empty(&mut self) {}

    fn token(&mut self, token: &Token, _ctx: &()) {
        self.print(token);
    }

    fn merge(&mut self, _acc: (), _next: ()) {}
}

/// Prints `node` back to C source.
pub fn unparse<N: Node>(node: &N) -> String {
    let mut printer = DepthFirst::new(PrettyPrinter::new());
    printer.run(node, ());
    printer.into_inner().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_function_layout() {
        let unit = parse("int f(int x){return x;}").unwrap();
        assert_eq!(unparse(&unit), "int f(int x) {\n    return x;\n}\n");
    }

    #[test]
    fn test_nested_blocks_and_headers() {
        let source = "void g(int *p){for(i=0;i<3;i++){p[i]=s.a->b;}if(p)x=-1;else{x=- -1;}}";
        let expected = "\
void g(int * p) {
    for (i = 0; i < 3; i ++) {
        p[i] = s.a->b;
    }
    if (p) x = - 1;
    else {
        x = - - 1;
    }
}
";
        assert_eq!(unparse(&parse(source).unwrap()), expected);
    }

    #[test]
    fn test_closing_brace_keeps_its_semicolon() {
        let unit = parse("struct P { int x; }; int a[] = { 1, 2 };").unwrap();
        assert_eq!(
            unparse(&unit),
            "struct P {\n    int x;\n};\nint a[] = {\n    1, 2\n};\n"
        );
    }
}
