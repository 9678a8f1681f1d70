//! Expression extraction.
//!
//! Records every outermost expression of a tree together with where it
//! occurs. The position is threaded down as a [`Scope`] context: entering a
//! function names it, entering a block deepens it. Expressions nested inside
//! a recorded one are part of its text and are not recorded again.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::ast::{DepthFirst, Node, NodeRef, SourceLocation, Token, Walk};
use crate::passes::pretty::unparse;

/// Where in the tree a walk currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Enclosing function, if any.
    pub function: Option<Arc<str>>,
    /// Number of enclosing blocks.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedExpression {
    pub scope: Scope,
    /// Single-line printed form.
    pub text: String,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl fmt::Display for ExtractedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = self.scope.function.as_deref().unwrap_or("<global>");
        write!(
            f,
            "{}-{} {} (depth {}): {}",
            self.start, self.end, function, self.scope.depth, self.text
        )
    }
}

#[derive(Debug, Default)]
pub struct ExpressionExtractor {
    found: Vec<ExtractedExpression>,
}

impl ExpressionExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expressions(&self) -> &[ExtractedExpression] {
        &self.found
    }

    pub fn into_expressions(self) -> Vec<ExtractedExpression> {
        self.found
    }

    fn record<N: Node>(&mut self, node: &N, scope: &Scope) {
        let Some((start, end)) = DepthFirst::new(Span).run(node, ()) else {
            return;
        };
        self.found.push(ExtractedExpression {
            scope: scope.clone(),
            text: unparse(node).trim_end().to_string(),
            start,
            end,
        });
    }
}

impl Walk<Scope> for ExpressionExtractor {
    type Output = ();

    fn empty(&mut self) {}

    fn token(&mut self, _token: &Token, _scope: &Scope) {}

    fn merge(&mut self, _acc: (), _next: ()) {}

    fn enter(&mut self, node: NodeRef<'_>, scope: &Scope) -> ControlFlow<()> {
        match node {
            NodeRef::Expression(expr) => self.record(expr, scope),
            NodeRef::ConstantExpression(expr) => self.record(expr, scope),
            NodeRef::AssignmentExpression(expr) => self.record(expr, scope),
            _ => return ControlFlow::Continue(()),
        }
        ControlFlow::Break(())
    }

    fn descend(&mut self, node: NodeRef<'_>, scope: &Scope) -> Scope {
        match node {
            NodeRef::FunctionDeclaration(function) => Scope {
                function: Some(Arc::from(function.name().text())),
                depth: scope.depth,
            },
            NodeRef::CompoundStatement(_) => Scope {
                function: scope.function.clone(),
                depth: scope.depth + 1,
            },
            _ => scope.clone(),
        }
    }
}

/// First and last token positions of an element.
struct Span;

impl Walk for Span {
    type Output = Option<(SourceLocation, SourceLocation)>;

    fn empty(&mut self) -> Self::Output {
        None
    }

    fn token(&mut self, token: &Token, _ctx: &()) -> Self::Output {
        Some((token.location(), token.location()))
    }

    fn merge(&mut self, acc: Self::Output, next: Self::Output) -> Self::Output {
        match (acc, next) {
            (Some((start, _)), Some((_, end))) => Some((start, end)),
            (acc, None) => acc,
            (None, next) => next,
        }
    }
}

/// The outermost expressions of `node`, in source order.
///
/// Initializers and call arguments outside any recorded expression are
/// assignment expressions and are recorded as such.
pub fn extract_expressions<N: Node>(node: &N) -> Vec<ExtractedExpression> {
    let mut walker = DepthFirst::new(ExpressionExtractor::new());
    walker.run(node, Scope::default());
    walker.into_inner().into_expressions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "int limit = 10;
int main() {
    int i = 0;
    while (i < limit) {
        i = i + 1;
    }
    return i;
}
";

    #[test]
    fn test_scope_and_text() {
        let unit = parse(SOURCE).unwrap();
        let found = extract_expressions(&unit);
        let summary: Vec<_> = found
            .iter()
            .map(|e| (e.scope.function.as_deref(), e.scope.depth, e.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (None, 0, "10"),
                (Some("main"), 1, "0"),
                (Some("main"), 1, "i < limit"),
                (Some("main"), 2, "i = i + 1"),
                (Some("main"), 1, "i"),
            ]
        );
    }

    #[test]
    fn test_span() {
        let unit = parse(SOURCE).unwrap();
        let found = extract_expressions(&unit);
        let assignment = &found[3];
        assert_eq!(assignment.start, SourceLocation::new(5, 9));
        assert_eq!(assignment.end, SourceLocation::new(5, 17));
        assert_eq!(
            assignment.to_string(),
            "5:9-5:17 main (depth 2): i = i + 1"
        );
    }
}
