use std::ops::ControlFlow;

use ctree::ast::*;
use ctree::parser::Parser;
use ctree::passes::{histogram, unparse};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn parse_expression(source: &str) -> Expression {
    Parser::new(source)
        .expect("Lexing failed")
        .parse_expression()
        .expect("Parsing failed")
}

/// Finds the outermost binary level that applies an operator.
struct OuterOperator;

macro_rules! applied_operator {
    ($node:expr, $($level:ident),+) => {
        match $node {
            $(NodeRef::$level(level) => level.rhs().as_option().map(|(op, _)| op.text().to_string()),)+
            _ => None,
        }
    };
}

impl Walk for OuterOperator {
    type Output = Option<(NodeKind, String)>;

    fn empty(&mut self) -> Self::Output {
        None
    }

    fn token(&mut self, _token: &Token, _ctx: &()) -> Self::Output {
        None
    }

    fn merge(&mut self, acc: Self::Output, next: Self::Output) -> Self::Output {
        acc.or(next)
    }

    fn enter(&mut self, node: NodeRef<'_>, _ctx: &()) -> ControlFlow<Self::Output> {
        let operator = applied_operator!(
            node,
            LogicalOrExpression,
            LogicalAndExpression,
            InclusiveOrExpression,
            ExclusiveOrExpression,
            AndExpression,
            EqualityExpression,
            RelationalExpression,
            ShiftExpression,
            AdditiveExpression,
            MultiplicativeExpression
        );
        match operator {
            Some(op) => ControlFlow::Break(Some((node.kind(), op))),
            None => ControlFlow::Continue(()),
        }
    }

    fn is_done(&self, acc: &Self::Output) -> bool {
        acc.is_some()
    }
}

#[rstest]
#[case("a || b && c", NodeKind::LogicalOrExpression, "||")]
#[case("a && b | c", NodeKind::LogicalAndExpression, "&&")]
#[case("a | b ^ c", NodeKind::InclusiveOrExpression, "|")]
#[case("a ^ b & c", NodeKind::ExclusiveOrExpression, "^")]
#[case("a & b == c", NodeKind::AndExpression, "&")]
#[case("a != b < c", NodeKind::EqualityExpression, "!=")]
#[case("a >= b << c", NodeKind::RelationalExpression, ">=")]
#[case("a >> b - c", NodeKind::ShiftExpression, ">>")]
#[case("a + b % c", NodeKind::AdditiveExpression, "+")]
#[case("a * b + c", NodeKind::AdditiveExpression, "+")]
#[case("(a + b) / c", NodeKind::MultiplicativeExpression, "/")]
fn test_precedence(#[case] source: &str, #[case] kind: NodeKind, #[case] operator: &str) {
    let expr = parse_expression(source);
    let outer = DepthFirst::new(OuterOperator).run(&expr, ());
    assert_eq!(outer, Some((kind, operator.to_string())));
}

#[rstest]
#[case("-(int) x")]
#[case("sizeof *p")]
#[case("!f(a, b)[i]")]
#[case("c ? x : y")]
fn test_no_binary_operator(#[case] source: &str) {
    let expr = parse_expression(source);
    assert_eq!(DepthFirst::new(OuterOperator).run(&expr, ()), None);
}

#[test]
fn test_binary_levels_nest_to_the_right() {
    let expr = parse_expression("a - b - c");
    assert_eq!(histogram(&expr).count(NodeKind::AdditiveExpression), 3);

    let additive = expr
        .first()
        .form()
        .as_conditional()
        .unwrap()
        .condition()
        .lhs()
        .lhs()
        .lhs()
        .lhs()
        .lhs()
        .lhs()
        .lhs()
        .lhs();
    let (_, right) = additive.rhs().value().unwrap();
    assert_eq!(unparse(right.as_ref()), "b - c\n");
}

#[test]
fn test_assignment_operators() {
    for op in ["=", "*=", "/=", "%=", "+=", "-=", "<<=", ">>=", "&=", "^=", "|="] {
        let expr = parse_expression(&format!("x {op} y"));
        let (_, operator, _) = expr.first().form().as_assign().unwrap();
        assert_eq!(operator.operator().text(), op);
    }
}

#[rstest]
#[case("a +", "Expected expression, found end of file")]
#[case("(a", "Expected ')' to close parenthesized expression, found end of file")]
#[case("f(a,)", "Expected expression, found ')'")]
#[case("p->5", "Expected identifier after '->', found integer literal 5")]
#[case("a ? b", "Expected ':' in conditional expression, found end of file")]
fn test_expression_errors(#[case] source: &str, #[case] message: &str) {
    let err = Parser::new(source)
        .expect("Lexing failed")
        .parse_expression()
        .unwrap_err();
    assert_eq!(err.message, message);
}
