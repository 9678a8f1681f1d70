//! Expression parsing implementation
//!
//! This module handles parsing of C expressions, one method per precedence
//! level of the grammar:
//!
//! ```text
//! expression   ::= assignment ( "," assignment )*
//! assignment   ::= unary assign_op assignment | conditional
//! conditional  ::= logical_or [ "?" expression ":" conditional ]
//! logical_or   ::= logical_and [ "||" logical_or ]
//!  ...
//! multiplicative ::= cast [ ( "*" | "/" | "%" ) multiplicative ]
//! cast         ::= "(" type ")" cast | unary
//! ```
//!
//! Binary levels are right-recursive, exactly as the tree stores them: the
//! optional right operand of each level is another node of the same level.
//!
//! Assignment is parsed by reading a conditional expression first; when an
//! assignment operator follows, the conditional must be a bare unary
//! expression and is narrowed to one, so no input is read twice.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::ast::*;
use crate::parser::parse::{is_type_keyword, ParseError, Parser};

/// One right-recursive binary precedence level.
macro_rules! binary_level {
    ($(#[$doc:meta])* $fn_name:ident -> $node:ident, $next:ident, [$($op:ident),+]) => {
        $(#[$doc])*
        fn $fn_name(&mut self) -> Result<$node, ParseError> {
            let lhs = self.$next()?;
            let rhs = match self.match_any(&[$(TokenKind::$op),+]) {
                Some(op) => NodeOptional::present((op, Box::new(self.$fn_name()?))),
                None => NodeOptional::empty(),
            };
            Ok($node::new(lhs, rhs))
        }
    };
}

/// Unwraps one precedence level with no operator applied, or bails out.
macro_rules! sole_operand {
    ($level:expr) => {{
        let (lhs, rhs) = $level.into_parts();
        if rhs.is_present() {
            return None;
        }
        lhs
    }};
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let first = self.parse_assignment_expression()?;
        let mut rest = Vec::new();
        while let Some(comma) = self.match_kind(TokenKind::Comma) {
            rest.push((comma, self.parse_assignment_expression()?));
        }
        Ok(Expression::new(first, rest.into()))
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Result<AssignmentExpression, ParseError> {
        let start = self.current_location();
        let conditional = self.parse_conditional_expression()?;

        if !self.peek_kind().is_assignment_operator() {
            return Ok(AssignmentExpression::new(AssignmentForm::Conditional(
                conditional,
            )));
        }

        let Some(target) = narrow_to_unary(conditional) else {
            return Err(ParseError {
                message: format!("Invalid assignment target before {}", self.peek()),
                location: start,
            });
        };
        let operator = AssignmentOperator::new(self.advance());
        let value = self.parse_assignment_expression()?;
        Ok(AssignmentExpression::new(AssignmentForm::Assign((
            target,
            operator,
            Box::new(value),
        ))))
    }

    fn parse_conditional_expression(&mut self) -> Result<ConditionalExpression, ParseError> {
        let condition = self.parse_logical_or()?;
        let branches = match self.match_kind(TokenKind::Question) {
            Some(question) => {
                let then = self.parse_expression()?;
                let colon = self.expect(TokenKind::Colon, "in conditional expression")?;
                let otherwise = self.parse_conditional_expression()?;
                NodeOptional::present((question, Box::new(then), colon, Box::new(otherwise)))
            }
            None => NodeOptional::empty(),
        };
        Ok(ConditionalExpression::new(condition, branches))
    }

    pub(crate) fn parse_constant_expression(&mut self) -> Result<ConstantExpression, ParseError> {
        Ok(ConstantExpression::new(self.parse_conditional_expression()?))
    }

    binary_level!(parse_logical_or -> LogicalOrExpression, parse_logical_and, [OrOr]);
    binary_level!(parse_logical_and -> LogicalAndExpression, parse_inclusive_or, [AndAnd]);
    binary_level!(parse_inclusive_or -> InclusiveOrExpression, parse_exclusive_or, [Pipe]);
    binary_level!(parse_exclusive_or -> ExclusiveOrExpression, parse_and, [Caret]);
    binary_level!(parse_and -> AndExpression, parse_equality, [Amp]);
    binary_level!(parse_equality -> EqualityExpression, parse_relational, [EqEq, NotEq]);
    binary_level!(parse_relational -> RelationalExpression, parse_shift, [Lt, Gt, Le, Ge]);
    binary_level!(parse_shift -> ShiftExpression, parse_additive, [LtLt, GtGt]);
    binary_level!(parse_additive -> AdditiveExpression, parse_multiplicative, [Plus, Minus]);
    binary_level!(parse_multiplicative -> MultiplicativeExpression, parse_cast, [Star, Slash, Percent]);

    fn parse_cast(&mut self) -> Result<CastExpression, ParseError> {
        if self.check(TokenKind::LParen) && self.is_type_start(1) {
            let lparen = self.advance();
            let target = self.parse_type_specifier()?;
            let rparen = self.expect(TokenKind::RParen, "after cast type")?;
            let operand = self.parse_cast()?;
            return Ok(CastExpression::new(CastForm::Cast((
                lparen,
                Box::new(target),
                rparen,
                Box::new(operand),
            ))));
        }
        Ok(CastExpression::new(CastForm::Unary(self.parse_unary()?)))
    }

    fn parse_unary(&mut self) -> Result<UnaryExpression, ParseError> {
        let form = match self.peek_kind() {
            TokenKind::PlusPlus => {
                let op = self.advance();
                UnaryForm::PreIncrement((op, Box::new(self.parse_unary()?)))
            }
            TokenKind::MinusMinus => {
                let op = self.advance();
                UnaryForm::PreDecrement((op, Box::new(self.parse_unary()?)))
            }
            kind if kind.is_unary_operator() => {
                let op = UnaryOperator::new(self.advance());
                UnaryForm::Operator((op, Box::new(self.parse_cast()?)))
            }
            TokenKind::Sizeof => {
                let sizeof = self.advance();
                let operand = if self.check(TokenKind::LParen) && self.is_type_start(1) {
                    let lparen = self.advance();
                    let target = self.parse_type_specifier()?;
                    let rparen = self.expect(TokenKind::RParen, "after sizeof type")?;
                    SizeofOperand::Type((lparen, Box::new(target), rparen))
                } else {
                    SizeofOperand::Expression(Box::new(self.parse_unary()?))
                };
                UnaryForm::Sizeof((sizeof, operand))
            }
            _ => UnaryForm::Postfix(self.parse_postfix()?),
        };
        Ok(UnaryExpression::new(form))
    }

    fn parse_postfix(&mut self) -> Result<PostfixExpression, ParseError> {
        let primary = self.parse_primary()?;

        let mut suffixes = Vec::new();
        loop {
            let suffix = match self.peek_kind() {
                TokenKind::LBracket => {
                    let lbracket = self.advance();
                    let index = self.parse_expression()?;
                    let rbracket = self.expect(TokenKind::RBracket, "after index")?;
                    PostfixSuffix::Index((lbracket, index, rbracket))
                }
                TokenKind::LParen => {
                    let lparen = self.advance();
                    let arguments = if self.check(TokenKind::RParen) {
                        NodeOptional::empty()
                    } else {
                        NodeOptional::present(self.parse_argument_list()?)
                    };
                    let rparen = self.expect(TokenKind::RParen, "after arguments")?;
                    PostfixSuffix::Call((lparen, arguments, rparen))
                }
                TokenKind::Dot => {
                    let dot = self.advance();
                    PostfixSuffix::Member((dot, self.expect_identifier("after '.'")?))
                }
                TokenKind::Arrow => {
                    let arrow = self.advance();
                    PostfixSuffix::PointerMember((arrow, self.expect_identifier("after '->'")?))
                }
                TokenKind::PlusPlus => PostfixSuffix::Increment(self.advance()),
                TokenKind::MinusMinus => PostfixSuffix::Decrement(self.advance()),
                _ => break,
            };
            suffixes.push(suffix);
        }

        Ok(PostfixExpression::new(primary, suffixes.into()))
    }

    fn parse_primary(&mut self) -> Result<PrimaryExpression, ParseError> {
        let form = match self.peek_kind() {
            TokenKind::Identifier => PrimaryForm::Identifier(self.advance()),
            kind if kind.is_literal() => PrimaryForm::Constant(Constant::new(self.advance())),
            TokenKind::LParen => {
                let lparen = self.advance();
                let inner = self.parse_expression()?;
                let rparen = self.expect(TokenKind::RParen, "to close parenthesized expression")?;
                PrimaryForm::Parenthesized((lparen, Box::new(inner), rparen))
            }
            _ => return Err(self.error(format!("Expected expression, found {}", self.peek()))),
        };
        Ok(PrimaryExpression::new(form))
    }

    fn parse_argument_list(&mut self) -> Result<ArgumentExpressionList, ParseError> {
        let first = self.parse_argument()?;
        let mut rest = Vec::new();
        while let Some(comma) = self.match_kind(TokenKind::Comma) {
            rest.push((comma, self.parse_argument()?));
        }
        Ok(ArgumentExpressionList::new(first, rest.into()))
    }

    /// A call argument; built-in and tagged type names are accepted as types.
    fn parse_argument(&mut self) -> Result<AssignmentOrTypeExpression, ParseError> {
        let form = if is_type_keyword(self.peek_kind()) {
            ArgumentForm::Type(self.parse_no_identifier_type_specifier()?)
        } else {
            ArgumentForm::Expression(self.parse_assignment_expression()?)
        };
        Ok(AssignmentOrTypeExpression::new(form))
    }
}

/// The unary expression a conditional expression consists of, if it has no
/// operator at any level.
fn narrow_to_unary(conditional: ConditionalExpression) -> Option<UnaryExpression> {
    let or = sole_operand!(conditional);
    let and = sole_operand!(or);
    let inclusive_or = sole_operand!(and);
    let exclusive_or = sole_operand!(inclusive_or);
    let bit_and = sole_operand!(exclusive_or);
    let equality = sole_operand!(bit_and);
    let relational = sole_operand!(equality);
    let shift = sole_operand!(relational);
    let additive = sole_operand!(shift);
    let multiplicative = sole_operand!(additive);
    let cast = sole_operand!(multiplicative);
    match cast.into_parts() {
        (CastForm::Unary(unary),) => Some(unary),
        (CastForm::Cast(_),) => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::parse::Parser;

    fn parse(source: &str) -> Expression {
        Parser::new(source).unwrap().parse_expression().unwrap()
    }

    fn conditional(expr: &Expression) -> &ConditionalExpression {
        expr.first().form().as_conditional().unwrap()
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let expr = parse("a = b += 1");
        let (target, op, value) = expr.first().form().as_assign().unwrap();
        assert!(target.form().as_postfix().is_ok());
        assert_eq!(op.operator().text(), "=");

        let (_, inner_op, _) = value.form().as_assign().unwrap();
        assert_eq!(inner_op.operator().kind(), TokenKind::PlusEq);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = Parser::new("a + b = c").unwrap().parse_expression().unwrap_err();
        assert!(err.message.starts_with("Invalid assignment target"));
        assert_eq!(err.location.column, 1);
    }

    #[test]
    fn test_cast_and_sizeof_type() {
        let expr = parse("(unsigned char) sizeof(struct node *)");
        let cond = conditional(&expr);
        let cast = cond.condition().lhs().lhs().lhs().lhs().lhs().lhs().lhs().lhs().lhs().lhs();
        let (_, target, _, operand) = cast.form().as_cast().unwrap();
        assert!(target.base().as_signedness().is_ok());

        let unary = operand.form().as_unary().unwrap();
        let (_, size_of) = unary.form().as_sizeof().unwrap();
        let (_, ty, _) = size_of.as_type().unwrap();
        assert!(ty.pointer().is_present());
    }

    #[test]
    fn test_parenthesized_name_is_not_cast() {
        let expr = parse("(x) - 1");
        let cond = conditional(&expr);
        let additive = cond.condition().lhs().lhs().lhs().lhs().lhs().lhs().lhs().lhs();
        assert!(additive.rhs().is_present());
        assert!(additive.lhs().lhs().form().as_unary().is_ok());
    }

    #[test]
    fn test_postfix_chain() {
        let expr = parse("list->items[i].name(1, int)++");
        let cond = conditional(&expr);
        let cast = cond.condition().lhs().lhs().lhs().lhs().lhs().lhs().lhs().lhs().lhs().lhs();
        let postfix = cast.form().as_unary().unwrap().form().as_postfix().unwrap();
        let names: Vec<_> = postfix.suffixes().iter().map(|s| s.alternative()).collect();
        assert_eq!(names, vec!["PointerMember", "Index", "Member", "Call", "Increment"]);

        let (_, args, _) = postfix.suffixes().element_at(3).unwrap().as_call().unwrap();
        let args = args.value().unwrap();
        assert!(args.first().form().as_expression().is_ok());
        let (_, second) = args.rest().element_at(0).unwrap();
        assert!(second.form().as_type().is_ok());
    }

    #[test]
    fn test_ternary_nests_on_the_right() {
        let expr = parse("a ? b : c ? d : e");
        let (_, _, _, otherwise) = conditional(&expr).branches().value().unwrap();
        assert!(otherwise.branches().is_present());
    }

    #[test]
    fn test_comma_expression() {
        let expr = parse("i = 0, j = 1");
        assert_eq!(expr.rest().size(), 1);
        assert!(expr.first().form().as_assign().is_ok());
    }
}
