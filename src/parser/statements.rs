//! Statement parsing implementation
//!
//! This module handles parsing of all C statement types:
//!
//! - Blocks: `{ ... }`, mixing local declarations and statements
//! - Labels: `name:`, `case expr:`, `default:`
//! - Control flow: `if`, `switch`, `while`, `do-while`, `for`
//! - Jump statements: `goto`, `continue`, `break`, `return`
//! - Expression statements, including the empty statement `;`
//!
//! # Grammar
//!
//! ```text
//! statement ::= labeled | expr_stmt | block | selection | iteration | jump
//! block     ::= "{" ( local_declaration | statement )* "}"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::ast::*;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a statement
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let form = match self.peek_kind() {
            TokenKind::Identifier if self.peek_kind_at(1) == TokenKind::Colon => {
                StatementForm::Labeled(self.parse_labeled_statement()?)
            }
            TokenKind::Case | TokenKind::Default => {
                StatementForm::Labeled(self.parse_labeled_statement()?)
            }
            TokenKind::LBrace => StatementForm::Compound(self.parse_compound_statement()?),
            TokenKind::If | TokenKind::Switch => {
                StatementForm::Selection(self.parse_selection_statement()?)
            }
            TokenKind::While | TokenKind::Do | TokenKind::For => {
                StatementForm::Iteration(self.parse_iteration_statement()?)
            }
            TokenKind::Goto | TokenKind::Continue | TokenKind::Break | TokenKind::Return => {
                StatementForm::Jump(self.parse_jump_statement()?)
            }
            _ => StatementForm::Expression(self.parse_expression_statement()?),
        };
        Ok(Statement::new(form))
    }

    fn parse_boxed_statement(&mut self) -> Result<Box<Statement>, ParseError> {
        Ok(Box::new(self.parse_statement()?))
    }

    /// Parse `{ ( LocalVariableDeclaration | Statement )* }`
    pub(crate) fn parse_compound_statement(&mut self) -> Result<CompoundStatement, ParseError> {
        let lbrace = self.expect(TokenKind::LBrace, "to open block")?;

        let mut items = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let item = if self.is_declaration_start() {
                BlockItem::Declaration(self.parse_local_variable_declaration()?)
            } else {
                BlockItem::Statement(self.parse_statement()?)
            };
            items.push(item);
        }

        let rbrace = self.expect(TokenKind::RBrace, "to close block")?;
        Ok(CompoundStatement::new(lbrace, items.into(), rbrace))
    }

    fn parse_labeled_statement(&mut self) -> Result<LabeledStatement, ParseError> {
        let form = match self.peek_kind() {
            TokenKind::Case => {
                let case = self.advance();
                let value = self.parse_constant_expression()?;
                let colon = self.expect(TokenKind::Colon, "after case value")?;
                LabeledForm::Case((case, value, colon, self.parse_boxed_statement()?))
            }
            TokenKind::Default => {
                let default = self.advance();
                let colon = self.expect(TokenKind::Colon, "after 'default'")?;
                LabeledForm::Default((default, colon, self.parse_boxed_statement()?))
            }
            _ => {
                let label = self.expect_identifier("for label")?;
                let colon = self.expect(TokenKind::Colon, "after label")?;
                LabeledForm::Label((label, colon, self.parse_boxed_statement()?))
            }
        };
        Ok(LabeledStatement::new(form))
    }

    fn parse_expression_statement(&mut self) -> Result<ExpressionStatement, ParseError> {
        let expression = if self.check(TokenKind::Semicolon) {
            NodeOptional::empty()
        } else {
            NodeOptional::present(self.parse_expression()?)
        };
        let semicolon = self.expect_semicolon("after expression")?;
        Ok(ExpressionStatement::new(expression, semicolon))
    }

    /// `( cond )` with both parentheses.
    fn parse_condition(&mut self, keyword: &str) -> Result<(Token, Expression, Token), ParseError> {
        let lparen = self.expect(TokenKind::LParen, &format!("after '{keyword}'"))?;
        let condition = self.parse_expression()?;
        let rparen = self.expect(TokenKind::RParen, &format!("after {keyword} condition"))?;
        Ok((lparen, condition, rparen))
    }

    fn parse_selection_statement(&mut self) -> Result<SelectionStatement, ParseError> {
        let form = if let Some(if_kw) = self.match_kind(TokenKind::If) {
            let (lparen, condition, rparen) = self.parse_condition("if")?;
            let then = self.parse_boxed_statement()?;
            // `else` binds to the nearest `if`.
            let otherwise = match self.match_kind(TokenKind::Else) {
                Some(else_kw) => NodeOptional::present((else_kw, self.parse_boxed_statement()?)),
                None => NodeOptional::empty(),
            };
            SelectionForm::If((if_kw, lparen, condition, rparen, then, otherwise))
        } else {
            let switch = self.expect(TokenKind::Switch, "to start selection")?;
            let (lparen, condition, rparen) = self.parse_condition("switch")?;
            let body = self.parse_boxed_statement()?;
            SelectionForm::Switch((switch, lparen, condition, rparen, body))
        };
        Ok(SelectionStatement::new(form))
    }

    fn parse_iteration_statement(&mut self) -> Result<IterationStatement, ParseError> {
        let form = match self.peek_kind() {
            TokenKind::While => {
                let while_kw = self.advance();
                let (lparen, condition, rparen) = self.parse_condition("while")?;
                let body = self.parse_boxed_statement()?;
                IterationForm::While((while_kw, lparen, condition, rparen, body))
            }
            TokenKind::Do => {
                let do_kw = self.advance();
                let body = self.parse_boxed_statement()?;
                let while_kw = self.expect(TokenKind::While, "after do-while body")?;
                let (lparen, condition, rparen) = self.parse_condition("while")?;
                let semicolon = self.expect_semicolon("after do-while")?;
                IterationForm::DoWhile((do_kw, body, while_kw, lparen, condition, rparen, semicolon))
            }
            _ => {
                let for_kw = self.expect(TokenKind::For, "to start loop")?;
                let lparen = self.expect(TokenKind::LParen, "after 'for'")?;
                let init = self.parse_optional_expression(TokenKind::Semicolon)?;
                let first_semi = self.expect_semicolon("after for initializer")?;
                let condition = self.parse_optional_expression(TokenKind::Semicolon)?;
                let second_semi = self.expect_semicolon("after for condition")?;
                let step = self.parse_optional_expression(TokenKind::RParen)?;
                let rparen = self.expect(TokenKind::RParen, "after for clauses")?;
                let body = self.parse_boxed_statement()?;
                IterationForm::For((
                    for_kw,
                    lparen,
                    init,
                    first_semi,
                    condition,
                    second_semi,
                    step,
                    rparen,
                    body,
                ))
            }
        };
        Ok(IterationStatement::new(form))
    }

    /// An expression, unless the next token is `terminator`.
    fn parse_optional_expression(
        &mut self,
        terminator: TokenKind,
    ) -> Result<NodeOptional<Expression>, ParseError> {
        if self.check(terminator) {
            return Ok(NodeOptional::empty());
        }
        Ok(NodeOptional::present(self.parse_expression()?))
    }

    fn parse_jump_statement(&mut self) -> Result<JumpStatement, ParseError> {
        let keyword = self.advance();
        let form = match keyword.kind() {
            TokenKind::Goto => {
                let label = self.expect_identifier("after 'goto'")?;
                let semicolon = self.expect_semicolon("after goto label")?;
                JumpForm::Goto((keyword, label, semicolon))
            }
            TokenKind::Continue => {
                let semicolon = self.expect_semicolon("after 'continue'")?;
                JumpForm::Continue((keyword, semicolon))
            }
            TokenKind::Break => {
                let semicolon = self.expect_semicolon("after 'break'")?;
                JumpForm::Break((keyword, semicolon))
            }
            TokenKind::Return => {
                let value = self.parse_optional_expression(TokenKind::Semicolon)?;
                let semicolon = self.expect_semicolon("after return value")?;
                JumpForm::Return((keyword, value, semicolon))
            }
            _ => {
                return Err(ParseError {
                    message: format!("Expected jump statement, found {}", keyword),
                    location: keyword.location(),
                });
            }
        };
        Ok(JumpStatement::new(form))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::parse::Parser;

    fn parse_statement(source: &str) -> Statement {
        Parser::new(source).unwrap().parse_statement().unwrap()
    }

    #[test]
    fn test_dangling_else_binds_inner() {
        let stmt = parse_statement("if (a) if (b) x = 1; else x = 2;");
        let outer = stmt.form().as_selection().unwrap();
        let (_, _, _, _, then, otherwise) = outer.form().as_if().unwrap();
        assert!(!otherwise.is_present());

        let inner = then.form().as_selection().unwrap();
        let (_, _, _, _, _, inner_else) = inner.form().as_if().unwrap();
        assert!(inner_else.is_present());
    }

    #[test]
    fn test_for_with_empty_clauses() {
        let stmt = parse_statement("for (;;) break;");
        let iteration = stmt.form().as_iteration().unwrap();
        let (_, _, init, _, condition, _, step, _, body) = iteration.form().as_for().unwrap();
        assert!(!init.is_present());
        assert!(!condition.is_present());
        assert!(!step.is_present());
        assert!(body.form().as_jump().unwrap().form().as_break().is_ok());
    }

    #[test]
    fn test_do_while() {
        let stmt = parse_statement("do { i++; } while (i < 10);");
        let iteration = stmt.form().as_iteration().unwrap();
        let (_, body, _, _, _, _, semi) = iteration.form().as_do_while().unwrap();
        assert!(body.form().as_compound().is_ok());
        assert_eq!(semi.text(), ";");
    }

    #[test]
    fn test_switch_labels() {
        let stmt = parse_statement("switch (c) { case 1: done: break; default: ; }");
        let selection = stmt.form().as_selection().unwrap();
        let (_, _, _, _, body) = selection.form().as_switch().unwrap();
        let block = body.form().as_compound().unwrap();
        assert_eq!(block.items().size(), 2);

        let case = block.items().element_at(0).unwrap().as_statement().unwrap();
        let labeled = case.form().as_labeled().unwrap();
        let (_, _, _, inner) = labeled.form().as_case().unwrap();
        assert!(inner.form().as_labeled().unwrap().form().as_label().is_ok());

        let default = block.items().element_at(1).unwrap().as_statement().unwrap();
        let labeled = default.form().as_labeled().unwrap();
        let (_, _, empty) = labeled.form().as_default().unwrap();
        let empty = empty.form().as_expression().unwrap();
        assert!(!empty.expression().is_present());
    }

    #[test]
    fn test_block_mixes_declarations() {
        let stmt = parse_statement("{ static int n = 0; size_t len; FILE *fp; n++; goto out; }");
        let block = stmt.form().as_compound().unwrap();
        let kinds: Vec<_> = block.items().iter().map(|item| item.alternative()).collect();
        assert_eq!(
            kinds,
            vec!["Declaration", "Declaration", "Declaration", "Statement", "Statement"]
        );
    }

    #[test]
    fn test_missing_semicolon() {
        let err = Parser::new("return 1 }").unwrap().parse_statement().unwrap_err();
        assert_eq!(err.message, "Expected ';' after return value, found '}'");
    }
}
