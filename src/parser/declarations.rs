//! Declaration parsing implementation
//!
//! This module handles external declarations and everything that names a
//! type:
//!
//! - Function definitions and prototypes
//! - Struct, union and enum specifiers
//! - `typedef` of aggregates and function pointers
//! - Variable declarations with initializers
//! - Type specifiers, pointers and array suffixes
//!
//! # Grammar
//!
//! ```text
//! external_declaration ::= storage* ( function | aggregate ";" | variable | typedef )
//! function             ::= type IDENT "(" [ parameters ] ")" ( ";" | block )
//! type                 ::= [ "const" ] base_type [ pointer ] [ array ]
//! pointer              ::= "*" [ "const" ] [ pointer ]
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use tracing::trace;

use crate::ast::*;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse one external declaration.
    pub(crate) fn parse_external_declaration(&mut self) -> Result<ExternalDeclaration, ParseError> {
        let mut storage = Vec::new();
        while let Some(keyword) = self.match_any(&[TokenKind::Static, TokenKind::Extern]) {
            storage.push(StorageClassSpecifier::new(keyword));
        }

        let item = self.parse_external_item()?;
        trace!(item = item.alternative(), "parsed external declaration");
        Ok(ExternalDeclaration::new(storage.into(), item))
    }

    fn parse_external_item(&mut self) -> Result<ExternalItem, ParseError> {
        if self.check(TokenKind::Typedef) {
            return Ok(ExternalItem::Typedef(self.parse_type_declaration()?));
        }

        // `struct S { ... };` versus `struct S value;` / `struct S f(...)`
        if matches!(self.peek_kind(), TokenKind::Struct | TokenKind::Union) {
            let saved_pos = self.position;
            if let Ok(aggregate) = self.parse_struct_or_union_specifier() {
                if let Some(semi) = self.match_kind(TokenKind::Semicolon) {
                    return Ok(ExternalItem::Aggregate((aggregate, semi)));
                }
            }
            self.position = saved_pos;
        }

        if matches!(self.peek_kind(), TokenKind::Auto | TokenKind::Register) {
            return Ok(ExternalItem::Variable(self.parse_variable_declaration()?));
        }

        let declared_type = self.parse_type_specifier()?;
        let name = self.expect_identifier("in declaration")?;

        if let Some(lparen) = self.match_kind(TokenKind::LParen) {
            let function = self.parse_function_rest(declared_type, name, lparen)?;
            return Ok(ExternalItem::Function(function));
        }

        let declarators = self.parse_init_declarator_list_from(name)?;
        let semicolon = self.expect_semicolon("after variable declaration")?;
        Ok(ExternalItem::Variable(VariableDeclaration::new(
            VariableClassSpecifier::new(NodeList::new().seal()),
            declared_type,
            declarators,
            semicolon,
        )))
    }

    /// Everything of a function after its opening parenthesis.
    fn parse_function_rest(
        &mut self,
        return_type: TypeSpecifier,
        name: Token,
        lparen: Token,
    ) -> Result<FunctionDeclaration, ParseError> {
        let parameters = self.parse_optional_parameter_list()?;
        let rparen = self.expect(TokenKind::RParen, "after parameters")?;

        let body = match self.match_kind(TokenKind::Semicolon) {
            Some(semi) => FunctionBody::Prototype(semi),
            None if self.check(TokenKind::LBrace) => {
                FunctionBody::Definition(self.parse_compound_statement()?)
            }
            None => {
                return Err(self.error(format!(
                    "Expected ';' or function body after '{}', found {}",
                    name.text(),
                    self.peek()
                )));
            }
        };

        Ok(FunctionDeclaration::new(
            return_type,
            name,
            lparen,
            parameters,
            rparen,
            body,
        ))
    }

    fn parse_optional_parameter_list(&mut self) -> Result<NodeOptional<ParameterList>, ParseError> {
        if self.check(TokenKind::RParen) {
            return Ok(NodeOptional::empty());
        }
        Ok(NodeOptional::present(self.parse_parameter_list()?))
    }

    pub(crate) fn parse_parameter_list(&mut self) -> Result<ParameterList, ParseError> {
        let first = self.parse_parameter_declaration()?;

        let mut rest = Vec::new();
        while self.check(TokenKind::Comma) && self.peek_kind_at(1) != TokenKind::Ellipsis {
            let comma = self.advance();
            rest.push((comma, self.parse_parameter_declaration()?));
        }

        let variadic = match self.match_kind(TokenKind::Comma) {
            Some(comma) => {
                let ellipsis = self.expect(TokenKind::Ellipsis, "after ','")?;
                NodeOptional::present((comma, ellipsis))
            }
            None => NodeOptional::empty(),
        };

        Ok(ParameterList::new(first, rest.into(), variadic))
    }

    fn parse_parameter_declaration(&mut self) -> Result<ParameterDeclaration, ParseError> {
        let param_type = self.parse_type_specifier()?;
        let name = self.expect_identifier("for parameter name")?;
        let array = self.parse_optional_array()?;
        Ok(ParameterDeclaration::new(param_type, name, array))
    }

    /// Parse `typedef ( DataType | FunctionType ) ;` and record the new name.
    pub(crate) fn parse_type_declaration(&mut self) -> Result<TypeDeclaration, ParseError> {
        let typedef_kw = self.expect(TokenKind::Typedef, "to start type declaration")?;

        let target = match self.try_parse_data_type() {
            Some(data) => TypedefTarget::Data(data),
            None => TypedefTarget::Function(self.parse_function_type()?),
        };

        let name = match &target {
            TypedefTarget::Data(data) => data.name().text().to_string(),
            TypedefTarget::Function(function) => function.name().text().to_string(),
        };
        let semicolon = self.expect_semicolon("after typedef")?;

        trace!(name = %name, "registered typedef name");
        self.typedefs.insert(name);
        Ok(TypeDeclaration::new(typedef_kw, target, semicolon))
    }

    /// `struct S name` when followed by `;`, restoring the position otherwise.
    fn try_parse_data_type(&mut self) -> Option<DataType> {
        if !matches!(self.peek_kind(), TokenKind::Struct | TokenKind::Union) {
            return None;
        }
        let saved_pos = self.position;
        let parsed = self.parse_struct_or_union_specifier().ok().and_then(|aggregate| {
            let name = self.match_kind(TokenKind::Identifier)?;
            self.check(TokenKind::Semicolon)
                .then(|| DataType::new(aggregate, name))
        });
        if parsed.is_none() {
            self.position = saved_pos;
        }
        parsed
    }

    fn parse_function_type(&mut self) -> Result<FunctionType, ParseError> {
        let return_type = self.parse_type_specifier()?;
        let lparen = self.expect(TokenKind::LParen, "in function pointer typedef")?;
        let star = self.expect(TokenKind::Star, "in function pointer typedef")?;
        let name = self.expect_identifier("for function pointer type name")?;
        let rparen = self.expect(TokenKind::RParen, "after function pointer type name")?;
        let params_lparen = self.expect(TokenKind::LParen, "before parameter types")?;
        let parameters = self.parse_optional_parameter_list()?;
        let params_rparen = self.expect(TokenKind::RParen, "after parameter types")?;

        Ok(FunctionType::new(
            return_type,
            lparen,
            star,
            name,
            rparen,
            params_lparen,
            parameters,
            params_rparen,
        ))
    }

    /// Parse `VariableClassSpecifier TypeSpecifier InitDeclaratorList ;`
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, ParseError> {
        let mut keywords = NodeList::new();
        while let Some(keyword) = self.match_any(&[TokenKind::Auto, TokenKind::Register]) {
            keywords
                .add(keyword)
                .map_err(|err| self.error(err.to_string()))?;
        }
        let class = VariableClassSpecifier::new(keywords.seal());

        let var_type = self.parse_type_specifier()?;
        let name = self.expect_identifier("in variable declaration")?;
        let declarators = self.parse_init_declarator_list_from(name)?;
        let semicolon = self.expect_semicolon("after variable declaration")?;

        Ok(VariableDeclaration::new(class, var_type, declarators, semicolon))
    }

    pub(crate) fn parse_local_variable_declaration(
        &mut self,
    ) -> Result<LocalVariableDeclaration, ParseError> {
        let static_kw = self.optional(TokenKind::Static);
        let declaration = self.parse_variable_declaration()?;
        Ok(LocalVariableDeclaration::new(static_kw, declaration))
    }

    /// Declarator list whose first name has already been consumed.
    fn parse_init_declarator_list_from(&mut self, name: Token) -> Result<InitDeclaratorList, ParseError> {
        let first = self.parse_init_declarator_rest(name)?;

        let mut rest = Vec::new();
        while let Some(comma) = self.match_kind(TokenKind::Comma) {
            let name = self.expect_identifier("after ',' in declaration")?;
            rest.push((comma, self.parse_init_declarator_rest(name)?));
        }

        Ok(InitDeclaratorList::new(first, rest.into()))
    }

    fn parse_init_declarator_rest(&mut self, name: Token) -> Result<InitDeclarator, ParseError> {
        let array = self.parse_optional_array()?;
        let initializer = match self.match_kind(TokenKind::Eq) {
            Some(eq) => NodeOptional::present((eq, self.parse_initializer()?)),
            None => NodeOptional::empty(),
        };
        Ok(InitDeclarator::new(name, array, initializer))
    }

    pub(crate) fn parse_initializer(&mut self) -> Result<Initializer, ParseError> {
        let form = match self.match_kind(TokenKind::LBrace) {
            Some(lbrace) => {
                let list = self.parse_initializer_list()?;
                let trailing_comma = self.optional(TokenKind::Comma);
                let rbrace = self.expect(TokenKind::RBrace, "to close initializer list")?;
                InitializerForm::Braced((lbrace, Box::new(list), trailing_comma, rbrace))
            }
            None => InitializerForm::Expression(self.parse_assignment_expression()?),
        };
        Ok(Initializer::new(form))
    }

    fn parse_initializer_list(&mut self) -> Result<InitializerList, ParseError> {
        let first = self.parse_initializer()?;

        let mut rest = Vec::new();
        while self.check(TokenKind::Comma) && self.peek_kind_at(1) != TokenKind::RBrace {
            let comma = self.advance();
            rest.push((comma, self.parse_initializer()?));
        }

        Ok(InitializerList::new(first, rest.into()))
    }

    // ===== Types =====

    pub(crate) fn parse_type_specifier(&mut self) -> Result<TypeSpecifier, ParseError> {
        let const_kw = self.optional(TokenKind::Const);
        let base = self.parse_base_type()?;
        let pointer = self.parse_optional_pointer();
        let array = self.parse_optional_array()?;
        Ok(TypeSpecifier::new(const_kw, base, pointer, array))
    }

    /// Same as [`Parser::parse_type_specifier`], rejecting typedef names.
    pub(crate) fn parse_no_identifier_type_specifier(
        &mut self,
    ) -> Result<NoIdentifierTypeSpecifier, ParseError> {
        let const_kw = self.optional(TokenKind::Const);
        if self.check(TokenKind::Identifier) {
            return Err(self.error(format!(
                "Expected built-in or tagged type, found {}",
                self.peek()
            )));
        }
        let base = match self.parse_base_type()? {
            BaseType::Void(t) => NoIdentifierBaseType::Void(t),
            BaseType::Char(t) => NoIdentifierBaseType::Char(t),
            BaseType::Short(t) => NoIdentifierBaseType::Short(t),
            BaseType::Int(t) => NoIdentifierBaseType::Int(t),
            BaseType::Long(t) => NoIdentifierBaseType::Long(t),
            BaseType::Float(t) => NoIdentifierBaseType::Float(t),
            BaseType::Double(t) => NoIdentifierBaseType::Double(t),
            BaseType::Signedness(t) => NoIdentifierBaseType::Signedness(t),
            BaseType::Aggregate(t) => NoIdentifierBaseType::Aggregate(t),
            BaseType::Enum(t) => NoIdentifierBaseType::Enum(t),
            BaseType::Named(t) => {
                return Err(ParseError {
                    message: format!("Unexpected type name '{}'", t.text()),
                    location: t.location(),
                });
            }
        };
        let pointer = self.parse_optional_pointer();
        let array = self.parse_optional_array()?;
        Ok(NoIdentifierTypeSpecifier::new(const_kw, base, pointer, array))
    }

    fn parse_base_type(&mut self) -> Result<BaseType, ParseError> {
        let base = match self.peek_kind() {
            TokenKind::Void => BaseType::Void(self.advance()),
            TokenKind::Char => BaseType::Char(self.advance()),
            TokenKind::Short => {
                let short = self.advance();
                BaseType::Short((short, self.optional(TokenKind::Int)))
            }
            TokenKind::Int => BaseType::Int(self.advance()),
            TokenKind::Long => {
                let long = self.advance();
                BaseType::Long((long, self.match_any(&[TokenKind::Int, TokenKind::Long]).into()))
            }
            TokenKind::Float => BaseType::Float(self.advance()),
            TokenKind::Double => BaseType::Double(self.advance()),
            TokenKind::Signed | TokenKind::Unsigned => {
                let sign = self.advance();
                BaseType::Signedness((sign, self.parse_optional_integer_type()))
            }
            TokenKind::Struct | TokenKind::Union => {
                BaseType::Aggregate(self.parse_struct_or_union_specifier()?)
            }
            TokenKind::Enum => BaseType::Enum(self.parse_enum_specifier()?),
            TokenKind::Identifier => BaseType::Named(self.advance()),
            _ => {
                return Err(self.error(format!("Expected type specifier, found {}", self.peek())));
            }
        };
        Ok(base)
    }

    fn parse_optional_integer_type(&mut self) -> NodeOptional<IntegerType> {
        let width = match self.peek_kind() {
            TokenKind::Char => IntegerType::Char(self.advance()),
            TokenKind::Short => {
                let short = self.advance();
                IntegerType::Short((short, self.optional(TokenKind::Int)))
            }
            TokenKind::Int => IntegerType::Int(self.advance()),
            TokenKind::Long => {
                let long = self.advance();
                IntegerType::Long((long, self.match_any(&[TokenKind::Int, TokenKind::Long]).into()))
            }
            _ => return NodeOptional::empty(),
        };
        NodeOptional::present(width)
    }

    fn parse_optional_pointer(&mut self) -> NodeOptional<Pointer> {
        self.match_kind(TokenKind::Star)
            .map(|star| self.parse_pointer_rest(star))
            .into()
    }

    fn parse_pointer_rest(&mut self, star: Token) -> Pointer {
        let const_kw = self.optional(TokenKind::Const);
        let next = self
            .match_kind(TokenKind::Star)
            .map(|star| Box::new(self.parse_pointer_rest(star)));
        Pointer::new(star, const_kw, next.into())
    }

    pub(crate) fn parse_optional_array(&mut self) -> Result<NodeOptional<Array>, ParseError> {
        let Some(lbracket) = self.match_kind(TokenKind::LBracket) else {
            return Ok(NodeOptional::empty());
        };
        let size = if self.check(TokenKind::RBracket) {
            NodeOptional::empty()
        } else {
            NodeOptional::present(self.parse_constant_expression()?)
        };
        let rbracket = self.expect(TokenKind::RBracket, "to close array size")?;
        Ok(NodeOptional::present(Array::new(lbracket, size, rbracket)))
    }

    // ===== Aggregates =====

    pub(crate) fn parse_struct_or_union_specifier(
        &mut self,
    ) -> Result<StructOrUnionSpecifier, ParseError> {
        let keyword = match self.match_any(&[TokenKind::Struct, TokenKind::Union]) {
            Some(keyword) => StructOrUnion::new(keyword),
            None => return Err(self.error(format!("Expected 'struct' or 'union', found {}", self.peek()))),
        };
        let tag = self.match_kind(TokenKind::Identifier);

        let form = match (self.match_kind(TokenKind::LBrace), tag) {
            (Some(lbrace), tag) => {
                let members = self.parse_struct_declaration_list()?;
                let rbrace = self.expect(TokenKind::RBrace, "to close struct body")?;
                AggregateForm::Definition((keyword, tag.into(), lbrace, members, rbrace))
            }
            (None, Some(tag)) => AggregateForm::Reference((keyword, tag)),
            (None, None) => {
                return Err(self.error(format!(
                    "Expected tag or '{{' after '{}', found {}",
                    keyword.keyword().text(),
                    self.peek()
                )));
            }
        };
        Ok(StructOrUnionSpecifier::new(form))
    }

    fn parse_struct_declaration_list(&mut self) -> Result<StructDeclarationList, ParseError> {
        let first = self.parse_struct_declaration()?;
        let mut rest = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            rest.push(self.parse_struct_declaration()?);
        }
        Ok(StructDeclarationList::new(NonEmptyList::new(first, rest)))
    }

    fn parse_struct_declaration(&mut self) -> Result<StructDeclaration, ParseError> {
        let member_type = self.parse_type_specifier()?;
        let name = self.expect_identifier("for struct member")?;

        let suffix = match self.peek_kind() {
            TokenKind::LBracket => match self.parse_optional_array()?.into_option() {
                Some(array) => NodeOptional::present(MemberSuffix::Array(array)),
                None => NodeOptional::empty(),
            },
            TokenKind::Colon => {
                let colon = self.advance();
                let width = self.parse_constant_expression()?;
                NodeOptional::present(MemberSuffix::BitField((colon, width)))
            }
            _ => NodeOptional::empty(),
        };
        let trailing_name = self.optional(TokenKind::Identifier);
        let semicolon = self.expect_semicolon("after struct member")?;

        Ok(StructDeclaration::new(
            member_type,
            name,
            suffix,
            trailing_name,
            semicolon,
        ))
    }

    pub(crate) fn parse_enum_specifier(&mut self) -> Result<EnumSpecifier, ParseError> {
        let enum_kw = self.expect(TokenKind::Enum, "to start enum specifier")?;

        let has_body = self.check(TokenKind::LBrace)
            || (self.check(TokenKind::Identifier) && self.peek_kind_at(1) == TokenKind::LBrace);
        let body = if has_body {
            let tag = self.optional(TokenKind::Identifier);
            let lbrace = self.expect(TokenKind::LBrace, "to open enum body")?;
            let enumerators = self.parse_enumerator_list()?;
            let rbrace = self.expect(TokenKind::RBrace, "to close enum body")?;
            EnumBody::Definition((tag, lbrace, enumerators, rbrace))
        } else {
            EnumBody::Reference(self.expect_identifier("after 'enum'")?)
        };

        Ok(EnumSpecifier::new(enum_kw, body))
    }

    fn parse_enumerator_list(&mut self) -> Result<EnumeratorList, ParseError> {
        let first = self.parse_enumerator()?;
        let mut rest = Vec::new();
        while let Some(comma) = self.match_kind(TokenKind::Comma) {
            rest.push((comma, self.parse_enumerator()?));
        }
        Ok(EnumeratorList::new(first, rest.into()))
    }

    fn parse_enumerator(&mut self) -> Result<Enumerator, ParseError> {
        let name = self.expect_identifier("for enumerator")?;
        let value = match self.match_kind(TokenKind::Eq) {
            Some(eq) => NodeOptional::present((eq, self.parse_constant_expression()?)),
            None => NodeOptional::empty(),
        };
        Ok(Enumerator::new(name, value))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::parse::Parser;

    fn parse_type(source: &str) -> TypeSpecifier {
        Parser::new(source).unwrap().parse_type_specifier().unwrap()
    }

    #[test]
    fn test_multi_word_base_types() {
        let ty = parse_type("unsigned long int");
        let (sign, width) = ty.base().as_signedness().unwrap();
        assert_eq!(sign.text(), "unsigned");
        let (long, int) = width.value().unwrap().as_long().unwrap();
        assert_eq!(long.text(), "long");
        assert_eq!(int.value().unwrap().text(), "int");

        let ty = parse_type("short");
        let (_, int) = ty.base().as_short().unwrap();
        assert!(!int.is_present());
    }

    #[test]
    fn test_pointer_chain() {
        let ty = parse_type("const char * const *");
        assert!(ty.const_kw().is_present());
        let outer = ty.pointer().value().unwrap();
        assert!(outer.const_kw().is_present());
        let inner = outer.next().value().unwrap();
        assert!(!inner.const_kw().is_present());
        assert!(!inner.next().is_present());
    }

    #[test]
    fn test_parameters_and_variadic() {
        let mut parser = Parser::new("int printf(const char *fmt, ...);").unwrap();
        let unit = parser.parse_translation_unit().unwrap();
        let decl = unit.declarations().element_at(0).unwrap();
        let function = decl.item().as_function().unwrap();
        let params = function.parameters().value().unwrap();

        assert_eq!(params.first().name().text(), "fmt");
        assert!(params.rest().is_empty());
        assert!(params.variadic().is_present());
    }

    #[test]
    fn test_variable_declarators() {
        let mut parser = Parser::new("int a, b[4] = {1, 2,}, c = 3;").unwrap();
        let unit = parser.parse_translation_unit().unwrap();
        let decl = unit.declarations().element_at(0).unwrap();
        let variable = decl.item().as_variable().unwrap();
        let declarators = variable.declarators();

        assert_eq!(declarators.first().name().text(), "a");
        assert_eq!(declarators.rest().size(), 2);

        let (_, b) = declarators.rest().element_at(0).unwrap();
        assert!(b.array().is_present());
        let (_, init) = b.initializer().value().unwrap();
        let (_, list, trailing, _) = init.form().as_braced().unwrap();
        assert_eq!(list.rest().size(), 1);
        assert!(trailing.is_present());
    }

    #[test]
    fn test_struct_members() {
        let mut parser =
            Parser::new("struct flags { unsigned int ready : 1; char name[8]; };").unwrap();
        let unit = parser.parse_translation_unit().unwrap();
        let decl = unit.declarations().element_at(0).unwrap();
        let (spec, _) = decl.item().as_aggregate().unwrap();
        let (_, _, _, list, _) = spec.form().as_definition().unwrap();

        let ready = list.members().element_at(0).unwrap();
        assert!(ready.suffix().value().unwrap().as_bit_field().is_ok());
        let name = list.members().element_at(1).unwrap();
        assert!(name.suffix().value().unwrap().as_array().is_ok());
    }

    #[test]
    fn test_enum_and_struct_variables() {
        let source = "enum color { RED, GREEN = 2 } paint; struct point origin;";
        let mut parser = Parser::new(source).unwrap();
        let unit = parser.parse_translation_unit().unwrap();
        assert_eq!(unit.declarations().size(), 2);

        let paint = unit.declarations().element_at(0).unwrap();
        let variable = paint.item().as_variable().unwrap();
        let spec = variable.var_type().base().as_enum().unwrap();
        let (tag, _, enumerators, _) = spec.body().as_definition().unwrap();
        assert_eq!(tag.value().unwrap().text(), "color");
        let (_, green) = enumerators.rest().element_at(0).unwrap();
        assert!(green.value().is_present());

        let origin = unit.declarations().element_at(1).unwrap();
        assert!(origin.item().as_variable().is_ok());
    }

    #[test]
    fn test_function_pointer_typedef() {
        let source = "typedef int (*compare_fn)(int a, int b);";
        let mut parser = Parser::new(source).unwrap();
        let unit = parser.parse_translation_unit().unwrap();

        let decl = unit.declarations().element_at(0).unwrap();
        let typedef = decl.item().as_typedef().unwrap();
        let function = typedef.target().as_function().unwrap();
        assert_eq!(function.name().text(), "compare_fn");
        assert_eq!(function.parameters().value().unwrap().rest().size(), 1);
        assert!(parser.typedef_names().any(|n| n == "compare_fn"));
    }
}
