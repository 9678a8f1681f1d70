//! The grammar, written down once.
//!
//! Every production of the supported C subset is listed here as a node name,
//! its visit method, and its ordered, typed fields. The list is handed to a
//! callback macro, so node structs, [`NodeKind`](super::nodes::NodeKind),
//! [`NodeRef`](super::nodes::NodeRef), [`AnyNode`](super::nodes::AnyNode),
//! the [`Visitor`](super::visitor::Visitor) trait and the depth-first walker
//! are all generated from the same source and cannot drift apart.
//!
//! Field order is the grammar's left-to-right order; traversal follows it.
//! Alternations are named choice enums (see [`super::nodes`]), repetition is
//! [`NodeList`](super::containers::NodeList), or
//! [`NonEmptyList`](super::containers::NonEmptyList) for `+`, optional parts
//! are [`NodeOptional`](super::containers::NodeOptional), and parts that are
//! glued together inside a repetition or option are tuples.
//!
//! A field holding tokens may be followed by the token kinds it admits, as in
//! `keyword: Token [Static, Extern]`. Constructors check them.

/// Invokes `$callback!` with the full production list.
macro_rules! c_grammar {
    ($callback:ident) => {
        $callback! {
            /// `( ExternalDeclaration )+`
            TranslationUnit => visit_translation_unit {
                declarations: NonEmptyList<ExternalDeclaration>,
            }

            /// `( StorageClassSpecifier )* ( FunctionDeclaration | StructOrUnionSpecifier ";" | VariableDeclaration | TypeDeclaration )`
            ExternalDeclaration => visit_external_declaration {
                storage: NodeList<StorageClassSpecifier>,
                item: ExternalItem,
            }

            /// `TypeSpecifier <IDENTIFIER> "(" [ ParameterList ] ")" ( ";" | CompoundStatement )`
            FunctionDeclaration => visit_function_declaration {
                return_type: TypeSpecifier,
                name: Token [Identifier],
                lparen: Token [LParen],
                parameters: NodeOptional<ParameterList>,
                rparen: Token [RParen],
                body: FunctionBody,
            }

            /// `( <STATIC> | <EXTERN> )`
            StorageClassSpecifier => visit_storage_class_specifier {
                keyword: Token [Static, Extern],
            }

            /// `<TYPEDEF> ( DataType | FunctionType ) ";"`
            TypeDeclaration => visit_type_declaration {
                typedef_kw: Token [Typedef],
                target: TypedefTarget,
                semicolon: Token [Semicolon],
            }

            /// `StructOrUnionSpecifier <IDENTIFIER>`
            DataType => visit_data_type {
                aggregate: StructOrUnionSpecifier,
                name: Token [Identifier],
            }

            /// `TypeSpecifier "(" "*" <IDENTIFIER> ")" "(" [ ParameterList ] ")"`
            FunctionType => visit_function_type {
                return_type: TypeSpecifier,
                lparen: Token [LParen],
                star: Token [Star],
                name: Token [Identifier],
                rparen: Token [RParen],
                params_lparen: Token [LParen],
                parameters: NodeOptional<ParameterList>,
                params_rparen: Token [RParen],
            }

            /// `ParameterDeclaration ( "," ParameterDeclaration )* [ "," "..." ]`
            ParameterList => visit_parameter_list {
                first: ParameterDeclaration,
                rest: NodeList<(Token, ParameterDeclaration)> [Comma],
                variadic: NodeOptional<(Token, Token)> [Comma],
            }

            /// `TypeSpecifier <IDENTIFIER> [ Array ]`
            ParameterDeclaration => visit_parameter_declaration {
                param_type: TypeSpecifier,
                name: Token [Identifier],
                array: NodeOptional<Array>,
            }

            /// `VariableClassSpecifier TypeSpecifier InitDeclaratorList ";"`
            VariableDeclaration => visit_variable_declaration {
                class: VariableClassSpecifier,
                var_type: TypeSpecifier,
                declarators: InitDeclaratorList,
                semicolon: Token [Semicolon],
            }

            /// `[ <STATIC> ] VariableDeclaration`
            LocalVariableDeclaration => visit_local_variable_declaration {
                static_kw: NodeOptional<Token> [Static],
                declaration: VariableDeclaration,
            }

            /// `( <AUTO> | <REGISTER> )*`
            VariableClassSpecifier => visit_variable_class_specifier {
                keywords: NodeList<Token> [Auto, Register],
            }

            /// `[ <CONST> ] BaseType [ Pointer ] [ Array ]`
            TypeSpecifier => visit_type_specifier {
                const_kw: NodeOptional<Token> [Const],
                base: BaseType,
                pointer: NodeOptional<Pointer>,
                array: NodeOptional<Array>,
            }

            /// `[ <CONST> ] NoIdentifierBaseType [ Pointer ] [ Array ]`
            NoIdentifierTypeSpecifier => visit_no_identifier_type_specifier {
                const_kw: NodeOptional<Token> [Const],
                base: NoIdentifierBaseType,
                pointer: NodeOptional<Pointer>,
                array: NodeOptional<Array>,
            }

            /// `StructOrUnion [ <IDENTIFIER> ] "{" StructDeclarationList "}" | StructOrUnion <IDENTIFIER>`
            StructOrUnionSpecifier => visit_struct_or_union_specifier {
                form: AggregateForm,
            }

            /// `( <STRUCT> | <UNION> )`
            StructOrUnion => visit_struct_or_union {
                keyword: Token [Struct, Union],
            }

            /// `( StructDeclaration )+`
            StructDeclarationList => visit_struct_declaration_list {
                members: NonEmptyList<StructDeclaration>,
            }

            /// `InitDeclarator ( "," InitDeclarator )*`
            InitDeclaratorList => visit_init_declarator_list {
                first: InitDeclarator,
                rest: NodeList<(Token, InitDeclarator)> [Comma],
            }

            /// `<IDENTIFIER> [ Array ] [ "=" Initializer ]`
            InitDeclarator => visit_init_declarator {
                name: Token [Identifier],
                array: NodeOptional<Array>,
                initializer: NodeOptional<(Token, Initializer)> [Eq],
            }

            /// `TypeSpecifier <IDENTIFIER> [ Array | ":" ConstantExpression ] [ <IDENTIFIER> ] ";"`
            StructDeclaration => visit_struct_declaration {
                member_type: TypeSpecifier,
                name: Token [Identifier],
                suffix: NodeOptional<MemberSuffix>,
                trailing_name: NodeOptional<Token> [Identifier],
                semicolon: Token [Semicolon],
            }

            /// `<ENUM> ( [ <IDENTIFIER> ] "{" EnumeratorList "}" | <IDENTIFIER> )`
            EnumSpecifier => visit_enum_specifier {
                enum_kw: Token [Enum],
                body: EnumBody,
            }

            /// `Enumerator ( "," Enumerator )*`
            EnumeratorList => visit_enumerator_list {
                first: Enumerator,
                rest: NodeList<(Token, Enumerator)> [Comma],
            }

            /// `<IDENTIFIER> [ "=" ConstantExpression ]`
            Enumerator => visit_enumerator {
                name: Token [Identifier],
                value: NodeOptional<(Token, ConstantExpression)> [Eq],
            }

            /// `"*" [ <CONST> ] [ Pointer ]`
            Pointer => visit_pointer {
                star: Token [Star],
                const_kw: NodeOptional<Token> [Const],
                next: NodeOptional<Box<Pointer>>,
            }

            /// `<IDENTIFIER> ( "," <IDENTIFIER> )*`
            IdentifierList => visit_identifier_list {
                first: Token [Identifier],
                rest: NodeList<(Token, Token)> [Comma],
            }

            /// `( AssignmentExpression | "{" InitializerList [ "," ] "}" )`
            Initializer => visit_initializer {
                form: InitializerForm,
            }

            /// `Initializer ( "," Initializer )*`
            InitializerList => visit_initializer_list {
                first: Initializer,
                rest: NodeList<(Token, Initializer)> [Comma],
            }

            /// `"[" [ ConstantExpression ] "]"`
            Array => visit_array {
                lbracket: Token [LBracket],
                size: NodeOptional<ConstantExpression>,
                rbracket: Token [RBracket],
            }

            /// `( LabeledStatement | ExpressionStatement | CompoundStatement | SelectionStatement | IterationStatement | JumpStatement )`
            Statement => visit_statement {
                form: StatementForm,
            }

            /// `( <IDENTIFIER> ":" Statement | <CASE> ConstantExpression ":" Statement | <DFLT> ":" Statement )`
            LabeledStatement => visit_labeled_statement {
                form: LabeledForm,
            }

            /// `[ Expression ] ";"`
            ExpressionStatement => visit_expression_statement {
                expression: NodeOptional<Expression>,
                semicolon: Token [Semicolon],
            }

            /// `"{" ( LocalVariableDeclaration | Statement )* "}"`
            CompoundStatement => visit_compound_statement {
                lbrace: Token [LBrace],
                items: NodeList<BlockItem>,
                rbrace: Token [RBrace],
            }

            /// `( <IF> "(" Expression ")" Statement [ <ELSE> Statement ] | <SWITCH> "(" Expression ")" Statement )`
            SelectionStatement => visit_selection_statement {
                form: SelectionForm,
            }

            /// `( <WHILE> "(" Expression ")" Statement | <DO> Statement <WHILE> "(" Expression ")" ";" | <FOR> "(" [ Expression ] ";" [ Expression ] ";" [ Expression ] ")" Statement )`
            IterationStatement => visit_iteration_statement {
                form: IterationForm,
            }

            /// `( <GOTO> <IDENTIFIER> ";" | <CONTINUE> ";" | <BREAK> ";" | <RETURN> [ Expression ] ";" )`
            JumpStatement => visit_jump_statement {
                form: JumpForm,
            }

            /// `AssignmentExpression ( "," AssignmentExpression )*`
            Expression => visit_expression {
                first: AssignmentExpression,
                rest: NodeList<(Token, AssignmentExpression)> [Comma],
            }

            /// `UnaryExpression AssignmentOperator AssignmentExpression | ConditionalExpression`
            AssignmentExpression => visit_assignment_expression {
                form: AssignmentForm,
            }

            /// `( "=" | "*=" | "/=" | "%=" | "+=" | "-=" | "<<=" | ">>=" | "&=" | "^=" | "|=" )`
            AssignmentOperator => visit_assignment_operator {
                operator: Token [Eq, StarEq, SlashEq, PercentEq, PlusEq, MinusEq, LtLtEq, GtGtEq, AmpEq, CaretEq, PipeEq],
            }

            /// `LogicalOrExpression [ "?" Expression ":" ConditionalExpression ]`
            ConditionalExpression => visit_conditional_expression {
                condition: LogicalOrExpression,
                branches: NodeOptional<(Token, Box<Expression>, Token, Box<ConditionalExpression>)> [Question],
            }

            /// `ConditionalExpression`
            ConstantExpression => visit_constant_expression {
                expression: ConditionalExpression,
            }

            /// `LogicalAndExpression [ "||" LogicalOrExpression ]`
            LogicalOrExpression => visit_logical_or_expression {
                lhs: LogicalAndExpression,
                rhs: NodeOptional<(Token, Box<LogicalOrExpression>)> [OrOr],
            }

            /// `InclusiveOrExpression [ "&&" LogicalAndExpression ]`
            LogicalAndExpression => visit_logical_and_expression {
                lhs: InclusiveOrExpression,
                rhs: NodeOptional<(Token, Box<LogicalAndExpression>)> [AndAnd],
            }

            /// `ExclusiveOrExpression [ "|" InclusiveOrExpression ]`
            InclusiveOrExpression => visit_inclusive_or_expression {
                lhs: ExclusiveOrExpression,
                rhs: NodeOptional<(Token, Box<InclusiveOrExpression>)> [Pipe],
            }

            /// `AndExpression [ "^" ExclusiveOrExpression ]`
            ExclusiveOrExpression => visit_exclusive_or_expression {
                lhs: AndExpression,
                rhs: NodeOptional<(Token, Box<ExclusiveOrExpression>)> [Caret],
            }

            /// `EqualityExpression [ "&" AndExpression ]`
            AndExpression => visit_and_expression {
                lhs: EqualityExpression,
                rhs: NodeOptional<(Token, Box<AndExpression>)> [Amp],
            }

            /// `RelationalExpression [ ( "==" | "!=" ) EqualityExpression ]`
            EqualityExpression => visit_equality_expression {
                lhs: RelationalExpression,
                rhs: NodeOptional<(Token, Box<EqualityExpression>)> [EqEq, NotEq],
            }

            /// `ShiftExpression [ ( "<" | ">" | "<=" | ">=" ) RelationalExpression ]`
            RelationalExpression => visit_relational_expression {
                lhs: ShiftExpression,
                rhs: NodeOptional<(Token, Box<RelationalExpression>)> [Lt, Gt, Le, Ge],
            }

            /// `AdditiveExpression [ ( "<<" | ">>" ) ShiftExpression ]`
            ShiftExpression => visit_shift_expression {
                lhs: AdditiveExpression,
                rhs: NodeOptional<(Token, Box<ShiftExpression>)> [LtLt, GtGt],
            }

            /// `MultiplicativeExpression [ ( "+" | "-" ) AdditiveExpression ]`
            AdditiveExpression => visit_additive_expression {
                lhs: MultiplicativeExpression,
                rhs: NodeOptional<(Token, Box<AdditiveExpression>)> [Plus, Minus],
            }

            /// `CastExpression [ ( "*" | "/" | "%" ) MultiplicativeExpression ]`
            MultiplicativeExpression => visit_multiplicative_expression {
                lhs: CastExpression,
                rhs: NodeOptional<(Token, Box<MultiplicativeExpression>)> [Star, Slash, Percent],
            }

            /// `( "(" TypeSpecifier ")" CastExpression | UnaryExpression )`
            CastExpression => visit_cast_expression {
                form: CastForm,
            }

            /// `( PostfixExpression | "++" UnaryExpression | "--" UnaryExpression | UnaryOperator CastExpression | <SIZEOF> ( UnaryExpression | "(" TypeSpecifier ")" ) )`
            UnaryExpression => visit_unary_expression {
                form: UnaryForm,
            }

            /// `( "&" | "*" | "+" | "-" | "~" | "!" )`
            UnaryOperator => visit_unary_operator {
                operator: Token [Amp, Star, Plus, Minus, Tilde, Bang],
            }

            /// `PrimaryExpression ( "[" Expression "]" | "(" [ ArgumentExpressionList ] ")" | "." <IDENTIFIER> | "->" <IDENTIFIER> | "++" | "--" )*`
            PostfixExpression => visit_postfix_expression {
                primary: PrimaryExpression,
                suffixes: NodeList<PostfixSuffix>,
            }

            /// `<IDENTIFIER> | Constant | "(" Expression ")"`
            PrimaryExpression => visit_primary_expression {
                form: PrimaryForm,
            }

            /// `AssignmentOrTypeExpression ( "," AssignmentOrTypeExpression )*`
            ArgumentExpressionList => visit_argument_expression_list {
                first: AssignmentOrTypeExpression,
                rest: NodeList<(Token, AssignmentOrTypeExpression)> [Comma],
            }

            /// `NoIdentifierTypeSpecifier | AssignmentExpression`
            AssignmentOrTypeExpression => visit_assignment_or_type_expression {
                form: ArgumentForm,
            }

            /// `<INTEGER_LITERAL> | <FLOATING_POINT_LITERAL> | <CHARACTER_LITERAL> | <STRING_LITERAL>`
            Constant => visit_constant {
                literal: Token [IntegerLiteral, FloatingPointLiteral, CharacterLiteral, StringLiteral],
            }
        }
    };
}

pub(crate) use c_grammar;
