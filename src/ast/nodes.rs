//! The grammar node catalog.
//!
//! One struct per production, generated from [`c_grammar!`]. Each struct has
//! private fields in grammar order, a read accessor per field, a typed `new`,
//! and `into_parts`. `new` seals the lists it is given. `try_new` also checks
//! every token kind the grammar fixes, as does the dynamic constructor
//! `from_fields` of [`GrammarNode`].
//!
//! Alternations that are not a whole production on their own are the choice
//! enums declared below; alternations made only of single tokens
//! (`StorageClassSpecifier`, `AssignmentOperator`, ...) keep the token, whose
//! kind says which alternative was taken and is checked against the admitted
//! kinds.

use std::fmt;
use std::ops::ControlFlow;

use super::any::{mismatch, FromAny, IntoAny};
use super::containers::{choice, FieldValue, NodeList, NodeOptional, NonEmptyList, TokenSlot};
use super::errors::{AstError, ConstructionError};
use super::grammar::c_grammar;
use super::token::{Token, TokenKind};
use super::visitor::{Each, Node, Visitor};

/// Shared interface of the generated grammar node structs.
pub trait GrammarNode: Node + Sized {
    const KIND: NodeKind;
    /// Field names, in grammar order.
    const FIELDS: &'static [&'static str];

    /// Builds the node from erased children, checking arity and then each
    /// field's shape.
    fn from_fields(fields: Vec<AnyNode>) -> Result<Self, AstError>;

    fn into_fields(self) -> Vec<AnyNode>;

    fn node_ref(&self) -> NodeRef<'_>;
}

macro_rules! count_fields {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count_fields!($($tail)*) };
}

macro_rules! define_nodes {
    ($(
        $(#[$doc:meta])*
        $name:ident => $visit:ident {
            $($field:ident : $ty:ty $([$($allowed:ident),+ $(,)?])?),* $(,)?
        }
    )*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name {
                $($field: $ty,)*
            }

            impl $name {
                /// Builds the node, sealing every list handed in.
                #[allow(clippy::too_many_arguments)]
                pub fn new($($field: $ty),*) -> Self {
                    Self { $($field: FieldValue::publish($field)),* }
                }

                /// Like `new`, and rejects tokens of a kind the grammar does
                /// not admit in their position.
                #[allow(clippy::too_many_arguments)]
                pub fn try_new($($field: $ty),*) -> Result<Self, AstError> {
                    let node = Self::new($($field),*);
                    node.check_fields()?;
                    Ok(node)
                }

                fn check_fields(&self) -> Result<(), ConstructionError> {
                    $(
                        $(
                            TokenSlot::restrict(&self.$field, &[$(TokenKind::$allowed),+])
                                .map_err(|err| err.in_field(NodeKind::$name, stringify!($field)))?;
                        )?
                        FieldValue::check_kinds(&self.$field)
                            .map_err(|err| err.in_field(NodeKind::$name, stringify!($field)))?;
                    )*
                    Ok(())
                }

                $(
                    pub fn $field(&self) -> &$ty {
                        &self.$field
                    }
                )*

                /// Consumes the node, returning its fields in grammar order.
                pub fn into_parts(self) -> ($($ty,)*) {
                    ($(self.$field,)*)
                }
            }

            impl Node for $name {
                fn accept<C, V: Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
                    visitor.$visit(self, ctx)
                }

                fn accept_children<C: Clone, V: Visitor<C>>(
                    &self,
                    visitor: &mut V,
                    ctx: C,
                    each: &mut Each<'_, V, V::Output>,
                ) -> ControlFlow<()> {
                    $(
                        let out = self.$field.accept(visitor, ctx.clone());
                        each(visitor, out)?;
                    )*
                    ControlFlow::Continue(())
                }
            }

            impl GrammarNode for $name {
                const KIND: NodeKind = NodeKind::$name;
                const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];

                fn from_fields(fields: Vec<AnyNode>) -> Result<Self, AstError> {
                    let found = fields.len();
                    let [$($field),*]: [AnyNode; count_fields!($($field)*)] =
                        fields.try_into().map_err(|_| ConstructionError::Arity {
                            node: NodeKind::$name,
                            expected: count_fields!($($field)*),
                            found,
                        })?;
                    let node = Self {
                        $(
                            $field: <$ty as FromAny>::from_any($field)
                                .map_err(|err| err.in_field(NodeKind::$name, stringify!($field)))?,
                        )*
                    };
                    node.check_fields()?;
                    Ok(node)
                }

                fn into_fields(self) -> Vec<AnyNode> {
                    vec![$(self.$field.into_any()),*]
                }

                fn node_ref(&self) -> NodeRef<'_> {
                    NodeRef::$name(self)
                }
            }

            impl FromAny for $name {
                fn from_any(any: AnyNode) -> Result<Self, ConstructionError> {
                    match any {
                        AnyNode::$name(node) => Ok(*node),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }

                fn expected() -> String {
                    stringify!($name).to_string()
                }
            }

            impl IntoAny for $name {
                fn into_any(self) -> AnyNode {
                    AnyNode::$name(Box::new(self))
                }
            }

            impl FieldValue for $name {}

            impl<'a> From<&'a $name> for NodeRef<'a> {
                fn from(node: &'a $name) -> Self {
                    NodeRef::$name(node)
                }
            }
        )*

        /// Discriminant of every grammar node kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum NodeKind {
            $($name,)*
        }

        impl NodeKind {
            /// Every kind, in grammar order.
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$name),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$name => stringify!($name),)*
                }
            }

            pub fn fields(self) -> &'static [&'static str] {
                match self {
                    $(NodeKind::$name => <$name as GrammarNode>::FIELDS,)*
                }
            }

            pub fn arity(self) -> usize {
                self.fields().len()
            }
        }

        /// A borrowed grammar node of any kind.
        ///
        /// Lets a pass inspect the concrete node from a generic hook by
        /// matching, without any runtime type test.
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum NodeRef<'a> {
            $($name(&'a $name),)*
        }

        impl<'a> NodeRef<'a> {
            pub fn kind(self) -> NodeKind {
                match self {
                    $(NodeRef::$name(_) => NodeKind::$name,)*
                }
            }

            /// Clones the referenced node into erased form.
            pub fn to_any(self) -> AnyNode {
                match self {
                    $(NodeRef::$name(node) => AnyNode::$name(Box::new(node.clone())),)*
                }
            }

            /// Dispatches the referenced node to `visitor`.
            pub fn accept<C, V: Visitor<C>>(self, visitor: &mut V, ctx: C) -> V::Output {
                match self {
                    $(NodeRef::$name(node) => visitor.$visit(node, ctx),)*
                }
            }
        }

        /// Owned, type-erased form of any tree element.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum AnyNode {
            Token(Token),
            List(Vec<AnyNode>),
            Optional(Option<Box<AnyNode>>),
            Sequence(Vec<AnyNode>),
            Choice { which: usize, payload: Box<AnyNode> },
            $($name(Box<$name>),)*
        }

        impl AnyNode {
            /// Short name of the held shape, used in mismatch errors.
            pub fn describe(&self) -> &'static str {
                match self {
                    AnyNode::Token(_) => "token",
                    AnyNode::List(_) => "list",
                    AnyNode::Optional(_) => "optional",
                    AnyNode::Sequence(_) => "sequence",
                    AnyNode::Choice { .. } => "choice",
                    $(AnyNode::$name(_) => stringify!($name),)*
                }
            }

            /// The grammar kind held, if this is a grammar node.
            pub fn kind(&self) -> Option<NodeKind> {
                match self {
                    $(AnyNode::$name(_) => Some(NodeKind::$name),)*
                    _ => None,
                }
            }

            /// The erased children of a grammar node; `None` for tokens and
            /// containers.
            pub fn into_fields(self) -> Option<Vec<AnyNode>> {
                match self {
                    $(AnyNode::$name(node) => Some(node.into_fields()),)*
                    _ => None,
                }
            }

            /// Constructs a grammar node of `kind` from erased children.
            pub fn build(kind: NodeKind, fields: Vec<AnyNode>) -> Result<AnyNode, AstError> {
                match kind {
                    $(NodeKind::$name => $name::from_fields(fields).map(IntoAny::into_any),)*
                }
            }
        }
    };
}

c_grammar!(define_nodes);

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== Choice enums =====

choice! {
    /// What follows the storage classes of an external declaration.
    pub enum ExternalItem {
        Function(FunctionDeclaration) => as_function,
        /// A bare struct or union declaration with its terminating `;`.
        Aggregate((StructOrUnionSpecifier, Token)) => as_aggregate,
        Variable(VariableDeclaration) => as_variable,
        Typedef(TypeDeclaration) => as_typedef,
    }
}

choice! {
    /// `;` for a prototype, or a body.
    pub enum FunctionBody {
        Prototype(Token) [Semicolon] => as_prototype,
        Definition(CompoundStatement) => as_definition,
    }
}

choice! {
    pub enum TypedefTarget {
        Data(DataType) => as_data,
        Function(FunctionType) => as_function,
    }
}

choice! {
    /// The base of a [`TypeSpecifier`].
    ///
    /// Multi-word forms keep each keyword: `short int` is `Short((short, Some(int)))`.
    pub enum BaseType {
        Void(Token) [Void] => as_void,
        Char(Token) [Char] => as_char,
        Short((Token, NodeOptional<Token>)) [Short] => as_short,
        Int(Token) [Int] => as_int,
        Long((Token, NodeOptional<Token>)) [Long] => as_long,
        Float(Token) [Float] => as_float,
        Double(Token) [Double] => as_double,
        /// `signed` or `unsigned`, optionally followed by a width.
        Signedness((Token, NodeOptional<IntegerType>)) [Signed, Unsigned] => as_signedness,
        Aggregate(StructOrUnionSpecifier) => as_aggregate,
        Enum(EnumSpecifier) => as_enum,
        /// A typedef name.
        Named(Token) [Identifier] => as_named,
    }
}

choice! {
    /// [`BaseType`] without the typedef-name alternative.
    pub enum NoIdentifierBaseType {
        Void(Token) [Void] => as_void,
        Char(Token) [Char] => as_char,
        Short((Token, NodeOptional<Token>)) [Short] => as_short,
        Int(Token) [Int] => as_int,
        Long((Token, NodeOptional<Token>)) [Long] => as_long,
        Float(Token) [Float] => as_float,
        Double(Token) [Double] => as_double,
        Signedness((Token, NodeOptional<IntegerType>)) [Signed, Unsigned] => as_signedness,
        Aggregate(StructOrUnionSpecifier) => as_aggregate,
        Enum(EnumSpecifier) => as_enum,
    }
}

choice! {
    /// Width after `signed` / `unsigned`.
    pub enum IntegerType {
        Char(Token) [Char] => as_char,
        Short((Token, NodeOptional<Token>)) [Short] => as_short,
        Int(Token) [Int] => as_int,
        Long((Token, NodeOptional<Token>)) [Long] => as_long,
    }
}

choice! {
    pub enum AggregateForm {
        /// `struct [tag] { members }`
        Definition((StructOrUnion, NodeOptional<Token>, Token, StructDeclarationList, Token)) => as_definition,
        /// `struct tag`
        Reference((StructOrUnion, Token)) => as_reference,
    }
}

choice! {
    pub enum MemberSuffix {
        Array(Array) => as_array,
        BitField((Token, ConstantExpression)) [Colon] => as_bit_field,
    }
}

choice! {
    pub enum EnumBody {
        Definition((NodeOptional<Token>, Token, EnumeratorList, Token)) => as_definition,
        Reference(Token) [Identifier] => as_reference,
    }
}

choice! {
    pub enum InitializerForm {
        Expression(AssignmentExpression) => as_expression,
        /// `{ list [,] }`
        Braced((Token, Box<InitializerList>, NodeOptional<Token>, Token)) [LBrace] => as_braced,
    }
}

choice! {
    pub enum StatementForm {
        Labeled(LabeledStatement) => as_labeled,
        Expression(ExpressionStatement) => as_expression,
        Compound(CompoundStatement) => as_compound,
        Selection(SelectionStatement) => as_selection,
        Iteration(IterationStatement) => as_iteration,
        Jump(JumpStatement) => as_jump,
    }
}

choice! {
    pub enum LabeledForm {
        Label((Token, Token, Box<Statement>)) [Identifier] => as_label,
        Case((Token, ConstantExpression, Token, Box<Statement>)) [Case] => as_case,
        Default((Token, Token, Box<Statement>)) [Default] => as_default,
    }
}

choice! {
    /// One item of a block.
    pub enum BlockItem {
        Declaration(LocalVariableDeclaration) => as_declaration,
        Statement(Statement) => as_statement,
    }
}

choice! {
    pub enum SelectionForm {
        /// `if ( cond ) then [else otherwise]`
        If((Token, Token, Expression, Token, Box<Statement>, NodeOptional<(Token, Box<Statement>)>)) [If] => as_if,
        Switch((Token, Token, Expression, Token, Box<Statement>)) [Switch] => as_switch,
    }
}

choice! {
    pub enum IterationForm {
        While((Token, Token, Expression, Token, Box<Statement>)) [While] => as_while,
        DoWhile((Token, Box<Statement>, Token, Token, Expression, Token, Token)) [Do] => as_do_while,
        For((
            Token,
            Token,
            NodeOptional<Expression>,
            Token,
            NodeOptional<Expression>,
            Token,
            NodeOptional<Expression>,
            Token,
            Box<Statement>,
        )) [For] => as_for,
    }
}

choice! {
    pub enum JumpForm {
        Goto((Token, Token, Token)) [Goto] => as_goto,
        Continue((Token, Token)) [Continue] => as_continue,
        Break((Token, Token)) [Break] => as_break,
        Return((Token, NodeOptional<Expression>, Token)) [Return] => as_return,
    }
}

choice! {
    pub enum AssignmentForm {
        Assign((UnaryExpression, AssignmentOperator, Box<AssignmentExpression>)) => as_assign,
        Conditional(ConditionalExpression) => as_conditional,
    }
}

choice! {
    pub enum CastForm {
        /// `( type ) operand`
        Cast((Token, Box<TypeSpecifier>, Token, Box<CastExpression>)) [LParen] => as_cast,
        Unary(UnaryExpression) => as_unary,
    }
}

choice! {
    pub enum UnaryForm {
        Postfix(PostfixExpression) => as_postfix,
        PreIncrement((Token, Box<UnaryExpression>)) [PlusPlus] => as_pre_increment,
        PreDecrement((Token, Box<UnaryExpression>)) [MinusMinus] => as_pre_decrement,
        Operator((UnaryOperator, Box<CastExpression>)) => as_operator,
        Sizeof((Token, SizeofOperand)) [Sizeof] => as_sizeof,
    }
}

choice! {
    pub enum SizeofOperand {
        Expression(Box<UnaryExpression>) => as_expression,
        Type((Token, Box<TypeSpecifier>, Token)) [LParen] => as_type,
    }
}

choice! {
    /// One postfix operation applied to a primary expression.
    pub enum PostfixSuffix {
        Index((Token, Expression, Token)) [LBracket] => as_index,
        Call((Token, NodeOptional<ArgumentExpressionList>, Token)) [LParen] => as_call,
        Member((Token, Token)) [Dot] => as_member,
        PointerMember((Token, Token)) [Arrow] => as_pointer_member,
        Increment(Token) [PlusPlus] => as_increment,
        Decrement(Token) [MinusMinus] => as_decrement,
    }
}

choice! {
    pub enum PrimaryForm {
        Identifier(Token) [Identifier] => as_identifier,
        Constant(Constant) => as_constant,
        Parenthesized((Token, Box<Expression>, Token)) [LParen] => as_parenthesized,
    }
}

choice! {
    /// A call argument: either a type name (as in `sizeof`-like builtins) or
    /// an expression.
    pub enum ArgumentForm {
        Type(NoIdentifierTypeSpecifier) => as_type,
        Expression(AssignmentExpression) => as_expression,
    }
}

// ===== Convenience constructors =====
//
// These fill in literal punctuation with synthetic tokens.

impl Pointer {
    /// `*` followed by an optional nested pointer.
    pub fn with_next(next: Option<Pointer>) -> Self {
        Self::new(
            Token::synthetic(TokenKind::Star),
            NodeOptional::empty(),
            next.map(Box::new).into(),
        )
    }
}

impl Array {
    /// `[ size ]`, or `[]` without a size.
    pub fn sized(size: Option<ConstantExpression>) -> Self {
        Self::new(
            Token::synthetic(TokenKind::LBracket),
            size.into(),
            Token::synthetic(TokenKind::RBracket),
        )
    }
}

impl CompoundStatement {
    pub fn braced(items: impl IntoIterator<Item = BlockItem>) -> Self {
        Self::new(
            Token::synthetic(TokenKind::LBrace),
            items.into_iter().collect(),
            Token::synthetic(TokenKind::RBrace),
        )
    }
}

impl ExpressionStatement {
    pub fn terminated(expression: Option<Expression>) -> Self {
        Self::new(expression.into(), Token::synthetic(TokenKind::Semicolon))
    }
}

impl JumpStatement {
    /// `return [value];`
    pub fn return_value(value: Option<Expression>) -> Self {
        Self::new(JumpForm::Return((
            Token::synthetic(TokenKind::Return),
            value.into(),
            Token::synthetic(TokenKind::Semicolon),
        )))
    }
}

impl PrimaryExpression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::new(PrimaryForm::Identifier(Token::ident(name)))
    }
}

macro_rules! binary_levels {
    ($($level:ident($operand:ident)),+ $(,)?) => {
        $(
            impl From<$operand> for $level {
                fn from(operand: $operand) -> Self {
                    Self::new(operand, NodeOptional::empty())
                }
            }
        )+
    };
}

// Wrapping a tighter-binding expression into a looser level, with no
// operator applied.
binary_levels! {
    LogicalOrExpression(LogicalAndExpression),
    LogicalAndExpression(InclusiveOrExpression),
    InclusiveOrExpression(ExclusiveOrExpression),
    ExclusiveOrExpression(AndExpression),
    AndExpression(EqualityExpression),
    EqualityExpression(RelationalExpression),
    RelationalExpression(ShiftExpression),
    ShiftExpression(AdditiveExpression),
    AdditiveExpression(MultiplicativeExpression),
    MultiplicativeExpression(CastExpression),
}

impl From<PrimaryExpression> for Expression {
    /// Lifts a primary expression through every precedence level.
    fn from(primary: PrimaryExpression) -> Self {
        let postfix = PostfixExpression::new(primary, NodeList::new().seal());
        let unary = UnaryExpression::new(UnaryForm::Postfix(postfix));
        let cast = CastExpression::new(CastForm::Unary(unary));
        let or = LogicalOrExpression::from(LogicalAndExpression::from(
            InclusiveOrExpression::from(ExclusiveOrExpression::from(AndExpression::from(
                EqualityExpression::from(RelationalExpression::from(ShiftExpression::from(
                    AdditiveExpression::from(MultiplicativeExpression::from(cast)),
                ))),
            ))),
        ));
        let conditional = ConditionalExpression::new(or, NodeOptional::empty());
        let assignment = AssignmentExpression::new(AssignmentForm::Conditional(conditional));
        Expression::new(assignment, NodeList::new().seal())
    }
}
