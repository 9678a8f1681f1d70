//! Generic composite containers used as fields of grammar nodes.
//!
//! - [`NodeList`]: zero or more children, in insertion order
//! - [`NonEmptyList`]: one or more children
//! - [`NodeOptional`]: zero or one child
//! - tuples `(A, B, ..)`: fixed-arity glue, see [`Sequence`]
//! - choice enums: exactly one of several alternatives, see [`Choice`]
//!
//! [`FieldValue`] and [`TokenSlot`] are what a node constructor runs over its
//! fields: sealing lists on publication and checking token kinds.
//!
//! Containers never interpret their children. Dispatching a container hands
//! it to the matching generic `visit_*` method; recursing into it forwards to
//! each held child in container order.

use std::ops::{ControlFlow, Deref};
use std::slice;
use std::vec;

use super::errors::{AstError, ConstructionError};
use super::token::{Token, TokenKind};
use super::visitor::{Each, Node, Visitor};

/// Ordered repetition of nodes.
///
/// A list is open while a parser is filling it and sealed once it is handed
/// out as part of a tree. Lists built from a `Vec` or an iterator are sealed
/// from the start.
#[derive(Debug, Clone, Eq)]
pub struct NodeList<N> {
    nodes: Vec<N>,
    sealed: bool,
}

impl<N> NodeList<N> {
    /// An empty, open list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            sealed: false,
        }
    }

    /// Appends a node. Fails once the list has been sealed.
    pub fn add(&mut self, node: N) -> Result<(), AstError> {
        if self.sealed {
            return Err(ConstructionError::Sealed.into());
        }
        self.nodes.push(node);
        Ok(())
    }

    pub fn seal(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn element_at(&self, index: usize) -> Result<&N, AstError> {
        self.nodes.get(index).ok_or(AstError::Index {
            index,
            len: self.nodes.len(),
        })
    }

    pub fn iter(&self) -> slice::Iter<'_, N> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[N] {
        &self.nodes
    }
}

impl<N> Default for NodeList<N> {
    fn default() -> Self {
        Self::new()
    }
}

// Two lists are equal when they hold equal children; sealing is a build-time
// property and does not take part.
impl<N: PartialEq> PartialEq for NodeList<N> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl<N> From<Vec<N>> for NodeList<N> {
    fn from(nodes: Vec<N>) -> Self {
        Self {
            nodes,
            sealed: true,
        }
    }
}

impl<N> FromIterator<N> for NodeList<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a, N> IntoIterator for &'a NodeList<N> {
    type Item = &'a N;
    type IntoIter = slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl<N> IntoIterator for NodeList<N> {
    type Item = N;
    type IntoIter = vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<N: Node> Node for NodeList<N> {
    fn accept<C, V: Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
        visitor.visit_list(self, ctx)
    }

    fn accept_children<C: Clone, V: Visitor<C>>(
        &self,
        visitor: &mut V,
        ctx: C,
        each: &mut Each<'_, V, V::Output>,
    ) -> ControlFlow<()> {
        for node in &self.nodes {
            let out = node.accept(visitor, ctx.clone());
            each(visitor, out)?;
        }
        ControlFlow::Continue(())
    }
}

/// A list holding at least one node, for `( X )+` repetitions.
///
/// Reads as a [`NodeList`] through `Deref` and is traversed as one. It is
/// always sealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyList<N>(NodeList<N>);

impl<N> NonEmptyList<N> {
    pub fn new(first: N, rest: impl IntoIterator<Item = N>) -> Self {
        Self(std::iter::once(first).chain(rest).collect())
    }

    pub fn as_list(&self) -> &NodeList<N> {
        &self.0
    }

    pub fn into_list(self) -> NodeList<N> {
        self.0
    }
}

impl<N> Deref for NonEmptyList<N> {
    type Target = NodeList<N>;

    fn deref(&self) -> &NodeList<N> {
        &self.0
    }
}

impl<N> TryFrom<NodeList<N>> for NonEmptyList<N> {
    type Error = ConstructionError;

    fn try_from(list: NodeList<N>) -> Result<Self, ConstructionError> {
        if list.is_empty() {
            return Err(ConstructionError::Mismatch {
                expected: "at least one element".to_string(),
                found: "empty list",
            });
        }
        Ok(Self(list.seal()))
    }
}

impl<N> TryFrom<Vec<N>> for NonEmptyList<N> {
    type Error = ConstructionError;

    fn try_from(nodes: Vec<N>) -> Result<Self, ConstructionError> {
        Self::try_from(NodeList::from(nodes))
    }
}

impl<'a, N> IntoIterator for &'a NonEmptyList<N> {
    type Item = &'a N;
    type IntoIter = slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<N> IntoIterator for NonEmptyList<N> {
    type Item = N;
    type IntoIter = vec::IntoIter<N>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<N: Node> Node for NonEmptyList<N> {
    fn accept<C, V: Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
        visitor.visit_list(&self.0, ctx)
    }

    fn accept_children<C: Clone, V: Visitor<C>>(
        &self,
        visitor: &mut V,
        ctx: C,
        each: &mut Each<'_, V, V::Output>,
    ) -> ControlFlow<()> {
        self.0.accept_children(visitor, ctx, each)
    }
}

/// A slot holding zero or one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOptional<N>(Option<N>);

impl<N> NodeOptional<N> {
    pub fn present(node: N) -> Self {
        Self(Some(node))
    }

    pub fn empty() -> Self {
        Self(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// The held node, or [`AstError::EmptyAccess`] when the slot is empty.
    pub fn value(&self) -> Result<&N, AstError> {
        self.0.as_ref().ok_or(AstError::EmptyAccess)
    }

    pub fn as_option(&self) -> Option<&N> {
        self.0.as_ref()
    }

    pub fn into_option(self) -> Option<N> {
        self.0
    }
}

impl<N> Default for NodeOptional<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<N> From<Option<N>> for NodeOptional<N> {
    fn from(node: Option<N>) -> Self {
        Self(node)
    }
}

impl<N: Node> Node for NodeOptional<N> {
    fn accept<C, V: Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
        visitor.visit_optional(self, ctx)
    }

    fn accept_children<C: Clone, V: Visitor<C>>(
        &self,
        visitor: &mut V,
        ctx: C,
        each: &mut Each<'_, V, V::Output>,
    ) -> ControlFlow<()> {
        match &self.0 {
            Some(node) => {
                let out = node.accept(visitor, ctx);
                each(visitor, out)
            }
            None => ControlFlow::Continue(()),
        }
    }
}

/// What a node constructor runs over each of its fields.
///
/// Both hooks are shallow: they stop at nested grammar nodes, which ran them
/// when they were built.
pub trait FieldValue: Sized {
    /// Seals every list held, once the value becomes part of a tree.
    fn publish(self) -> Self {
        self
    }

    /// Checks the token kinds the grammar fixes inside this value.
    fn check_kinds(&self) -> Result<(), ConstructionError> {
        Ok(())
    }
}

impl FieldValue for Token {}

impl<N: FieldValue> FieldValue for Box<N> {
    fn publish(self) -> Self {
        Box::new((*self).publish())
    }

    fn check_kinds(&self) -> Result<(), ConstructionError> {
        (**self).check_kinds()
    }
}

impl<N: FieldValue> FieldValue for NodeList<N> {
    fn publish(self) -> Self {
        Self {
            nodes: self.nodes.into_iter().map(FieldValue::publish).collect(),
            sealed: true,
        }
    }

    fn check_kinds(&self) -> Result<(), ConstructionError> {
        self.nodes.iter().try_for_each(FieldValue::check_kinds)
    }
}

impl<N: FieldValue> FieldValue for NonEmptyList<N> {
    fn publish(self) -> Self {
        Self(self.0.publish())
    }

    fn check_kinds(&self) -> Result<(), ConstructionError> {
        self.0.check_kinds()
    }
}

impl<N: FieldValue> FieldValue for NodeOptional<N> {
    fn publish(self) -> Self {
        Self(self.0.map(FieldValue::publish))
    }

    fn check_kinds(&self) -> Result<(), ConstructionError> {
        self.0.as_ref().map_or(Ok(()), FieldValue::check_kinds)
    }
}

/// A field position whose token kinds are fixed by the grammar.
///
/// Sequences are checked by their leading token, containers by each token
/// they hold.
pub trait TokenSlot {
    fn restrict(&self, allowed: &[TokenKind]) -> Result<(), ConstructionError>;
}

impl TokenSlot for Token {
    fn restrict(&self, allowed: &[TokenKind]) -> Result<(), ConstructionError> {
        if allowed.contains(&self.kind()) {
            return Ok(());
        }
        let names: Vec<&str> = allowed.iter().map(|kind| kind.name()).collect();
        Err(ConstructionError::Mismatch {
            expected: format!("token {}", names.join(" or ")),
            found: self.kind().name(),
        })
    }
}

impl<T: TokenSlot> TokenSlot for NodeOptional<T> {
    fn restrict(&self, allowed: &[TokenKind]) -> Result<(), ConstructionError> {
        self.0.as_ref().map_or(Ok(()), |slot| slot.restrict(allowed))
    }
}

impl<T: TokenSlot> TokenSlot for NodeList<T> {
    fn restrict(&self, allowed: &[TokenKind]) -> Result<(), ConstructionError> {
        self.nodes.iter().try_for_each(|slot| slot.restrict(allowed))
    }
}

/// Fixed-arity heterogeneous glue, implemented for tuples of 2 to 9 nodes.
pub trait Sequence: Node {
    const ARITY: usize;
}

macro_rules! sequence_impls {
    ($( $arity:literal => ($($idx:tt : $T:ident),+); )+) => {
        $(
            impl<$($T: Node),+> Sequence for ($($T,)+) {
                const ARITY: usize = $arity;
            }

            impl<$($T: Node),+> Node for ($($T,)+) {
                fn accept<C, V: Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
                    visitor.visit_sequence(self, ctx)
                }

                fn accept_children<C: Clone, V: Visitor<C>>(
                    &self,
                    visitor: &mut V,
                    ctx: C,
                    each: &mut Each<'_, V, V::Output>,
                ) -> ControlFlow<()> {
                    $(
                        let out = self.$idx.accept(visitor, ctx.clone());
                        each(visitor, out)?;
                    )+
                    ControlFlow::Continue(())
                }
            }

            impl<$($T: FieldValue),+> FieldValue for ($($T,)+) {
                fn publish(self) -> Self {
                    ($(self.$idx.publish(),)+)
                }

                fn check_kinds(&self) -> Result<(), ConstructionError> {
                    $(self.$idx.check_kinds()?;)+
                    Ok(())
                }
            }
        )+
    };
}

macro_rules! leading_token_slots {
    ($( ($($T:ident),+) )+) => {
        $(
            impl<$($T),+> TokenSlot for (Token, $($T,)+) {
                fn restrict(&self, allowed: &[TokenKind]) -> Result<(), ConstructionError> {
                    self.0.restrict(allowed)
                }
            }
        )+
    };
}

leading_token_slots! {
    (B)
    (B, D)
    (B, D, E)
    (B, D, E, F)
    (B, D, E, F, G)
    (B, D, E, F, G, H)
    (B, D, E, F, G, H, I)
    (B, D, E, F, G, H, I, J)
}

sequence_impls! {
    2 => (0: A, 1: B);
    3 => (0: A, 1: B, 2: D);
    4 => (0: A, 1: B, 2: D, 3: E);
    5 => (0: A, 1: B, 2: D, 3: E, 4: F);
    6 => (0: A, 1: B, 2: D, 3: E, 4: F, 5: G);
    7 => (0: A, 1: B, 2: D, 3: E, 4: F, 5: G, 6: H);
    8 => (0: A, 1: B, 2: D, 3: E, 4: F, 5: G, 6: H, 7: I);
    9 => (0: A, 1: B, 2: D, 3: E, 4: F, 5: G, 6: H, 7: I, 8: J);
}

/// A tagged alternation: exactly one alternative is held at any time.
///
/// Implemented by the choice enums declared with [`choice!`].
pub trait Choice: Node {
    /// Name of the choice type, for diagnostics.
    const NAME: &'static str;
    /// Alternative names, indexed by discriminant.
    const ALTERNATIVES: &'static [&'static str];

    /// Index of the held alternative.
    fn which(&self) -> usize;

    fn alternative(&self) -> &'static str {
        Self::ALTERNATIVES[self.which()]
    }

    /// Fails unless the held alternative is `which`.
    fn check_alternative(&self, which: usize) -> Result<(), AstError> {
        if self.which() == which {
            return Ok(());
        }
        Err(ConstructionError::WrongAlternative {
            choice: Self::NAME,
            expected: Self::ALTERNATIVES.get(which).copied().unwrap_or("<none>"),
            found: self.alternative(),
        }
        .into())
    }
}

/// Declares a choice enum together with its typed accessors, its [`Choice`]
/// and [`Node`] impls, and its dynamic-construction conversions.
///
/// A variant may list the token kinds its payload has to start with.
///
/// ```ignore
/// choice! {
///     pub enum FunctionBody {
///         Prototype(Token) [Semicolon] => as_prototype,
///         Definition(CompoundStatement) => as_definition,
///     }
/// }
/// ```
macro_rules! choice {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident($payload:ty) $([$($allowed:ident),+ $(,)?])? => $accessor:ident,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant($payload), )+
        }

        impl $name {
            $(
                pub fn $accessor(&self) -> Result<&$payload, $crate::ast::errors::AstError> {
                    match self {
                        $name::$variant(payload) => Ok(payload),
                        other => Err($crate::ast::errors::ConstructionError::WrongAlternative {
                            choice: stringify!($name),
                            expected: stringify!($variant),
                            found: $crate::ast::containers::Choice::alternative(other),
                        }
                        .into()),
                    }
                }
            )+
        }

        impl $crate::ast::containers::Choice for $name {
            const NAME: &'static str = stringify!($name);
            const ALTERNATIVES: &'static [&'static str] = &[$(stringify!($variant)),+];

            #[allow(unused_assignments)]
            fn which(&self) -> usize {
                let mut index = 0;
                $(
                    if let $name::$variant(_) = self {
                        return index;
                    }
                    index += 1;
                )+
                index
            }
        }

        impl $crate::ast::visitor::Node for $name {
            fn accept<C, V: $crate::ast::visitor::Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
                visitor.visit_choice(self, ctx)
            }

            fn accept_children<C: Clone, V: $crate::ast::visitor::Visitor<C>>(
                &self,
                visitor: &mut V,
                ctx: C,
                each: &mut $crate::ast::visitor::Each<'_, V, V::Output>,
            ) -> ::std::ops::ControlFlow<()> {
                match self {
                    $(
                        $name::$variant(payload) => {
                            let out = $crate::ast::visitor::Node::accept(payload, visitor, ctx);
                            each(visitor, out)
                        }
                    )+
                }
            }
        }

        impl $crate::ast::any::FromAny for $name {
            #[allow(unused_assignments)]
            fn from_any(
                any: $crate::ast::nodes::AnyNode,
            ) -> Result<Self, $crate::ast::errors::ConstructionError> {
                match any {
                    $crate::ast::nodes::AnyNode::Choice { which, payload } => {
                        let mut index = 0;
                        $(
                            if which == index {
                                return <$payload as $crate::ast::any::FromAny>::from_any(*payload)
                                    .map($name::$variant);
                            }
                            index += 1;
                        )+
                        Err($crate::ast::errors::ConstructionError::UnknownAlternative {
                            choice: stringify!($name),
                            which,
                        })
                    }
                    other => Err($crate::ast::any::mismatch::<Self>(&other)),
                }
            }

            fn expected() -> String {
                format!("choice {}", stringify!($name))
            }
        }

        impl $crate::ast::containers::FieldValue for $name {
            fn publish(self) -> Self {
                match self {
                    $(
                        $name::$variant(payload) => {
                            $name::$variant($crate::ast::containers::FieldValue::publish(payload))
                        }
                    )+
                }
            }

            fn check_kinds(&self) -> Result<(), $crate::ast::errors::ConstructionError> {
                match self {
                    $(
                        $name::$variant(payload) => {
                            $(
                                $crate::ast::containers::TokenSlot::restrict(
                                    payload,
                                    &[$($crate::ast::token::TokenKind::$allowed),+],
                                )?;
                            )?
                            $crate::ast::containers::FieldValue::check_kinds(payload)
                        }
                    )+
                }
            }
        }

        impl $crate::ast::any::IntoAny for $name {
            fn into_any(self) -> $crate::ast::nodes::AnyNode {
                let which = $crate::ast::containers::Choice::which(&self);
                let payload = match self {
                    $( $name::$variant(payload) => $crate::ast::any::IntoAny::into_any(payload), )+
                };
                $crate::ast::nodes::AnyNode::Choice {
                    which,
                    payload: Box::new(payload),
                }
            }
        }
    };
}

pub(crate) use choice;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::token::{Token, TokenKind};

    #[test]
    fn test_list_add_then_seal() {
        let mut list = NodeList::new();
        list.add(Token::synthetic(TokenKind::Star)).unwrap();
        list.add(Token::synthetic(TokenKind::Const)).unwrap();
        assert!(!list.is_sealed());

        let mut list = list.seal();
        assert!(list.is_sealed());
        assert_eq!(
            list.add(Token::synthetic(TokenKind::Star)),
            Err(AstError::Construction(ConstructionError::Sealed))
        );
        assert_eq!(list.size(), 2);
    }

    #[test]
    fn test_list_element_at() {
        let list: NodeList<Token> = vec![Token::ident("a"), Token::ident("b")].into();
        assert!(list.is_sealed());
        assert_eq!(list.element_at(1).unwrap().text(), "b");
        assert_eq!(
            list.element_at(2),
            Err(AstError::Index { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_list_equality_ignores_seal() {
        let mut open = NodeList::new();
        open.add(Token::ident("x")).unwrap();
        let sealed: NodeList<Token> = std::iter::once(Token::ident("x")).collect();
        assert_eq!(open, sealed);
    }

    #[test]
    fn test_non_empty_list() {
        let list = NonEmptyList::new(Token::ident("a"), vec![Token::ident("b")]);
        assert!(list.is_sealed());
        assert_eq!(list.size(), 2);
        assert_eq!(list.element_at(0).unwrap().text(), "a");

        assert_eq!(
            NonEmptyList::<Token>::try_from(NodeList::new()),
            Err(ConstructionError::Mismatch {
                expected: "at least one element".to_string(),
                found: "empty list",
            })
        );
    }

    #[test]
    fn test_publish_seals_nested_lists() {
        let mut inner = NodeList::new();
        inner.add(Token::ident("x")).unwrap();
        let slot = NodeOptional::present(inner).publish();
        assert!(slot.value().unwrap().is_sealed());
    }

    #[test]
    fn test_token_slots() {
        let comma = (Token::synthetic(TokenKind::Comma), Token::ident("b"));
        let list: NodeList<(Token, Token)> = vec![comma].into();
        assert!(list.restrict(&[TokenKind::Comma]).is_ok());
        assert_eq!(
            list.restrict(&[TokenKind::Semicolon]),
            Err(ConstructionError::Mismatch {
                expected: "token ;".to_string(),
                found: ",",
            })
        );

        let empty: NodeOptional<Token> = NodeOptional::empty();
        assert!(empty.restrict(&[TokenKind::Const]).is_ok());
    }

    #[test]
    fn test_optional_value() {
        let slot = NodeOptional::present(Token::ident("n"));
        assert!(slot.is_present());
        assert_eq!(slot.value().unwrap().text(), "n");

        let slot: NodeOptional<Token> = NodeOptional::empty();
        assert!(!slot.is_present());
        assert_eq!(slot.value(), Err(AstError::EmptyAccess));
        assert_eq!(slot.as_option(), None);
    }

    #[test]
    fn test_sequence_arity() {
        assert_eq!(<(Token, Token) as Sequence>::ARITY, 2);
        assert_eq!(
            <(Token, Token, Token, Token, Token, Token, Token, Token, Token) as Sequence>::ARITY,
            9
        );
    }
}
