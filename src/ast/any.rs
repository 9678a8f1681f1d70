//! Conversions between typed tree elements and the erased [`AnyNode`] form.
//!
//! [`AnyNode`] is what the dynamic construction path speaks: a builder that
//! only knows a node's kind and an ordered list of children hands them to
//! [`AnyNode::build`](super::nodes::AnyNode::build), and every field is
//! checked against the declared type on the way in.

use super::containers::{NodeList, NodeOptional, NonEmptyList};
use super::errors::ConstructionError;
use super::nodes::AnyNode;
use super::token::Token;

/// Typed extraction from an erased node.
pub trait FromAny: Sized {
    fn from_any(any: AnyNode) -> Result<Self, ConstructionError>;

    /// Human-readable description of the accepted shape.
    fn expected() -> String;
}

/// Erasure of a typed tree element.
pub trait IntoAny {
    fn into_any(self) -> AnyNode;
}

pub(crate) fn mismatch<T: FromAny>(found: &AnyNode) -> ConstructionError {
    ConstructionError::Mismatch {
        expected: T::expected(),
        found: found.describe(),
    }
}

impl FromAny for Token {
    fn from_any(any: AnyNode) -> Result<Self, ConstructionError> {
        match any {
            AnyNode::Token(token) => Ok(token),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn expected() -> String {
        "token".to_string()
    }
}

impl IntoAny for Token {
    fn into_any(self) -> AnyNode {
        AnyNode::Token(self)
    }
}

// Boxes only break recursive type cycles; they are invisible in erased form.
impl<N: FromAny> FromAny for Box<N> {
    fn from_any(any: AnyNode) -> Result<Self, ConstructionError> {
        N::from_any(any).map(Box::new)
    }

    fn expected() -> String {
        N::expected()
    }
}

impl<N: IntoAny> IntoAny for Box<N> {
    fn into_any(self) -> AnyNode {
        (*self).into_any()
    }
}

impl<N: FromAny> FromAny for NodeList<N> {
    fn from_any(any: AnyNode) -> Result<Self, ConstructionError> {
        match any {
            AnyNode::List(items) => items.into_iter().map(N::from_any).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn expected() -> String {
        format!("list of {}", N::expected())
    }
}

impl<N: IntoAny> IntoAny for NodeList<N> {
    fn into_any(self) -> AnyNode {
        AnyNode::List(self.into_iter().map(IntoAny::into_any).collect())
    }
}

impl<N: FromAny> FromAny for NonEmptyList<N> {
    fn from_any(any: AnyNode) -> Result<Self, ConstructionError> {
        let list = NodeList::<N>::from_any(any)?;
        if list.is_empty() {
            return Err(ConstructionError::Mismatch {
                expected: Self::expected(),
                found: "empty list",
            });
        }
        NonEmptyList::try_from(list)
    }

    fn expected() -> String {
        format!("non-empty list of {}", N::expected())
    }
}

impl<N: IntoAny> IntoAny for NonEmptyList<N> {
    fn into_any(self) -> AnyNode {
        self.into_list().into_any()
    }
}

impl<N: FromAny> FromAny for NodeOptional<N> {
    fn from_any(any: AnyNode) -> Result<Self, ConstructionError> {
        match any {
            AnyNode::Optional(None) => Ok(NodeOptional::empty()),
            AnyNode::Optional(Some(node)) => N::from_any(*node).map(NodeOptional::present),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn expected() -> String {
        format!("optional {}", N::expected())
    }
}

impl<N: IntoAny> IntoAny for NodeOptional<N> {
    fn into_any(self) -> AnyNode {
        AnyNode::Optional(self.into_option().map(|node| Box::new(node.into_any())))
    }
}

macro_rules! sequence_conversions {
    ($( $arity:literal => ($($idx:tt : $T:ident / $slot:ident),+); )+) => {
        $(
            impl<$($T: FromAny),+> FromAny for ($($T,)+) {
                fn from_any(any: AnyNode) -> Result<Self, ConstructionError> {
                    let items = match any {
                        AnyNode::Sequence(items) => items,
                        other => return Err(mismatch::<Self>(&other)),
                    };
                    let found = items.len();
                    let [$($slot),+]: [AnyNode; $arity] = items
                        .try_into()
                        .map_err(|_| ConstructionError::SequenceArity { expected: $arity, found })?;
                    Ok(($(<$T as FromAny>::from_any($slot)?,)+))
                }

                fn expected() -> String {
                    let parts: Vec<String> = vec![$(<$T as FromAny>::expected()),+];
                    format!("sequence ({})", parts.join(", "))
                }
            }

            impl<$($T: IntoAny),+> IntoAny for ($($T,)+) {
                fn into_any(self) -> AnyNode {
                    AnyNode::Sequence(vec![$(self.$idx.into_any()),+])
                }
            }
        )+
    };
}

sequence_conversions! {
    2 => (0: A / a, 1: B / b);
    3 => (0: A / a, 1: B / b, 2: D / d);
    4 => (0: A / a, 1: B / b, 2: D / d, 3: E / e);
    5 => (0: A / a, 1: B / b, 2: D / d, 3: E / e, 4: F / f);
    6 => (0: A / a, 1: B / b, 2: D / d, 3: E / e, 4: F / f, 5: G / g);
    7 => (0: A / a, 1: B / b, 2: D / d, 3: E / e, 4: F / f, 5: G / g, 6: H / h);
    8 => (0: A / a, 1: B / b, 2: D / d, 3: E / e, 4: F / f, 5: G / g, 6: H / h, 7: I / i);
    9 => (0: A / a, 1: B / b, 2: D / d, 3: E / e, 4: F / f, 5: G / g, 6: H / h, 7: I / i, 8: J / j);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::token::TokenKind;

    #[test]
    fn test_token_from_wrong_shape() {
        let err = Token::from_any(AnyNode::List(vec![])).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::Mismatch {
                expected: "token".to_string(),
                found: "list",
            }
        );
    }

    #[test]
    fn test_sequence_arity_checked() {
        let any = AnyNode::Sequence(vec![AnyNode::Token(Token::synthetic(TokenKind::Comma))]);
        let err = <(Token, Token)>::from_any(any).unwrap_err();
        assert_eq!(err, ConstructionError::SequenceArity { expected: 2, found: 1 });
    }

    #[test]
    fn test_optional_round_trip() {
        let slot = NodeOptional::present(Token::ident("x"));
        let back = NodeOptional::<Token>::from_any(slot.clone().into_any()).unwrap();
        assert_eq!(back, slot);

        let empty = NodeOptional::<Token>::from_any(AnyNode::Optional(None)).unwrap();
        assert!(!empty.is_present());
    }

    #[test]
    fn test_non_empty_list_rejects_empty() {
        let err = NonEmptyList::<Token>::from_any(AnyNode::List(vec![])).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::Mismatch {
                expected: "non-empty list of token".to_string(),
                found: "empty list",
            }
        );

        let one = AnyNode::List(vec![AnyNode::Token(Token::ident("a"))]);
        let list = NonEmptyList::<Token>::from_any(one.clone()).unwrap();
        assert_eq!(list.size(), 1);
        assert_eq!(list.into_any(), one);
    }

    #[test]
    fn test_list_element_mismatch() {
        let any = AnyNode::List(vec![
            AnyNode::Token(Token::ident("a")),
            AnyNode::Sequence(vec![]),
        ]);
        assert!(matches!(
            NodeList::<Token>::from_any(any),
            Err(ConstructionError::Mismatch { found: "sequence", .. })
        ));
    }
}
