//! Token counting.

use crate::ast::{DepthFirst, Node, Token, Walk};

/// Counts the token leaves below an element.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenCounter;

impl Walk for TokenCounter {
    type Output = usize;

    fn empty(&mut self) -> usize {
        0
    }

    fn token(&mut self, _token: &Token, _ctx: &()) -> usize {
        1
    }

    fn merge(&mut self, acc: usize, next: usize) -> usize {
        acc + next
    }
}

/// Number of tokens `node` was built from.
pub fn count_tokens<N: Node>(node: &N) -> usize {
    DepthFirst::new(TokenCounter).run(node, ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Array, Pointer};
    use crate::parser::parse;

    #[test]
    fn test_counts_every_token() {
        let unit = parse("int f(int x) { return x; }").unwrap();
        assert_eq!(count_tokens(&unit), 11);
    }

    #[test]
    fn test_empty_slots_count_nothing() {
        assert_eq!(count_tokens(&Array::sized(None)), 2);
        assert_eq!(count_tokens(&Pointer::with_next(Some(Pointer::with_next(None)))), 2);
    }
}
