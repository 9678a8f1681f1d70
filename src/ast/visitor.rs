//! Double-dispatch traversal.
//!
//! [`Node::accept`] routes an element to the one [`Visitor`] method for its
//! kind. The visitor method decides whether to go deeper; when it does, it
//! calls [`Node::accept_children`], which dispatches each direct child in
//! declared order and hands every result to a caller-supplied closure.
//!
//! A single generic trait covers every combination of "returns a value" and
//! "threads a context": pick `Output = ()` and/or `C = ()` for the parts a
//! pass does not need.
//!
//! | Pass shape            | Bound                         |
//! |-----------------------|-------------------------------|
//! | result + context      | `Visitor<C, Output = R>`      |
//! | result only           | `Visitor<(), Output = R>`     |
//! | context only          | `Visitor<C, Output = ()>`     |
//! | neither               | `Visitor<(), Output = ()>`    |
//!
//! [`Visitor`] has no default methods: a pass that forgets a node kind does
//! not compile. Passes that only care about a few kinds wrap a [`Walk`] in
//! [`DepthFirst`], which implements every method by folding child results.

use std::ops::ControlFlow;

use super::containers::{Choice, NodeList, NodeOptional, Sequence};
use super::grammar::c_grammar;
use super::nodes::*;
use super::token::Token;

/// Callback receiving each child's result during
/// [`Node::accept_children`]; returning `Break` skips the remaining
/// siblings.
pub type Each<'a, V, O> = dyn FnMut(&mut V, O) -> ControlFlow<()> + 'a;

/// Any element of the tree.
pub trait Node {
    /// Dispatches `self` to the visitor method for its kind.
    fn accept<C, V: Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output;

    /// Dispatches every direct child, in declared order.
    ///
    /// Tokens have no children. Lists forward to their elements, optional
    /// slots to their value when present, sequences to each element and
    /// choices to the held alternative.
    fn accept_children<C: Clone, V: Visitor<C>>(
        &self,
        visitor: &mut V,
        ctx: C,
        each: &mut Each<'_, V, V::Output>,
    ) -> ControlFlow<()>;
}

impl Node for Token {
    fn accept<C, V: Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
        visitor.visit_token(self, ctx)
    }

    fn accept_children<C: Clone, V: Visitor<C>>(
        &self,
        _visitor: &mut V,
        _ctx: C,
        _each: &mut Each<'_, V, V::Output>,
    ) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

// Boxes are transparent to traversal.
impl<N: Node> Node for Box<N> {
    fn accept<C, V: Visitor<C>>(&self, visitor: &mut V, ctx: C) -> V::Output {
        (**self).accept(visitor, ctx)
    }

    fn accept_children<C: Clone, V: Visitor<C>>(
        &self,
        visitor: &mut V,
        ctx: C,
        each: &mut Each<'_, V, V::Output>,
    ) -> ControlFlow<()> {
        (**self).accept_children(visitor, ctx, each)
    }
}

macro_rules! define_visitor {
    ($( $(#[$doc:meta])* $name:ident => $visit:ident { $($field:ident : $ty:ty $([$($allowed:ident),+])?),* $(,)? } )*) => {
        /// One operation per tree element kind.
        ///
        /// `C` is the context threaded down by the caller; `Output` is what
        /// each operation returns.
        pub trait Visitor<C = ()> {
            type Output;

            fn visit_token(&mut self, token: &Token, ctx: C) -> Self::Output;
            fn visit_list<N: Node>(&mut self, list: &NodeList<N>, ctx: C) -> Self::Output;
            fn visit_optional<N: Node>(&mut self, slot: &NodeOptional<N>, ctx: C) -> Self::Output;
            fn visit_sequence<S: Sequence>(&mut self, sequence: &S, ctx: C) -> Self::Output;
            fn visit_choice<K: Choice>(&mut self, choice: &K, ctx: C) -> Self::Output;

            $(
                $(#[$doc])*
                fn $visit(&mut self, node: &$name, ctx: C) -> Self::Output;
            )*
        }

        impl<W: Walk<C>, C: Clone> Visitor<C> for DepthFirst<W> {
            type Output = W::Output;

            fn visit_token(&mut self, token: &Token, ctx: C) -> W::Output {
                self.walker.token(token, &ctx)
            }

            fn visit_list<N: Node>(&mut self, list: &NodeList<N>, ctx: C) -> W::Output {
                self.fold_children(list, ctx)
            }

            fn visit_optional<N: Node>(&mut self, slot: &NodeOptional<N>, ctx: C) -> W::Output {
                self.fold_children(slot, ctx)
            }

            fn visit_sequence<S: Sequence>(&mut self, sequence: &S, ctx: C) -> W::Output {
                self.fold_children(sequence, ctx)
            }

            fn visit_choice<K: Choice>(&mut self, choice: &K, ctx: C) -> W::Output {
                self.fold_children(choice, ctx)
            }

            $(
                fn $visit(&mut self, node: &$name, ctx: C) -> W::Output {
                    self.visit_grammar(node, ctx)
                }
            )*
        }
    };
}

c_grammar!(define_visitor);

/// Hooks driving [`DepthFirst`].
///
/// Results are combined bottom-up: a token yields [`Walk::token`], a node
/// without children yields [`Walk::empty`], and sibling results are folded
/// left to right with [`Walk::merge`].
pub trait Walk<C = ()> {
    type Output;

    /// Result of an element with no children.
    fn empty(&mut self) -> Self::Output;

    fn token(&mut self, token: &Token, ctx: &C) -> Self::Output;

    fn merge(&mut self, acc: Self::Output, next: Self::Output) -> Self::Output;

    /// Called before a grammar node's children. `Break(out)` skips the
    /// subtree and uses `out` as its result.
    fn enter(&mut self, _node: NodeRef<'_>, _ctx: &C) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    /// Context handed to a grammar node's children.
    fn descend(&mut self, _node: NodeRef<'_>, ctx: &C) -> C
    where
        C: Clone,
    {
        ctx.clone()
    }

    /// Called with the folded result of a grammar node's children.
    fn leave(&mut self, _node: NodeRef<'_>, output: Self::Output) -> Self::Output {
        output
    }

    /// Once true for an accumulated result, remaining siblings are skipped.
    fn is_done(&self, _acc: &Self::Output) -> bool {
        false
    }
}

impl<C, W: Walk<C> + ?Sized> Walk<C> for &mut W {
    type Output = W::Output;

    fn empty(&mut self) -> W::Output {
        (**self).empty()
    }

    fn token(&mut self, token: &Token, ctx: &C) -> W::Output {
        (**self).token(token, ctx)
    }

    fn merge(&mut self, acc: W::Output, next: W::Output) -> W::Output {
        (**self).merge(acc, next)
    }

    fn enter(&mut self, node: NodeRef<'_>, ctx: &C) -> ControlFlow<W::Output> {
        (**self).enter(node, ctx)
    }

    fn descend(&mut self, node: NodeRef<'_>, ctx: &C) -> C
    where
        C: Clone,
    {
        (**self).descend(node, ctx)
    }

    fn leave(&mut self, node: NodeRef<'_>, output: W::Output) -> W::Output {
        (**self).leave(node, output)
    }

    fn is_done(&self, acc: &W::Output) -> bool {
        (**self).is_done(acc)
    }
}

/// Reference depth-first walker: visits every element, folding results with
/// the [`Walk`] hooks.
#[derive(Debug, Default)]
pub struct DepthFirst<W> {
    walker: W,
}

impl<W> DepthFirst<W> {
    pub fn new(walker: W) -> Self {
        Self { walker }
    }

    pub fn walker(&self) -> &W {
        &self.walker
    }

    pub fn walker_mut(&mut self) -> &mut W {
        &mut self.walker
    }

    pub fn into_inner(self) -> W {
        self.walker
    }

    /// Walks `node` with `ctx` as the starting context.
    pub fn run<C, N>(&mut self, node: &N, ctx: C) -> <W as Walk<C>>::Output
    where
        C: Clone,
        N: Node,
        W: Walk<C>,
    {
        node.accept(self, ctx)
    }

    fn fold_children<C, N>(&mut self, node: &N, ctx: C) -> <W as Walk<C>>::Output
    where
        C: Clone,
        N: Node,
        W: Walk<C>,
    {
        let mut acc: Option<<W as Walk<C>>::Output> = None;
        let _ = node.accept_children(self, ctx, &mut |this: &mut Self, out| {
            let merged = match acc.take() {
                Some(prev) => this.walker.merge(prev, out),
                None => out,
            };
            let done = this.walker.is_done(&merged);
            acc = Some(merged);
            if done {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        match acc {
            Some(out) => out,
            None => self.walker.empty(),
        }
    }

    fn visit_grammar<C, N>(&mut self, node: &N, ctx: C) -> <W as Walk<C>>::Output
    where
        C: Clone,
        N: GrammarNode,
        W: Walk<C>,
    {
        let node_ref = node.node_ref();
        match self.walker.enter(node_ref, &ctx) {
            ControlFlow::Break(out) => out,
            ControlFlow::Continue(()) => {
                let inner = self.walker.descend(node_ref, &ctx);
                let out = self.fold_children(node, inner);
                self.walker.leave(node_ref, out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::token::TokenKind;

    /// Exhaustive visitor written without [`DepthFirst`]; logs every
    /// grammar node and token it reaches.
    #[derive(Default)]
    struct Trace {
        log: Vec<String>,
    }

    fn recurse<N: Node>(trace: &mut Trace, node: &N) {
        let _ = node.accept_children(trace, (), &mut |_, ()| ControlFlow::Continue(()));
    }

    macro_rules! trace_visitor {
        ($( $(#[$doc:meta])* $name:ident => $visit:ident { $($field:ident : $ty:ty $([$($allowed:ident),+])?),* $(,)? } )*) => {
            impl Visitor for Trace {
                type Output = ();

                fn visit_token(&mut self, token: &Token, _: ()) {
                    self.log.push(token.text().to_string());
                }

                fn visit_list<N: Node>(&mut self, list: &NodeList<N>, _: ()) {
                    recurse(self, list);
                }

                fn visit_optional<N: Node>(&mut self, slot: &NodeOptional<N>, _: ()) {
                    recurse(self, slot);
                }

                fn visit_sequence<S: Sequence>(&mut self, sequence: &S, _: ()) {
                    recurse(self, sequence);
                }

                fn visit_choice<K: Choice>(&mut self, choice: &K, _: ()) {
                    recurse(self, choice);
                }

                $(
                    fn $visit(&mut self, node: &$name, _: ()) {
                        self.log.push(stringify!($name).to_string());
                        recurse(self, node);
                    }
                )*
            }
        };
    }

    c_grammar!(trace_visitor);

    /// Counts tokens, and stops after `limit` of them.
    struct Tokens {
        limit: usize,
    }

    impl Walk for Tokens {
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

        fn is_done(&self, acc: &usize) -> bool {
            *acc >= self.limit
        }
    }

    fn const_pointer() -> Pointer {
        Pointer::new(
            Token::synthetic(TokenKind::Star),
            NodeOptional::present(Token::synthetic(TokenKind::Const)),
            NodeOptional::present(Box::new(Pointer::with_next(None))),
        )
    }

    #[test]
    fn test_declared_order() {
        let mut trace = Trace::default();
        const_pointer().accept(&mut trace, ());
        assert_eq!(trace.log, vec!["Pointer", "*", "const", "Pointer", "*"]);
    }

    #[test]
    fn test_empty_slots_dispatch_nothing() {
        let mut trace = Trace::default();
        Array::sized(None).accept(&mut trace, ());
        assert_eq!(trace.log, vec!["Array", "[", "]"]);
    }

    #[test]
    fn test_depth_first_fold() {
        let mut walker = DepthFirst::new(Tokens { limit: usize::MAX });
        assert_eq!(walker.run(&const_pointer(), ()), 3);
    }

    #[test]
    fn test_is_done_skips_siblings() {
        let mut walker = DepthFirst::new(Tokens { limit: 2 });
        assert_eq!(walker.run(&const_pointer(), ()), 2);
    }

    #[test]
    fn test_enter_break_skips_subtree() {
        struct SkipNested {
            depth: usize,
        }

        impl Walk for SkipNested {
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

            fn enter(&mut self, node: NodeRef<'_>, _ctx: &()) -> ControlFlow<usize> {
                if matches!(node, NodeRef::Pointer(_)) {
                    self.depth += 1;
                    if self.depth > 1 {
                        return ControlFlow::Break(0);
                    }
                }
                ControlFlow::Continue(())
            }
        }

        let mut walker = DepthFirst::new(SkipNested { depth: 0 });
        assert_eq!(walker.run(&const_pointer(), ()), 2);
    }

    #[test]
    fn test_descend_threads_context() {
        /// Sums the pointer nesting depth at every token.
        struct Depths;

        impl Walk<usize> for Depths {
            type Output = usize;

            fn empty(&mut self) -> usize {
                0
            }

            fn token(&mut self, _token: &Token, depth: &usize) -> usize {
                *depth
            }

            fn merge(&mut self, acc: usize, next: usize) -> usize {
                acc + next
            }

            fn descend(&mut self, node: NodeRef<'_>, depth: &usize) -> usize {
                match node {
                    NodeRef::Pointer(_) => depth + 1,
                    _ => *depth,
                }
            }
        }

        let mut depths = Depths;
        let total = DepthFirst::new(&mut depths).run(&const_pointer(), 0usize);
        // `*` and `const` at depth 1, the nested `*` at depth 2.
        assert_eq!(total, 4);
    }
}
