//! Node kind histogram.

use std::fmt;
use std::ops::ControlFlow;

use rustc_hash::FxHashMap;

use crate::ast::{DepthFirst, Node, NodeKind, NodeRef, Token, Walk};

/// How many nodes of each kind, and how many tokens, a tree holds.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KindHistogram {
    counts: FxHashMap<NodeKind, usize>,
    tokens: usize,
}

impl KindHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn tokens(&self) -> usize {
        self.tokens
    }

    /// Grammar nodes of all kinds.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Kinds that occur at least once, in grammar order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeKind, usize)> + '_ {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, n)| (*k, *n)).collect();
        entries.sort_unstable();
        entries.into_iter()
    }
}

impl Walk for KindHistogram {
    type Output = ();

    fn empty(&mut self) {}

    fn token(&mut self, _token: &Token, _ctx: &()) {
        self.tokens += 1;
    }

    fn merge(&mut self, _acc: (), _next: ()) {}

    fn enter(&mut self, node: NodeRef<'_>, _ctx: &()) -> ControlFlow<()> {
        *self.counts.entry(node.kind()).or_insert(0) += 1;
        ControlFlow::Continue(())
    }
}

impl fmt::Display for KindHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, count) in self.iter() {
            writeln!(f, "{:<32} {:>6}", kind.name(), count)?;
        }
        write!(f, "{:<32} {:>6}", "(tokens)", self.tokens)
    }
}

/// Counts the node kinds below `node`, `node` included.
pub fn histogram<N: Node>(node: &N) -> KindHistogram {
    let mut walker = DepthFirst::new(KindHistogram::new());
    walker.run(node, ());
    walker.into_inner()
}
