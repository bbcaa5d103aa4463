//! Tree nodes and the read-only views handed to downstream consumers

use super::PrefixTree;
use crate::index::suffix_array::SuffixRange;
use crate::pattern::{Pattern, Symbol};
use crate::phrases::MatchedHierarchicalPhrases;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel whose child for every symbol is the root
    pub const BOT: NodeId = NodeId(0);
    pub const ROOT: NodeId = NodeId(1);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Label of the edge leading into a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incoming {
    Bot,
    Root,
    Edge(Symbol),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) incoming: Incoming,
    pub(crate) children: FxHashMap<Symbol, NodeId>,
    /// Node for this pattern minus its first symbol; never owning
    pub(crate) suffix_link: Option<NodeId>,
    pub(crate) active: bool,
    pub(crate) range: Option<SuffixRange>,
    pub(crate) pattern: Pattern,
    pub(crate) matches: Option<Arc<MatchedHierarchicalPhrases>>,
}

impl Node {
    pub(crate) fn new(incoming: Incoming, pattern: Pattern, suffix_link: Option<NodeId>) -> Self {
        Self {
            incoming,
            children: FxHashMap::default(),
            suffix_link,
            active: true,
            range: None,
            pattern,
            matches: None,
        }
    }
}

/// Child of `id` for `symbol`; the bottom sentinel leads to the root for any symbol
#[inline]
pub(crate) fn child_in(nodes: &[Node], id: NodeId, symbol: Symbol) -> Option<NodeId> {
    if id == NodeId::BOT {
        return Some(NodeId::ROOT);
    }
    nodes[id.index()].children.get(&symbol).copied()
}

/// Single-step trie descent, as used by a decoder walking a sentence
///
/// Only active children are visible.
pub trait TrieStep: Sized {
    fn has_child(&self, symbol: Symbol) -> bool;
    fn child(&self, symbol: Symbol) -> Option<Self>;
}

/// Which sentence spans a grammar will answer for
pub trait SpanPolicy {
    fn has_rule_for_span(&self, start: usize, end: usize, path_length: usize) -> bool;
}

/// Borrowed handle to one node of a [`PrefixTree`]
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    pub(crate) tree: &'t PrefixTree,
    pub(crate) id: NodeId,
}

impl<'t> NodeRef<'t> {
    #[inline]
    fn node(&self) -> &'t Node {
        &self.tree.nodes[self.id.index()]
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn incoming(&self) -> Incoming {
        self.node().incoming
    }

    pub fn pattern(&self) -> &'t Pattern {
        &self.node().pattern
    }

    pub fn is_active(&self) -> bool {
        self.node().active
    }

    /// Suffix-array range of a contiguous pattern found in the corpus
    pub fn corpus_range(&self) -> Option<SuffixRange> {
        self.node().range
    }

    pub fn suffix_link(&self) -> Option<NodeRef<'t>> {
        self.node().suffix_link.map(|id| self.tree.node(id))
    }

    /// Whether this node carries at least one occurrence
    pub fn has_rules(&self) -> bool {
        self.node().matches.as_ref().is_some_and(|m| !m.is_empty())
    }

    pub fn matches(&self) -> Option<&'t MatchedHierarchicalPhrases> {
        self.node().matches.as_deref()
    }

    /// Shared handle to the match list, for use after the tree is dropped
    pub fn shared_matches(&self) -> Option<Arc<MatchedHierarchicalPhrases>> {
        self.node().matches.clone()
    }

    /// Every child, active or not, ordered by symbol
    pub fn children(&self) -> Vec<(Symbol, NodeRef<'t>)> {
        let mut children: Vec<_> = self
            .node()
            .children
            .iter()
            .map(|(&symbol, &id)| (symbol, self.tree.node(id)))
            .collect();
        children.sort_unstable_by_key(|(symbol, _)| *symbol);
        children
    }

    /// Number of nodes in the subtree rooted here, this one included
    pub fn size(&self) -> usize {
        if self.id == NodeId::BOT {
            return 1;
        }
        let mut count = 0;
        let mut stack = vec![self.id];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.tree.nodes[id.index()].children.values().copied());
        }
        count
    }

    /// Follow a sequence of symbols through active children
    pub fn match_prefix(&self, symbols: &[Symbol]) -> Option<NodeRef<'t>> {
        symbols
            .iter()
            .try_fold(*self, |node, &symbol| node.child(symbol))
    }
}

impl TrieStep for NodeRef<'_> {
    fn has_child(&self, symbol: Symbol) -> bool {
        self.child(symbol).is_some()
    }

    fn child(&self, symbol: Symbol) -> Option<Self> {
        let id = self.tree.child_of(self.id, symbol)?;
        let child = self.tree.node(id);
        child.is_active().then_some(child)
    }
}

impl SpanPolicy for NodeRef<'_> {
    fn has_rule_for_span(&self, start: usize, end: usize, path_length: usize) -> bool {
        self.tree.has_rule_for_span(start, end, path_length)
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("pattern", &self.pattern().to_string())
            .field("active", &self.is_active())
            .finish()
    }
}
