//! Suffix-linked prefix tree of one query sentence
//!
//! Every root-to-node path spells a pattern (terminals and gaps) that can be
//! read off the sentence within the configured limits. Each node links to
//! the node for its pattern minus the first symbol, the same failure link an
//! Aho-Corasick automaton uses. Because a pattern cannot occur more often
//! than its suffix, a node whose link is inactive is inactive too, and its
//! whole subtree is never explored.
//!
//! Nodes live in one arena owned by the tree and are addressed by
//! [`NodeId`]; links are plain indices, so dropping the tree frees
//! everything at once. Match lists are reference counted because the
//! pattern cache of the [`SuffixArray`] may share them with other trees.

mod builder;
mod node;

pub use node::{Incoming, NodeId, NodeRef, SpanPolicy, TrieStep};

use crate::config::ExtractionConfig;
use crate::corpus::{Vocabulary, WordId};
use crate::error::Result;
use crate::index::suffix_array::SuffixArray;
use crate::pattern::Symbol;
use node::Node;
use std::fmt::Write;

/// Prefix tree with its match lists for one sentence
pub struct PrefixTree {
    nodes: Vec<Node>,
    sentence: Vec<WordId>,
    config: ExtractionConfig,
}

impl PrefixTree {
    /// Build the tree for `sentence`, querying `sa` for every reachable pattern
    pub fn build(sa: &SuffixArray, sentence: &[WordId], config: &ExtractionConfig) -> Result<Self> {
        builder::TreeBuilder::new(sa, sentence, *config)?.run()
    }

    #[inline]
    pub fn root(&self) -> NodeRef<'_> {
        self.node(NodeId::ROOT)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Number of nodes reachable from the root, root included
    pub fn size(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn sentence(&self) -> &[WordId] {
        &self.sentence
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Every node except the bottom sentinel, in creation order
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (NodeId::ROOT.0..self.nodes.len() as u32).map(move |i| self.node(NodeId(i)))
    }

    /// Child of `id` for `symbol`, whether active or not
    pub(crate) fn child_of(&self, id: NodeId, symbol: Symbol) -> Option<NodeId> {
        node::child_in(&self.nodes, id, symbol)
    }

    /// Grammar lookups are answered for spans no wider than `span_limit`
    pub fn has_rule_for_span(&self, start: usize, end: usize, _path_length: usize) -> bool {
        end.saturating_sub(start) <= self.config.span_limit
    }

    /// Indented dump of the tree for debugging
    pub fn to_tree_string(&self, vocab: Option<&Vocabulary>) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];

        while let Some((node, depth)) = stack.pop() {
            let label = match node.incoming() {
                Incoming::Root => "ROOT".to_string(),
                Incoming::Bot => "BOT".to_string(),
                Incoming::Edge(symbol) => match vocab {
                    Some(vocab) => symbol.display_with(vocab).into_owned(),
                    None => symbol.to_string(),
                },
            };
            let count = node.matches().map_or(0, |m| m.len());
            let state = if node.is_active() { "" } else { " (inactive)" };
            let _ = writeln!(out, "{:indent$}{label} [{count}]{state}", "", indent = depth * 2);

            for (_, child) in node.children().into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        out
    }
}

impl SpanPolicy for PrefixTree {
    fn has_rule_for_span(&self, start: usize, end: usize, path_length: usize) -> bool {
        PrefixTree::has_rule_for_span(self, start, end, path_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::corpus::Corpus;
    use crate::pattern::Pattern;
    use std::sync::Arc;

    fn suffix_array(sentences: &[Vec<WordId>]) -> SuffixArray {
        SuffixArray::from_corpus(
            Arc::new(Corpus::from_sentences(sentences)),
            &IndexConfig::default(),
        )
    }

    #[test]
    fn test_empty_sentence() {
        let sa = suffix_array(&[vec![1, 2, 3]]);
        let tree = PrefixTree::build(&sa, &[], &ExtractionConfig::default()).unwrap();

        // Root plus the bare gap node
        assert_eq!(tree.size(), 2);
        assert!(tree.root().is_active());
        assert!(!tree.root().has_rules());
    }

    #[test]
    fn test_no_gaps_when_disabled() {
        let sa = suffix_array(&[vec![1, 2, 3]]);
        let config = ExtractionConfig {
            max_nonterminals: 0,
            ..Default::default()
        };
        let tree = PrefixTree::build(&sa, &[1, 2, 3], &config).unwrap();

        assert!(tree.nodes().all(|n| n.pattern().arity() == 0));
        // root, 1, 2, 3, 1 2, 2 3, 1 2 3
        assert_eq!(tree.size(), 7);
    }

    #[test]
    fn test_root_suffix_link_is_bot() {
        let sa = suffix_array(&[vec![1, 2]]);
        let tree = PrefixTree::build(&sa, &[1, 2], &ExtractionConfig::default()).unwrap();

        let bot = tree.root().suffix_link().unwrap();
        assert_eq!(bot.id(), NodeId::BOT);
        assert_eq!(bot.child(Symbol::Terminal(7)).map(|n| n.id()), Some(NodeId::ROOT));
    }

    #[test]
    fn test_child_hides_inactive_nodes() {
        let sa = suffix_array(&[vec![1, 2]]);
        let tree = PrefixTree::build(&sa, &[1, 9], &ExtractionConfig::default()).unwrap();

        let root = tree.root();
        assert!(root.has_child(Symbol::Terminal(1)));
        assert!(!root.has_child(Symbol::Terminal(9)));
        assert!(
            root.children()
                .iter()
                .any(|(s, n)| *s == Symbol::Terminal(9) && !n.is_active())
        );
    }

    #[test]
    fn test_match_prefix() {
        let sa = suffix_array(&[vec![1, 5, 2]]);
        let tree = PrefixTree::build(&sa, &[1, 7, 2], &ExtractionConfig::default()).unwrap();

        let node = tree
            .root()
            .match_prefix(&[Symbol::Terminal(1), Symbol::Gap, Symbol::Terminal(2)])
            .unwrap();
        assert_eq!(
            node.pattern(),
            &Pattern::new(vec![Symbol::Terminal(1), Symbol::Gap, Symbol::Terminal(2)])
        );
        assert_eq!(node.matches().unwrap().len(), 1);
    }

    #[test]
    fn test_span_policy() {
        let sa = suffix_array(&[vec![1]]);
        let config = ExtractionConfig {
            span_limit: 3,
            ..Default::default()
        };
        let tree = PrefixTree::build(&sa, &[1], &config).unwrap();

        assert!(tree.root().has_rule_for_span(0, 3, 1));
        assert!(!tree.root().has_rule_for_span(0, 4, 1));
    }

    #[test]
    fn test_tree_string() {
        let mut vocab = Vocabulary::new();
        let words = vocab.intern_line("a b");
        let sa = suffix_array(&[words.clone()]);
        let tree = PrefixTree::build(&sa, &words, &ExtractionConfig::default()).unwrap();

        let dump = tree.to_tree_string(Some(&vocab));
        assert!(dump.starts_with("ROOT [0]\n"));
        assert!(dump.contains("  a [1]\n"));
        assert!(dump.contains("    b [1]\n"));
    }

    #[test]
    fn test_invalid_config_aborts() {
        let sa = suffix_array(&[vec![1]]);
        let config = ExtractionConfig {
            max_phrase_length: 0,
            ..Default::default()
        };
        assert!(PrefixTree::build(&sa, &[1], &config).is_err());
    }
}
