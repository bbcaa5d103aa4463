//! Construction of the prefix tree
//!
//! Work items are `(start, end, node, pattern)`: the sentence tokens
//! `start..end` have been consumed to reach `node`, whose pattern is
//! `pattern`, and the token at `end` is the next one to append. Items are
//! processed first in, first out. Every node whose pattern starts with a
//! terminal is reached from a seed at the root and every node whose pattern
//! starts with a gap from a seed at the bare gap node; the root seeds are
//! queued first, so a node's suffix-link target always exists by the time
//! the node itself is created.

use super::PrefixTree;
use super::node::{Incoming, Node, NodeId, child_in};
use crate::config::ExtractionConfig;
use crate::corpus::WordId;
use crate::error::{ExtractError, Result};
use crate::index::suffix_array::SuffixArray;
use crate::pattern::{Pattern, Symbol};
use crate::phrases::{IntersectLimits, MatchedHierarchicalPhrases, query_intersect};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

struct WorkItem {
    start: usize,
    end: usize,
    node: NodeId,
    pattern: Pattern,
}

pub(super) struct TreeBuilder<'a> {
    sa: &'a SuffixArray,
    sentence: &'a [WordId],
    config: ExtractionConfig,
    limits: IntersectLimits,
    nodes: Vec<Node>,
    queue: VecDeque<WorkItem>,
}

impl<'a> TreeBuilder<'a> {
    pub(super) fn new(
        sa: &'a SuffixArray,
        sentence: &'a [WordId],
        config: ExtractionConfig,
    ) -> Result<Self> {
        config.validate()?;

        let bot = Node::new(Incoming::Bot, Pattern::empty(), None);
        let mut root = Node::new(Incoming::Root, Pattern::empty(), Some(NodeId::BOT));
        root.range = sa.full_range();

        Ok(Self {
            sa,
            sentence,
            limits: config.intersect_limits(),
            config,
            nodes: vec![bot, root],
            queue: VecDeque::new(),
        })
    }

    pub(super) fn run(mut self) -> Result<PrefixTree> {
        let started = Instant::now();
        let n = self.sentence.len();
        let min_gap = self.config.min_nonterminal_span;

        for i in 0..n {
            self.queue.push_back(WorkItem {
                start: i,
                end: i,
                node: NodeId::ROOT,
                pattern: Pattern::empty(),
            });
        }

        if self.config.max_nonterminals > 0 {
            let xnode = self.add_child(NodeId::ROOT, Symbol::Gap, Pattern::gap())?;
            self.nodes[xnode.index()].matches =
                Some(Arc::new(MatchedHierarchicalPhrases::new(Pattern::gap())));

            // A pattern may also open with a gap of at least `min_gap` tokens.
            if self.config.max_phrase_length >= 2 && min_gap < self.config.max_phrase_span {
                for i in min_gap..n {
                    self.queue.push_back(WorkItem {
                        start: i - min_gap,
                        end: i,
                        node: xnode,
                        pattern: Pattern::gap(),
                    });
                }
            }
        }

        while let Some(item) = self.queue.pop_front() {
            self.process(item)?;
        }

        let active = self.nodes.iter().filter(|n| n.active).count();
        log::debug!(
            "prefix tree for {} words: {} nodes, {} active, built in {:?}",
            n,
            self.nodes.len() - 1,
            active,
            started.elapsed()
        );

        Ok(PrefixTree {
            nodes: self.nodes,
            sentence: self.sentence.to_vec(),
            config: self.config,
        })
    }

    fn process(&mut self, item: WorkItem) -> Result<()> {
        let WorkItem {
            start,
            end,
            node,
            pattern,
        } = item;

        let Some(&word) = self.sentence.get(end) else {
            return Ok(());
        };
        let symbol = Symbol::Terminal(word);
        let extended = pattern.extend(symbol);

        if let Some(&child) = self.nodes[node.index()].children.get(&symbol) {
            if !self.nodes[child.index()].active {
                return Ok(());
            }
            return self.extend_queue(start, end, child, extended);
        }

        let child = self.add_child(node, symbol, extended.clone())?;
        let link = self.link_of(child, &extended)?;

        if !self.nodes[link.index()].active {
            self.nodes[child.index()].active = false;
            log::trace!("'{}' pruned by inactive suffix link", extended);
            return Ok(());
        }

        let matches = self.query(&extended, child, node, link)?;
        if matches.is_empty() {
            self.nodes[child.index()].active = false;
            log::trace!("'{}' has no occurrences", extended);
            return Ok(());
        }

        log::trace!("'{}' has {} occurrences", extended, matches.len());
        self.nodes[child.index()].matches = Some(matches);
        self.extend_queue(start, end, child, extended)
    }

    /// Queue the continuations of `pattern`, which was just matched at `start..=end`
    fn extend_queue(
        &mut self,
        start: usize,
        end: usize,
        node: NodeId,
        pattern: Pattern,
    ) -> Result<()> {
        let n = self.sentence.len();
        let max_span = self.config.max_phrase_span;
        let min_gap = self.config.min_nonterminal_span;

        if pattern.len() >= self.config.max_phrase_length || end + 1 >= n {
            return Ok(());
        }

        let gap_fits = pattern.arity() < self.config.max_nonterminals
            && end + min_gap < n
            && end + min_gap + 1 - start <= max_span;

        if end + 2 - start <= max_span {
            self.queue.push_back(WorkItem {
                start,
                end: end + 1,
                node,
                pattern: pattern.clone(),
            });
        }

        if gap_fits {
            let gap_child = self.ensure_gap_child(node, &pattern)?;

            if pattern.len() + 2 <= self.config.max_phrase_length {
                let gap_pattern = self.nodes[gap_child.index()].pattern.clone();
                let last = (n - 1).min(start + max_span - 1);
                for next in (end + 1 + min_gap)..=last {
                    self.queue.push_back(WorkItem {
                        start,
                        end: next,
                        node: gap_child,
                        pattern: gap_pattern.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Gap child of `node`, whose occurrences are those of `node` itself
    fn ensure_gap_child(&mut self, node: NodeId, pattern: &Pattern) -> Result<NodeId> {
        let gap_child = match self.nodes[node.index()].children.get(&Symbol::Gap) {
            Some(&id) => id,
            None => self.add_child(node, Symbol::Gap, pattern.with_final_gap())?,
        };

        self.nodes[gap_child.index()].active = true;

        if self.nodes[gap_child.index()].matches.is_none() {
            let parent = self.matches_of(node)?;
            let gap_pattern = self.nodes[gap_child.index()].pattern.clone();
            let matches = self
                .sa
                .cache()
                .get_or_compute(&gap_pattern, self.limits, || Ok(parent.copy_with_final_gap()))?;
            self.nodes[gap_child.index()].matches = Some(matches);
        }

        Ok(gap_child)
    }

    /// Occurrences of `pattern`, the pattern of the new node `node`
    fn query(
        &mut self,
        pattern: &Pattern,
        node: NodeId,
        parent: NodeId,
        link: NodeId,
    ) -> Result<Arc<MatchedHierarchicalPhrases>> {
        let sa = self.sa;
        let cache = sa.cache();

        if pattern.is_contiguous() {
            let words: Vec<WordId> = pattern.symbols().iter().filter_map(|s| s.word()).collect();
            let range = self.nodes[parent.index()]
                .range
                .and_then(|within| sa.find_phrase(&words, within));
            self.nodes[node.index()].range = range;

            let Some(found) = range else {
                return Ok(Arc::new(MatchedHierarchicalPhrases::new(pattern.clone())));
            };
            // Lists below the threshold never enter the memo.
            if found.len() < self.config.cache_precomputation_frequency_threshold {
                return Ok(Arc::new(sa.contiguous_matches(pattern, range)));
            }
            return cache.get_or_compute(pattern, self.limits, || {
                Ok(sa.contiguous_matches(pattern, range))
            });
        }

        if self.nodes[parent.index()].pattern.symbols() == [Symbol::Gap] {
            let suffix = self.matches_of(link)?;
            return cache.get_or_compute(pattern, self.limits, || Ok(suffix.copy_with_initial_gap()));
        }

        let prefix = self.matches_of(parent)?;
        let suffix = self.matches_of(link)?;
        let limits = self.limits;
        cache.get_or_compute(pattern, limits, || {
            query_intersect(pattern, &prefix, &suffix, limits)
        })
    }

    fn matches_of(&self, id: NodeId) -> Result<Arc<MatchedHierarchicalPhrases>> {
        let node = &self.nodes[id.index()];
        node.matches
            .clone()
            .ok_or_else(|| ExtractError::MissingMatches {
                pattern: node.pattern.clone(),
            })
    }

    fn link_of(&self, id: NodeId, pattern: &Pattern) -> Result<NodeId> {
        self.nodes[id.index()]
            .suffix_link
            .ok_or_else(|| ExtractError::MissingSuffixLink {
                pattern: pattern.clone(),
            })
    }

    /// Create the child of `parent` for `symbol` and resolve its suffix link
    fn add_child(&mut self, parent: NodeId, symbol: Symbol, pattern: Pattern) -> Result<NodeId> {
        let parent_node = &self.nodes[parent.index()];
        if parent_node.children.contains_key(&symbol) {
            return Err(ExtractError::DuplicateChild {
                pattern: parent_node.pattern.clone(),
                symbol,
            });
        }

        let link = parent_node
            .suffix_link
            .and_then(|parent_link| child_in(&self.nodes, parent_link, symbol))
            .ok_or_else(|| ExtractError::MissingSuffixLink {
                pattern: pattern.clone(),
            })?;

        let id = NodeId(self.nodes.len() as u32);
        self.nodes
            .push(Node::new(Incoming::Edge(symbol), pattern, Some(link)));
        self.nodes[parent.index()].children.insert(symbol, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::corpus::Corpus;

    fn suffix_array(sentences: &[Vec<WordId>]) -> SuffixArray {
        SuffixArray::from_corpus(
            Arc::new(Corpus::from_sentences(sentences)),
            &IndexConfig::default(),
        )
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let sa = suffix_array(&[vec![1]]);
        let mut builder = TreeBuilder::new(&sa, &[1], ExtractionConfig::default()).unwrap();
        builder
            .add_child(NodeId::ROOT, Symbol::Terminal(1), Pattern::from_words(&[1]))
            .unwrap();
        let again =
            builder.add_child(NodeId::ROOT, Symbol::Terminal(1), Pattern::from_words(&[1]));
        assert!(matches!(again, Err(ExtractError::DuplicateChild { .. })));
    }

    #[test]
    fn test_missing_link_target_rejected() {
        let sa = suffix_array(&[vec![1, 2]]);
        let mut builder = TreeBuilder::new(&sa, &[1, 2], ExtractionConfig::default()).unwrap();
        let one = builder
            .add_child(NodeId::ROOT, Symbol::Terminal(1), Pattern::from_words(&[1]))
            .unwrap();
        // The node for "2" does not exist yet, so "1 2" has no link target.
        let result =
            builder.add_child(one, Symbol::Terminal(2), Pattern::from_words(&[1, 2]));
        assert!(matches!(result, Err(ExtractError::MissingSuffixLink { .. })));
    }

    #[test]
    fn test_unigram_links_to_root() {
        let sa = suffix_array(&[vec![1]]);
        let mut builder = TreeBuilder::new(&sa, &[1], ExtractionConfig::default()).unwrap();
        let one = builder
            .add_child(NodeId::ROOT, Symbol::Terminal(1), Pattern::from_words(&[1]))
            .unwrap();
        assert_eq!(builder.nodes[one.index()].suffix_link, Some(NodeId::ROOT));
    }

    #[test]
    fn test_frequent_contiguous_lists_are_memoized() {
        let sa = suffix_array(&[vec![1, 1, 1]]);
        let config = ExtractionConfig {
            cache_precomputation_frequency_threshold: 2,
            max_nonterminals: 0,
            ..Default::default()
        };
        PrefixTree::build(&sa, &[1, 1], &config).unwrap();

        let limits = config.intersect_limits();
        assert!(sa.cache().get(&Pattern::from_words(&[1]), limits).is_some());
        assert!(sa.cache().get(&Pattern::from_words(&[1, 1]), limits).is_some());
        assert!(sa.cache().get(&Pattern::from_words(&[1, 1, 1]), limits).is_none());
    }

    #[test]
    fn test_rare_contiguous_lists_skip_memo() {
        let sa = suffix_array(&[vec![1, 2, 3], vec![2, 3]]);
        let config = ExtractionConfig {
            max_nonterminals: 0,
            ..Default::default()
        };
        PrefixTree::build(&sa, &[1, 2, 3], &config).unwrap();

        let stats = sa.cache_stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.entries, 0);
    }
}
