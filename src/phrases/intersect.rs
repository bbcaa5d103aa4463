//! Merge-join of two match lists
//!
//! Given the occurrences of `aα` (the parent pattern) and of `αb` (the
//! suffix-link pattern), the occurrences of `aαb` are exactly the pairs that
//! agree on where α sits and whose combined extent fits in the span limit.
//! Both lists are sorted by run starts, so the pairs can be found with two
//! cursors instead of rescanning the corpus.

use super::{MatchedHierarchicalPhrases, PhraseRef};
use crate::error::{ExtractError, Result};
use crate::pattern::Pattern;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Limits that decide whether two partial occurrences may be joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntersectLimits {
    pub max_phrase_span: usize,
    pub min_nonterminal_span: usize,
}

impl Default for IntersectLimits {
    fn default() -> Self {
        crate::config::ExtractionConfig::default().intersect_limits()
    }
}

fn mismatch(a: &Pattern, b: &Pattern, reason: &'static str) -> ExtractError {
    ExtractError::MismatchedPhrases {
        prefix: a.clone(),
        suffix: b.clone(),
        reason,
    }
}

/// `aX` joined with `Xb`: the two halves only share a gap
#[inline]
fn joins_across_gap(a_pattern: &Pattern, b_pattern: &Pattern) -> bool {
    a_pattern.ends_with_gap()
        && b_pattern.starts_with_gap()
        && a_pattern.arity() == 1
        && b_pattern.arity() == 1
        && a_pattern.run_lengths().first() == Some(&1)
        && b_pattern.run_lengths().first() == Some(&1)
}

/// Order an occurrence of `aα` against an occurrence of `αb`
///
/// `Equal` means the two combine into an occurrence of `aαb`. `Less` means
/// `b` lies beyond anything `a` can join with, `Greater` that it lies before.
pub fn compare(
    a: &PhraseRef<'_>,
    a_pattern: &Pattern,
    b: &PhraseRef<'_>,
    b_pattern: &Pattern,
    limits: IntersectLimits,
) -> Result<Ordering> {
    if a.run_count() == 0 || b.run_count() == 0 {
        return Err(mismatch(a_pattern, b_pattern, "pattern without terminals"));
    }

    match a.sentence().cmp(&b.sentence()) {
        Ordering::Equal => {}
        other => return Ok(other),
    }

    let max_span = limits.max_phrase_span as u64;
    let min_gap = limits.min_nonterminal_span as u64;
    let a0 = a.run_start(0) as u64;
    let b0 = b.run_start(0) as u64;

    if a0 > b0 {
        return Ok(Ordering::Greater);
    }
    if a0 + max_span <= b0 {
        return Ok(Ordering::Less);
    }

    if joins_across_gap(a_pattern, b_pattern) {
        return Ok(if a0 + 1 + min_gap > b0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        });
    }

    // Where α's runs start, as seen from each side.
    let a_starts = a.starts();
    let (a_head, a_tail) = if a_pattern.starts_with_gap() {
        (None, a_starts)
    } else if a_pattern.starts_with_two_terminals() {
        (Some(a_starts[0] + 1), &a_starts[1..])
    } else {
        (None, &a_starts[1..])
    };

    let b_starts = b.starts();
    let b_alpha = if b_pattern.ends_with_gap() || b_pattern.ends_with_two_terminals() {
        b_starts
    } else {
        &b_starts[..b_starts.len() - 1]
    };

    if a_head.is_some() as usize + a_tail.len() != b_alpha.len() {
        return Err(mismatch(a_pattern, b_pattern, "shared part has different run counts"));
    }

    let order = a_head
        .into_iter()
        .chain(a_tail.iter().copied())
        .cmp(b_alpha.iter().copied());
    if order != Ordering::Equal {
        return Ok(order);
    }

    let last = b.run_count() - 1;
    let mut length = b.run_end(last) as u64 - a0;
    if b_pattern.ends_with_gap() {
        length += min_gap;
    }
    if a_pattern.starts_with_gap() {
        length += min_gap;
    }

    Ok(if length > max_span {
        Ordering::Less
    } else {
        Ordering::Equal
    })
}

/// Occurrences of `pattern` from those of its prefix and its suffix
///
/// `prefix` must hold the matches of `pattern` without its last symbol and
/// `suffix` those of `pattern` without its first symbol.
pub fn query_intersect(
    pattern: &Pattern,
    prefix: &MatchedHierarchicalPhrases,
    suffix: &MatchedHierarchicalPhrases,
    limits: IntersectLimits,
) -> Result<MatchedHierarchicalPhrases> {
    let a_pattern = prefix.pattern();
    let b_pattern = suffix.pattern();

    if pattern.len() < 2 {
        return Err(mismatch(a_pattern, b_pattern, "target pattern too short"));
    }
    if a_pattern.symbols() != &pattern.symbols()[..pattern.len() - 1] {
        return Err(mismatch(a_pattern, b_pattern, "prefix is not the parent pattern"));
    }
    if b_pattern.symbols() != &pattern.symbols()[1..] {
        return Err(mismatch(a_pattern, b_pattern, "suffix is not the suffix-link pattern"));
    }
    if a_pattern.run_count() == 0 || b_pattern.run_count() == 0 {
        return Err(mismatch(a_pattern, b_pattern, "pattern without terminals"));
    }

    let mut result = MatchedHierarchicalPhrases::new(pattern.clone());
    if prefix.is_empty() || suffix.is_empty() {
        return Ok(result);
    }

    let adds_run = a_pattern.ends_with_gap();
    let mut joined = Vec::with_capacity(pattern.run_count());
    let mut j = 0;

    for i in 0..prefix.len() {
        let a = prefix.get(i);
        let a0 = a.run_start(0);

        // Nothing starting before `a` can join with it, nor with any later `a`.
        while j < suffix.len() && suffix.get(j).run_start(0) < a0 {
            j += 1;
        }

        for l in j..suffix.len() {
            let b = suffix.get(l);
            match compare(&a, a_pattern, &b, b_pattern, limits)? {
                Ordering::Equal => {
                    joined.clear();
                    joined.extend_from_slice(a.starts());
                    if adds_run {
                        joined.push(b.run_start(b.run_count() - 1));
                    }
                    result.push(&joined, a.sentence());
                }
                Ordering::Greater => {}
                Ordering::Less => break,
            }
        }
    }

    log::trace!(
        "intersect {} x {} -> {} occurrences of '{}'",
        prefix.len(),
        suffix.len(),
        result.len(),
        pattern
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::pattern::Symbol;

    const X: Symbol = Symbol::Gap;

    fn t(id: u32) -> Symbol {
        Symbol::Terminal(id)
    }

    fn limits(max_phrase_span: usize) -> IntersectLimits {
        IntersectLimits {
            max_phrase_span,
            min_nonterminal_span: 1,
        }
    }

    fn unigram(corpus: &Corpus, word: u32) -> MatchedHierarchicalPhrases {
        let positions: Vec<u32> = corpus
            .words()
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w == word)
            .map(|(p, _)| p as u32)
            .collect();
        MatchedHierarchicalPhrases::from_positions(Pattern::from_words(&[word]), &positions, corpus)
    }

    #[test]
    fn test_gap_join_respects_min_gap() {
        // 1 2 1 3 2
        let corpus = Corpus::from_sentences([vec![1, 2, 1, 3, 2]]);
        let a = unigram(&corpus, 1).copy_with_final_gap();
        let b = unigram(&corpus, 2).copy_with_initial_gap();
        let pattern = Pattern::new(vec![t(1), X, t(2)]);

        let joined = query_intersect(&pattern, &a, &b, limits(10)).unwrap();
        let starts: Vec<&[u32]> = joined.iter().map(|p| p.starts()).collect();
        // Adjacent "1 2" at 0 is not a gapped match.
        assert_eq!(starts, vec![&[0, 4][..], &[2, 4][..]]);
    }

    #[test]
    fn test_gap_join_respects_span() {
        let corpus = Corpus::from_sentences([vec![1, 9, 9, 9, 2]]);
        let a = unigram(&corpus, 1).copy_with_final_gap();
        let b = unigram(&corpus, 2).copy_with_initial_gap();
        let pattern = Pattern::new(vec![t(1), X, t(2)]);

        assert_eq!(query_intersect(&pattern, &a, &b, limits(5)).unwrap().len(), 1);
        assert!(query_intersect(&pattern, &a, &b, limits(4)).unwrap().is_empty());
    }

    #[test]
    fn test_no_join_across_sentences() {
        let corpus = Corpus::from_sentences([vec![1, 5], vec![5, 2]]);
        let a = unigram(&corpus, 1).copy_with_final_gap();
        let b = unigram(&corpus, 2).copy_with_initial_gap();
        let pattern = Pattern::new(vec![t(1), X, t(2)]);

        assert!(query_intersect(&pattern, &a, &b, limits(10)).unwrap().is_empty());
    }

    #[test]
    fn test_overlapping_join() {
        // "1 X 2 3" from "1 X 2" and "X 2 3"
        let corpus = Corpus::from_sentences([vec![1, 7, 2, 3, 1, 2, 3]]);
        let l = limits(10);
        let one_x = unigram(&corpus, 1).copy_with_final_gap();
        let x_two = unigram(&corpus, 2).copy_with_initial_gap();
        let one_x_two =
            query_intersect(&Pattern::new(vec![t(1), X, t(2)]), &one_x, &x_two, l).unwrap();

        let mut two_three = MatchedHierarchicalPhrases::new(Pattern::from_words(&[2, 3]));
        two_three.push(&[2], 0);
        two_three.push(&[5], 0);
        let x_two_three = query_intersect(
            &Pattern::new(vec![X, t(2), t(3)]),
            &x_two,
            &two_three,
            l,
        )
        .unwrap();
        assert_eq!(x_two_three.len(), 2);

        let target = Pattern::new(vec![t(1), X, t(2), t(3)]);
        let joined = query_intersect(&target, &one_x_two, &x_two_three, l).unwrap();
        let starts: Vec<&[u32]> = joined.iter().map(|p| p.starts()).collect();
        assert_eq!(starts, vec![&[0, 2][..], &[0, 5][..]]);
        assert!(joined.is_sorted());
    }

    #[test]
    fn test_scan_restarts_for_each_prefix_entry() {
        // 1 1 8 2 8 8 2 3: both 1s reach the same "2 3".
        let l = limits(10);
        let mut prefix = MatchedHierarchicalPhrases::new(Pattern::new(vec![t(1), X, t(2)]));
        prefix.push(&[0, 3], 0);
        prefix.push(&[0, 6], 0);
        prefix.push(&[1, 3], 0);
        prefix.push(&[1, 6], 0);

        let mut suffix = MatchedHierarchicalPhrases::new(Pattern::new(vec![X, t(2), t(3)]));
        suffix.push(&[6], 0);

        let target = Pattern::new(vec![t(1), X, t(2), t(3)]);
        let joined = query_intersect(&target, &prefix, &suffix, l).unwrap();
        let starts: Vec<&[u32]> = joined.iter().map(|p| p.starts()).collect();
        assert_eq!(starts, vec![&[0, 6][..], &[1, 6][..]]);
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let a = MatchedHierarchicalPhrases::new(Pattern::new(vec![t(1), X]));
        let b = MatchedHierarchicalPhrases::new(Pattern::new(vec![X, t(2)]));
        let joined =
            query_intersect(&Pattern::new(vec![t(1), X, t(2)]), &a, &b, limits(10)).unwrap();
        assert!(joined.is_empty());
        assert_eq!(joined.pattern().arity(), 1);
    }

    #[test]
    fn test_mismatched_patterns_rejected() {
        let a = MatchedHierarchicalPhrases::new(Pattern::new(vec![t(1), X]));
        let b = MatchedHierarchicalPhrases::new(Pattern::new(vec![X, t(3)]));
        let result = query_intersect(&Pattern::new(vec![t(1), X, t(2)]), &a, &b, limits(10));
        assert!(matches!(result, Err(ExtractError::MismatchedPhrases { .. })));
    }

    #[test]
    fn test_compare_orders_by_sentence() {
        let corpus = Corpus::from_sentences([vec![1, 5, 2], vec![1, 5, 2]]);
        let a = unigram(&corpus, 1).copy_with_final_gap();
        let b = unigram(&corpus, 2).copy_with_initial_gap();
        let l = limits(10);

        let order = compare(&a.get(1), a.pattern(), &b.get(0), b.pattern(), l).unwrap();
        assert_eq!(order, Ordering::Greater);
        let order = compare(&a.get(0), a.pattern(), &b.get(1), b.pattern(), l).unwrap();
        assert_eq!(order, Ordering::Less);
        let order = compare(&a.get(0), a.pattern(), &b.get(0), b.pattern(), l).unwrap();
        assert_eq!(order, Ordering::Equal);
    }
}
