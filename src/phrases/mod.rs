//! Occurrences of patterns in the corpus
//!
//! A [`MatchedHierarchicalPhrases`] stores every occurrence of one pattern
//! as a flat array of run start positions (one stride per occurrence, one
//! entry per terminal run) plus the sentence of each occurrence. Run ends
//! are recovered from the pattern's run lengths, so nothing else is stored.
//!
//! Lists are kept sorted lexicographically by their run-start vectors. As
//! sentences occupy increasing position ranges this also sorts them by
//! sentence, which the merge-join in [`intersect`] depends on.

pub mod intersect;

pub use intersect::{IntersectLimits, compare, query_intersect};

use crate::corpus::{Corpus, SentenceId};
use crate::pattern::Pattern;
use serde::Serialize;

/// One owned occurrence of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchicalPhrase {
    pub sentence_number: SentenceId,
    pub terminal_run_starts: Vec<u32>,
    pub terminal_run_ends: Vec<u32>,
}

impl HierarchicalPhrase {
    /// Corpus positions covered from the first run start to the last run end
    pub fn span(&self) -> Option<(u32, u32)> {
        Some((
            *self.terminal_run_starts.first()?,
            *self.terminal_run_ends.last()?,
        ))
    }
}

/// Borrowed view of one occurrence inside a match list
#[derive(Debug, Clone, Copy)]
pub struct PhraseRef<'a> {
    starts: &'a [u32],
    run_lengths: &'a [usize],
    sentence: SentenceId,
}

impl<'a> PhraseRef<'a> {
    #[inline]
    pub fn sentence(&self) -> SentenceId {
        self.sentence
    }

    #[inline]
    pub fn starts(&self) -> &'a [u32] {
        self.starts
    }

    #[inline]
    pub fn run_count(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn run_start(&self, run: usize) -> u32 {
        self.starts[run]
    }

    #[inline]
    pub fn run_end(&self, run: usize) -> u32 {
        self.starts[run] + self.run_lengths[run] as u32
    }

    #[inline]
    pub fn run_len(&self, run: usize) -> usize {
        self.run_lengths[run]
    }

    /// Covered corpus range, `None` for the bare gap pattern
    pub fn span(&self) -> Option<(u32, u32)> {
        let last = self.starts.len().checked_sub(1)?;
        Some((self.starts[0], self.run_end(last)))
    }

    pub fn to_owned(&self) -> HierarchicalPhrase {
        HierarchicalPhrase {
            sentence_number: self.sentence,
            terminal_run_starts: self.starts.to_vec(),
            terminal_run_ends: (0..self.run_count()).map(|r| self.run_end(r)).collect(),
        }
    }
}

/// All occurrences of one pattern, sorted by run starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedHierarchicalPhrases {
    pattern: Pattern,
    starts: Vec<u32>,
    sentences: Vec<SentenceId>,
}

impl MatchedHierarchicalPhrases {
    /// Empty list for `pattern`
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            starts: Vec::new(),
            sentences: Vec::new(),
        }
    }

    pub fn with_capacity(pattern: Pattern, capacity: usize) -> Self {
        let stride = pattern.run_count();
        Self {
            pattern,
            starts: Vec::with_capacity(capacity * stride),
            sentences: Vec::with_capacity(capacity),
        }
    }

    /// Occurrences of a contiguous pattern at the given corpus positions
    ///
    /// `positions` must be sorted ascending.
    pub fn from_positions(pattern: Pattern, positions: &[u32], corpus: &Corpus) -> Self {
        debug_assert!(pattern.is_contiguous());
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        let sentences = positions.iter().map(|&p| corpus.sentence_index(p)).collect();
        Self {
            pattern,
            starts: positions.to_vec(),
            sentences,
        }
    }

    /// Append one occurrence; callers keep the list sorted
    pub(crate) fn push(&mut self, starts: &[u32], sentence: SentenceId) {
        debug_assert_eq!(starts.len(), self.pattern.run_count());
        self.starts.extend_from_slice(starts);
        self.sentences.push(sentence);
    }

    #[inline]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Number of occurrences
    #[inline]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> PhraseRef<'_> {
        let stride = self.pattern.run_count();
        PhraseRef {
            starts: &self.starts[index * stride..(index + 1) * stride],
            run_lengths: self.pattern.run_lengths(),
            sentence: self.sentences[index],
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = PhraseRef<'_>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Same occurrences relabelled as `[X] pattern`
    pub fn copy_with_initial_gap(&self) -> Self {
        Self {
            pattern: self.pattern.with_initial_gap(),
            starts: self.starts.clone(),
            sentences: self.sentences.clone(),
        }
    }

    /// Same occurrences relabelled as `pattern [X]`
    pub fn copy_with_final_gap(&self) -> Self {
        Self {
            pattern: self.pattern.with_final_gap(),
            starts: self.starts.clone(),
            sentences: self.sentences.clone(),
        }
    }

    pub fn to_phrases(&self) -> Vec<HierarchicalPhrase> {
        self.iter().map(|p| p.to_owned()).collect()
    }

    /// Whether the list is sorted by run starts without duplicates
    pub fn is_sorted(&self) -> bool {
        let stride = self.pattern.run_count();
        if stride == 0 {
            return true;
        }
        self.starts
            .chunks_exact(stride)
            .zip(self.starts.chunks_exact(stride).skip(1))
            .all(|(a, b)| a < b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Symbol;

    #[test]
    fn test_from_positions_assigns_sentences() {
        let corpus = Corpus::from_sentences([vec![1, 2, 1], vec![1, 3]]);
        let list = MatchedHierarchicalPhrases::from_positions(
            Pattern::from_words(&[1]),
            &[0, 2, 3],
            &corpus,
        );
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(2).sentence(), 1);
        assert_eq!(list.get(1).span(), Some((2, 3)));
    }

    #[test]
    fn test_run_ends_follow_pattern() {
        let pattern = Pattern::new(vec![
            Symbol::Terminal(1),
            Symbol::Terminal(2),
            Symbol::Gap,
            Symbol::Terminal(3),
        ]);
        let mut list = MatchedHierarchicalPhrases::new(pattern);
        list.push(&[4, 9], 0);

        let phrase = list.get(0).to_owned();
        assert_eq!(phrase.terminal_run_starts, vec![4, 9]);
        assert_eq!(phrase.terminal_run_ends, vec![6, 10]);
        assert_eq!(phrase.span(), Some((4, 10)));
    }

    #[test]
    fn test_gap_copies_keep_occurrences() {
        let corpus = Corpus::from_sentences([vec![5, 6, 5]]);
        let list =
            MatchedHierarchicalPhrases::from_positions(Pattern::from_words(&[5]), &[0, 2], &corpus);

        let initial = list.copy_with_initial_gap();
        assert_eq!(initial.pattern().symbols(), &[Symbol::Gap, Symbol::Terminal(5)]);
        assert_eq!(initial.to_phrases(), list.to_phrases());

        let last = list.copy_with_final_gap();
        assert!(last.pattern().ends_with_gap());
        assert_eq!(last.len(), 2);
    }

    #[test]
    fn test_bare_gap_list() {
        let list = MatchedHierarchicalPhrases::new(Pattern::gap());
        assert!(list.is_empty());
        assert!(list.is_sorted());
    }
}
