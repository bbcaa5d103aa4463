//! Suffix array builder
//!
//! Builds a suffix array from tokenized sentences by:
//! 1. Appending each sentence's word ids to one corpus array
//! 2. Sorting every corpus position by the suffix that starts there, where a
//!    suffix ends at its sentence boundary
//!
//! The resulting suffix array enables O(m log n) phrase lookup.

use super::search::SuffixArray;
use super::types::*;
use crate::config::IndexConfig;
use crate::corpus::{Corpus, WordId};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;

/// Builder for constructing a suffix array from sentences
pub struct SuffixArrayBuilder {
    config: IndexConfig,
    /// Sentences accepted so far
    sentences: Vec<Vec<WordId>>,
    /// Count of excluded sentences
    excluded_count: u32,
}

impl SuffixArrayBuilder {
    /// Create a new suffix array builder with the given configuration
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            sentences: Vec::new(),
            excluded_count: 0,
        }
    }

    /// Create a builder with default configuration
    pub fn with_defaults() -> Self {
        Self::new(IndexConfig::default())
    }

    /// Add a sentence to the corpus
    ///
    /// Returns `true` if the sentence was added, `false` if it was skipped
    /// (empty or longer than `max_sentence_length`)
    pub fn add_sentence(&mut self, words: &[WordId]) -> bool {
        if !self.accepts(words.len()) {
            self.skip_sentence();
            return false;
        }

        self.sentences.push(words.to_vec());
        true
    }

    /// Whether a sentence of `len` words would be kept
    pub fn accepts(&self, len: usize) -> bool {
        len > 0 && len <= self.config.max_sentence_length
    }

    /// Count a sentence that was left out before reaching the builder
    pub fn skip_sentence(&mut self) {
        self.excluded_count += 1;
    }

    /// Get the number of sentences added
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Build the suffix array from accumulated sentences
    pub fn build(self) -> BuiltSuffixArray {
        let corpus = Corpus::from_sentences(&self.sentences);
        let suffixes = sort_suffixes(&corpus, self.config.parallel_sort_threshold);

        BuiltSuffixArray {
            corpus,
            suffixes,
            config: self.config,
            excluded_count: self.excluded_count,
        }
    }
}

/// Result of building a suffix array
pub struct BuiltSuffixArray {
    pub corpus: Corpus,
    /// Sorted suffix array (positions into the corpus)
    pub suffixes: Vec<SuffixEntry>,
    /// Configuration used for building
    pub config: IndexConfig,
    /// Number of sentences excluded
    pub excluded_count: u32,
}

impl BuiltSuffixArray {
    /// Get metadata about this suffix array
    pub fn meta(&self, vocab_size: usize) -> IndexMeta {
        IndexMeta {
            version: SA_VERSION,
            word_count: self.corpus.len() as u64,
            sentence_count: self.corpus.num_sentences() as u32,
            excluded_count: self.excluded_count,
            vocab_size: vocab_size as u32,
        }
    }

    /// Wrap into a searchable suffix array with its pattern cache
    pub fn into_suffix_array(self) -> SuffixArray {
        SuffixArray::from_parts(
            Arc::new(self.corpus),
            self.suffixes,
            self.config.cache_capacity,
        )
    }
}

/// Sort all corpus positions by their sentence-bounded suffix
///
/// Equal suffixes are ordered by position so the result is deterministic.
/// For large corpora the sort runs on the rayon pool.
pub(crate) fn sort_suffixes(corpus: &Corpus, parallel_threshold: usize) -> Vec<SuffixEntry> {
    let n = corpus.len();
    let words = corpus.words();

    // End of the enclosing sentence for every position
    let mut ends = vec![0u32; n];
    for sentence in 0..corpus.num_sentences() as u32 {
        let start = corpus.sentence_start(sentence) as usize;
        let end = corpus.sentence_end(sentence);
        ends[start..end as usize].fill(end);
    }

    let mut sa: Vec<SuffixEntry> = (0..n as SuffixEntry).collect();

    let cmp = |&a: &SuffixEntry, &b: &SuffixEntry| -> Ordering {
        let suffix_a = &words[a as usize..ends[a as usize] as usize];
        let suffix_b = &words[b as usize..ends[b as usize] as usize];
        suffix_a.cmp(suffix_b).then(a.cmp(&b))
    };

    if n > parallel_threshold {
        sa.par_sort_unstable_by(cmp);
    } else {
        sa.sort_unstable_by(cmp);
    }

    sa
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_simple() {
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_sentence(&[1, 0, 2, 0, 2, 0]);
        let built = builder.build();

        assert_eq!(built.corpus.num_sentences(), 1);
        assert_eq!(built.suffixes.len(), 6);
    }

    #[test]
    fn test_suffix_array_correctness() {
        // "banana" as b=1 a=0 n=2
        let corpus = Corpus::from_sentences([vec![1, 0, 2, 0, 2, 0]]);
        let sa = sort_suffixes(&corpus, usize::MAX);

        // 5: a
        // 3: ana
        // 1: anana
        // 0: banana
        // 4: na
        // 2: nana
        assert_eq!(sa, vec![5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn test_suffixes_stop_at_sentence_end() {
        // "7 8 | 7 8 9": the first "7 8" ends its sentence, so it sorts first.
        let corpus = Corpus::from_sentences([vec![7, 8], vec![7, 8, 9]]);
        let sa = sort_suffixes(&corpus, usize::MAX);
        assert_eq!(sa, vec![0, 2, 1, 3, 4]);
    }

    #[test]
    fn test_equal_suffixes_ordered_by_position() {
        let corpus = Corpus::from_sentences([vec![4], vec![4], vec![4]]);
        assert_eq!(sort_suffixes(&corpus, usize::MAX), vec![0, 1, 2]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sentences: Vec<Vec<u32>> = (0..50)
            .map(|s| (0..(s % 7 + 1)).map(|w| (w * 3 + s) % 5).collect())
            .collect();
        let corpus = Corpus::from_sentences(&sentences);
        assert_eq!(sort_suffixes(&corpus, 0), sort_suffixes(&corpus, usize::MAX));
    }

    #[test]
    fn test_skip_long_and_empty_sentences() {
        let mut builder = SuffixArrayBuilder::new(IndexConfig {
            max_sentence_length: 3,
            ..Default::default()
        });

        assert!(builder.add_sentence(&[1, 2]));
        assert!(!builder.add_sentence(&[1, 2, 3, 4]));
        assert!(!builder.add_sentence(&[]));

        let built = builder.build();
        assert_eq!(built.corpus.num_sentences(), 1);
        assert_eq!(built.excluded_count, 2);
        assert_eq!(built.meta(5).vocab_size, 5);
    }
}
