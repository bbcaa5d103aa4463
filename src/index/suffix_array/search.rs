//! In-memory suffix array with phrase lookup
//!
//! Provides O(m log n) search for contiguous phrases and, on top of it,
//! match lists for arbitrary gapped patterns.

use super::builder::sort_suffixes;
use super::types::*;
use crate::config::IndexConfig;
use crate::corpus::{Corpus, WordId};
use crate::error::Result;
use crate::index::cache::{CacheStats, PatternCache};
use crate::pattern::Pattern;
use crate::phrases::{IntersectLimits, MatchedHierarchicalPhrases, query_intersect};
use std::sync::Arc;

/// Corpus positions sorted by suffix, plus the shared pattern memo
pub struct SuffixArray {
    corpus: Arc<Corpus>,
    suffixes: Vec<SuffixEntry>,
    cache: PatternCache,
}

impl SuffixArray {
    /// Sort the suffixes of `corpus`
    pub fn from_corpus(corpus: Arc<Corpus>, config: &IndexConfig) -> Self {
        let suffixes = sort_suffixes(&corpus, config.parallel_sort_threshold);
        Self::from_parts(corpus, suffixes, config.cache_capacity)
    }

    /// Assemble from an already sorted suffix array
    pub(crate) fn from_parts(
        corpus: Arc<Corpus>,
        suffixes: Vec<SuffixEntry>,
        cache_capacity: usize,
    ) -> Self {
        debug_assert_eq!(corpus.len(), suffixes.len());
        Self {
            corpus,
            suffixes,
            cache: PatternCache::new(cache_capacity),
        }
    }

    #[inline]
    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    #[inline]
    pub fn suffixes(&self) -> &[SuffixEntry] {
        &self.suffixes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    #[inline]
    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Range covering every suffix, `None` for an empty corpus
    pub fn full_range(&self) -> Option<SuffixRange> {
        if self.suffixes.is_empty() {
            None
        } else {
            Some(SuffixRange::new(0, self.suffixes.len() as u32))
        }
    }

    /// Sentence-bounded suffix at suffix-array index `i`
    #[inline]
    fn suffix_at(&self, i: u32) -> &[WordId] {
        self.corpus.suffix(self.suffixes[i as usize])
    }

    /// Find the range of suffixes starting with `phrase`, searching only `within`
    ///
    /// Narrowing to the range of a known prefix of `phrase` is what keeps
    /// one-word extensions cheap.
    pub fn find_phrase(&self, phrase: &[WordId], within: SuffixRange) -> Option<SuffixRange> {
        let lo = self.lower_bound(phrase, within);
        let hi = self.upper_bound(phrase, SuffixRange::new(lo, within.end));
        if lo < hi {
            Some(SuffixRange::new(lo, hi))
        } else {
            None
        }
    }

    /// Find `phrase` anywhere in the corpus
    pub fn find(&self, phrase: &[WordId]) -> Option<SuffixRange> {
        self.find_phrase(phrase, self.full_range()?)
    }

    /// First index in `within` whose suffix is not below `phrase`
    fn lower_bound(&self, phrase: &[WordId], within: SuffixRange) -> u32 {
        let mut lo = within.start;
        let mut hi = within.end;

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let suffix = self.suffix_at(mid);

            // Compare the suffix with the phrase (only up to phrase length)
            let cmp_len = phrase.len().min(suffix.len());
            if &suffix[..cmp_len] < phrase {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        lo
    }

    /// First index in `within` whose suffix does not start with `phrase`
    fn upper_bound(&self, phrase: &[WordId], within: SuffixRange) -> u32 {
        let mut lo = within.start;
        let mut hi = within.end;

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.suffix_at(mid).starts_with(phrase) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        lo
    }

    /// Corpus positions for a range of suffix-array indices, ascending
    pub fn get_all_positions(&self, range: SuffixRange) -> Vec<u32> {
        let mut positions = self.suffixes[range.start as usize..range.end as usize].to_vec();
        positions.sort_unstable();
        positions
    }

    /// Occurrences of a contiguous pattern found in `range`
    pub fn contiguous_matches(
        &self,
        pattern: &Pattern,
        range: Option<SuffixRange>,
    ) -> MatchedHierarchicalPhrases {
        match range {
            Some(range) => {
                let positions = self.get_all_positions(range);
                MatchedHierarchicalPhrases::from_positions(pattern.clone(), &positions, &self.corpus)
            }
            None => MatchedHierarchicalPhrases::new(pattern.clone()),
        }
    }

    /// Match list for any pattern, independent of a prefix tree
    ///
    /// Gapped patterns are built from the lists of their prefix and suffix,
    /// recursively, and memoized in the pattern cache.
    pub fn matches_for(
        &self,
        pattern: &Pattern,
        limits: IntersectLimits,
    ) -> Result<Arc<MatchedHierarchicalPhrases>> {
        if let Some(words) = pattern.words() {
            let range = self.find(&words);
            return Ok(Arc::new(self.contiguous_matches(pattern, range)));
        }

        if pattern.run_count() == 0 {
            return Ok(Arc::new(MatchedHierarchicalPhrases::new(pattern.clone())));
        }

        self.cache.get_or_compute(pattern, limits, || {
            if pattern.ends_with_gap() {
                let prefix = self.matches_for(&pattern.without_last(), limits)?;
                return Ok(prefix.copy_with_final_gap());
            }
            if pattern.len() == 2 && pattern.starts_with_gap() {
                let suffix = self.matches_for(&pattern.without_first(), limits)?;
                return Ok(suffix.copy_with_initial_gap());
            }
            let prefix = self.matches_for(&pattern.without_last(), limits)?;
            let suffix = self.matches_for(&pattern.without_first(), limits)?;
            query_intersect(pattern, &prefix, &suffix, limits)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Symbol;

    fn scenario() -> SuffixArray {
        // it makes him and it mars him , it sets him on and it takes him off .
        let sentence = vec![0, 1, 2, 3, 0, 4, 2, 5, 0, 6, 2, 7, 3, 0, 8, 2, 9, 10];
        let corpus = Arc::new(Corpus::from_sentences([sentence]));
        SuffixArray::from_corpus(corpus, &IndexConfig::default())
    }

    fn scan(corpus: &Corpus, phrase: &[WordId]) -> Vec<u32> {
        (0..corpus.len() as u32)
            .filter(|&p| corpus.suffix(p).starts_with(phrase))
            .collect()
    }

    #[test]
    fn test_suffixes_sorted() {
        let sa = scenario();
        let corpus = sa.corpus();
        for pair in sa.suffixes().windows(2) {
            assert!(corpus.suffix(pair[0]) <= corpus.suffix(pair[1]));
        }
    }

    #[test]
    fn test_find_phrase_matches_scan() {
        let sa = scenario();
        for phrase in [&[0][..], &[0, 4], &[2], &[2, 9, 10], &[3, 0]] {
            let range = sa.find(phrase).unwrap();
            assert_eq!(sa.get_all_positions(range), scan(sa.corpus(), phrase));
        }
    }

    #[test]
    fn test_find_phrase_missing() {
        let sa = scenario();
        assert!(sa.find(&[11]).is_none());
        assert!(sa.find(&[0, 0]).is_none());
        // Does not run past the end of the sentence.
        assert!(sa.find(&[10, 0]).is_none());
    }

    #[test]
    fn test_find_phrase_narrows() {
        let sa = scenario();
        let it = sa.find(&[0]).unwrap();
        let it_mars = sa.find_phrase(&[0, 4], it).unwrap();
        assert_eq!(it_mars.len(), 1);
        assert!(it_mars.start >= it.start && it_mars.end <= it.end);

        // Searching outside the parent range finds nothing.
        let him = sa.find(&[2]).unwrap();
        assert!(sa.find_phrase(&[0, 4], him).is_none());
    }

    #[test]
    fn test_empty_corpus() {
        let sa = SuffixArray::from_corpus(Arc::new(Corpus::default()), &IndexConfig::default());
        assert!(sa.is_empty());
        assert!(sa.full_range().is_none());
        assert!(sa.find(&[1]).is_none());
    }

    #[test]
    fn test_matches_for_gapped_pattern() {
        let sa = scenario();
        let pattern = Pattern::new(vec![Symbol::Terminal(0), Symbol::Gap, Symbol::Terminal(2)]);
        let matches = sa.matches_for(&pattern, IntersectLimits::default()).unwrap();

        let starts: Vec<&[u32]> = matches.iter().map(|m| m.starts()).collect();
        assert!(starts.contains(&&[0, 2][..]));
        assert!(starts.contains(&&[4, 6][..]));
        assert!(matches.is_sorted());
        assert!(matches.iter().all(|m| {
            let (start, end) = m.span().unwrap();
            end - start <= 10
        }));
    }

    #[test]
    fn test_matches_for_uses_cache() {
        let sa = scenario();
        let pattern = Pattern::new(vec![Symbol::Terminal(0), Symbol::Gap, Symbol::Terminal(2)]);
        let limits = IntersectLimits::default();

        let first = sa.matches_for(&pattern, limits).unwrap();
        let second = sa.matches_for(&pattern, limits).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(sa.cache_stats().hits >= 1);
    }
}
