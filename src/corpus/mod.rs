//! Source-side training corpus
//!
//! The corpus is one flat array of word ids plus the offset at which each
//! sentence begins. Every other structure (suffix array, match lists, prefix
//! trees) refers to corpus positions, i.e. indices into `words`.

pub mod vocab;

pub use vocab::Vocabulary;

use crate::error::{ExtractError, Result};

/// Word identifier assigned by a [`Vocabulary`]
pub type WordId = u32;

/// Index of a sentence within the corpus
pub type SentenceId = u32;

/// Immutable word sequence with sentence boundaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    words: Vec<WordId>,
    sentence_starts: Vec<u32>,
}

impl Corpus {
    /// Create a corpus from raw words and sentence start offsets
    ///
    /// Offsets must be strictly increasing, begin at 0 and stay inside
    /// `words`. An empty corpus has no offsets at all.
    pub fn new(words: Vec<WordId>, sentence_starts: Vec<u32>) -> Result<Self> {
        if words.len() > u32::MAX as usize {
            return Err(ExtractError::invalid_corpus(
                "corpus exceeds u32 positions",
            ));
        }

        if words.is_empty() {
            if !sentence_starts.is_empty() {
                return Err(ExtractError::invalid_corpus(
                    "sentence starts given for an empty corpus",
                ));
            }
            return Ok(Self::default());
        }

        match sentence_starts.first() {
            Some(0) => {}
            Some(first) => {
                return Err(ExtractError::invalid_corpus(format!(
                    "first sentence starts at {first}, expected 0"
                )));
            }
            None => {
                return Err(ExtractError::invalid_corpus(
                    "non-empty corpus without sentence starts",
                ));
            }
        }

        if let Some(pair) = sentence_starts.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ExtractError::invalid_corpus(format!(
                "sentence starts not strictly increasing at {} -> {}",
                pair[0], pair[1]
            )));
        }

        if let Some(&last) = sentence_starts.last()
            && last as usize >= words.len()
        {
            return Err(ExtractError::invalid_corpus(format!(
                "sentence start {last} is past the end of {} words",
                words.len()
            )));
        }

        Ok(Self {
            words,
            sentence_starts,
        })
    }

    /// Build a corpus from tokenized sentences, skipping empty ones
    pub fn from_sentences<I, S>(sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[WordId]>,
    {
        let mut words = Vec::new();
        let mut sentence_starts = Vec::new();

        for sentence in sentences {
            let sentence = sentence.as_ref();
            if sentence.is_empty() {
                continue;
            }
            sentence_starts.push(words.len() as u32);
            words.extend_from_slice(sentence);
        }

        Self {
            words,
            sentence_starts,
        }
    }

    /// Total number of words
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn num_sentences(&self) -> usize {
        self.sentence_starts.len()
    }

    #[inline]
    pub fn words(&self) -> &[WordId] {
        &self.words
    }

    #[inline]
    pub fn sentence_starts(&self) -> &[u32] {
        &self.sentence_starts
    }

    /// Sentence containing a corpus position
    #[inline]
    pub fn sentence_index(&self, pos: u32) -> SentenceId {
        (self.sentence_starts.partition_point(|&start| start <= pos) - 1) as SentenceId
    }

    #[inline]
    pub fn sentence_start(&self, sentence: SentenceId) -> u32 {
        self.sentence_starts[sentence as usize]
    }

    /// Exclusive end offset of a sentence
    #[inline]
    pub fn sentence_end(&self, sentence: SentenceId) -> u32 {
        self.sentence_starts
            .get(sentence as usize + 1)
            .copied()
            .unwrap_or(self.words.len() as u32)
    }

    pub fn sentence(&self, sentence: SentenceId) -> &[WordId] {
        let start = self.sentence_start(sentence) as usize;
        let end = self.sentence_end(sentence) as usize;
        &self.words[start..end]
    }

    /// Words from `pos` up to the end of its sentence
    #[inline]
    pub fn suffix(&self, pos: u32) -> &[WordId] {
        let end = self.sentence_end(self.sentence_index(pos));
        &self.words[pos as usize..end as usize]
    }

    pub fn sentences(&self) -> impl Iterator<Item = &[WordId]> + '_ {
        (0..self.num_sentences() as SentenceId).map(move |s| self.sentence(s))
    }
}
