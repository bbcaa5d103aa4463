//! Types for the word-level suffix array
//!
//! Positions and suffix-array indices are `u32`: a corpus is addressed by
//! word, and four billion words is well beyond a single training corpus.

use serde::{Deserialize, Serialize};

/// Suffix array entry - corpus position where a suffix begins
pub type SuffixEntry = u32;

/// Magic number for sa.bin
pub const SA_MAGIC: u32 = 0x41535848; // "HXSA" in little-endian

/// Magic number for corpus.bin
pub const CORPUS_MAGIC: u32 = 0x50435848; // "HXCP" in little-endian

/// Current version of the binary formats
pub const SA_VERSION: u32 = 1;

/// Half-open range `[start, end)` of suffix-array indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuffixRange {
    pub start: u32,
    pub end: u32,
}

impl SuffixRange {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IndexMeta {
    /// Binary format version
    pub version: u32,
    /// Number of words in the corpus
    pub word_count: u64,
    /// Number of sentences in the corpus
    pub sentence_count: u32,
    /// Sentences left out (empty or too long)
    pub excluded_count: u32,
    /// Number of distinct words
    pub vocab_size: u32,
}

/// Header for sa.bin file
#[derive(Debug, Clone, Copy)]
pub struct SuffixArrayHeader {
    /// Magic number (SA_MAGIC)
    pub magic: u32,
    /// Version number
    pub version: u32,
    /// Number of suffix entries
    pub suffix_count: u64,
    /// Flags (reserved for future use)
    pub flags: u32,
}

impl SuffixArrayHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 8 + 4; // 20 bytes

    pub fn new(suffix_count: u64) -> Self {
        Self {
            magic: SA_MAGIC,
            version: SA_VERSION,
            suffix_count,
            flags: 0,
        }
    }
}

/// Header for corpus.bin file
#[derive(Debug, Clone, Copy)]
pub struct CorpusHeader {
    /// Magic number (CORPUS_MAGIC)
    pub magic: u32,
    /// Version number
    pub version: u32,
    /// Number of words
    pub word_count: u64,
    /// Number of sentences
    pub sentence_count: u32,
    /// Flags (reserved)
    pub flags: u32,
}

impl CorpusHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 8 + 4 + 4; // 24 bytes

    pub fn new(word_count: u64, sentence_count: u32) -> Self {
        Self {
            magic: CORPUS_MAGIC,
            version: SA_VERSION,
            word_count,
            sentence_count,
            flags: 0,
        }
    }
}
