//! Suffix array indexing module
//!
//! This module provides O(m log n) phrase lookup over a word-id corpus using
//! suffix arrays. Suffixes end at sentence boundaries, so no contiguous match
//! ever spans two sentences.
//!
//! ## Architecture
//!
//! - `builder`: Collects sentences and sorts their suffixes
//! - `search`: In-memory lookup of contiguous and gapped patterns
//! - `writer`: Persists the corpus and suffix array to disk
//! - `reader`: Memory-mapped loading and validation
//! - `types`: Core type definitions
//!
//! ## File Format
//!
//! Per index directory, four files are created:
//! - `corpus.bin`: Word ids followed by sentence start offsets
//! - `sa.bin`: The sorted suffix array (positions into the corpus)
//! - `vocab.json`: Word strings, indexed by id
//! - `meta.json`: Corpus counts

pub mod builder;
pub mod reader;
pub mod search;
pub mod types;
pub mod writer;

// Re-exports for convenience
pub use builder::{BuiltSuffixArray, SuffixArrayBuilder};
pub use reader::{LoadedIndex, SuffixArrayReader, SuffixArrayStats};
pub use search::SuffixArray;
pub use types::{IndexMeta, SuffixEntry, SuffixRange};
pub use writer::SuffixArrayWriter;
