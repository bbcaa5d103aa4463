//! # hierex - hierarchical phrase extraction over a suffix array
//!
//! hierex finds, for a query sentence, every pattern of words and gaps
//! that occurs in a parallel-text corpus, together with all of its
//! occurrences. Gapped patterns such as `it [X] him` are the source side of
//! hierarchical translation rules.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`corpus`] - Word-id corpus with sentence boundaries, and the vocabulary
//! - [`index`] - Suffix array construction, lookup, persistence and the pattern cache
//! - [`pattern`] - Patterns of terminals and gaps
//! - [`phrases`] - Occurrence lists and their banded merge-join
//! - [`tree`] - The suffix-linked prefix tree built per query sentence
//! - [`extract`] - Per-sentence summaries and parallel batch extraction
//! - [`config`] - Index and extraction settings
//!
//! ## Quick Start
//!
//! ```no_run
//! use hierex::config::{ExtractionConfig, IndexConfig};
//! use hierex::index::SuffixArrayReader;
//! use hierex::tree::PrefixTree;
//! use std::path::Path;
//!
//! let index = SuffixArrayReader::open(Path::new("corpus.idx"))?
//!     .load(&IndexConfig::default())?;
//! let sentence = index.vocab.encode_query("it persuades him and it disheartens him");
//!
//! let tree = PrefixTree::build(&index.suffix_array, &sentence, &ExtractionConfig::default())?;
//! for node in tree.nodes().filter(|n| n.has_rules()) {
//!     println!("{}", node.pattern().display_with(&index.vocab));
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Performance
//!
//! A pattern's occurrences are computed once per tree, from the lists of its
//! prefix and its suffix, and linking every node to its suffix lets a
//! pattern be discarded as soon as its suffix is known not to occur. Lists
//! for gapped patterns are shared across sentences through an LRU cache
//! owned by the suffix array.

pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod index;
pub mod pattern;
pub mod phrases;
pub mod tree;
pub mod utils;

pub use config::{Config, ExtractionConfig, IndexConfig};
pub use error::{ExtractError, Result};
pub use index::SuffixArray;
pub use pattern::{Pattern, Symbol};
pub use phrases::MatchedHierarchicalPhrases;
pub use tree::PrefixTree;
