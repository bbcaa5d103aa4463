//! Error types for the extraction engine
//!
//! Contract violations (bad limits, a missing suffix-link target, a duplicate
//! trie edge) abort the build of the current tree. A pattern that simply does
//! not occur in the corpus is never an error: it shows up as an empty match
//! list and an inactive node.

use crate::pattern::{Pattern, Symbol};

/// Result type used throughout the library, defaulting to [`ExtractError`].
pub type Result<T, E = ExtractError> = std::result::Result<T, E>;

/// Errors raised by corpus construction, index loading and tree building.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// A limit in the extraction or index configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sentence boundaries or word data do not describe a valid corpus.
    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),

    /// Persisted index data failed validation.
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// A node already has an outgoing edge for this symbol.
    #[error("node for '{pattern}' already has a child for {symbol}")]
    DuplicateChild { pattern: Pattern, symbol: Symbol },

    /// The suffix-link target of a new node was never built.
    #[error("suffix link target missing while creating '{pattern}'")]
    MissingSuffixLink { pattern: Pattern },

    /// An active node that should carry a match list has none.
    #[error("no match list for active pattern '{pattern}'")]
    MissingMatches { pattern: Pattern },

    /// Two match lists cannot be combined into the requested pattern.
    #[error("cannot intersect '{prefix}' with '{suffix}': {reason}")]
    MismatchedPhrases {
        prefix: Pattern,
        suffix: Pattern,
        reason: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn invalid_corpus(msg: impl Into<String>) -> Self {
        Self::InvalidCorpus(msg.into())
    }

    pub(crate) fn invalid_index(msg: impl Into<String>) -> Self {
        Self::InvalidIndex(msg.into())
    }
}
