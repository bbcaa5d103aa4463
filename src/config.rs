//! Configuration for index construction and grammar extraction
//!
//! Both sections can be loaded from a single JSON file; any field left out
//! takes its default value.

use crate::error::{ExtractError, Result};
use crate::phrases::IntersectLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limits that bound the prefix tree built for each query sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of corpus tokens an occurrence may cover
    pub max_phrase_span: usize,
    /// Maximum number of symbols (terminals and gaps) in a pattern
    pub max_phrase_length: usize,
    /// Maximum number of gaps in a pattern
    pub max_nonterminals: usize,
    /// Minimum number of tokens a gap must cover
    pub min_nonterminal_span: usize,
    /// Widest sentence span a grammar lookup will answer for
    pub span_limit: usize,
    /// Contiguous match lists at least this frequent are memoized
    pub cache_precomputation_frequency_threshold: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_phrase_span: 10,
            max_phrase_length: 5,
            max_nonterminals: 2,
            min_nonterminal_span: 1,
            span_limit: 10,
            cache_precomputation_frequency_threshold: 1000,
        }
    }
}

impl ExtractionConfig {
    /// Check the limits before a build starts
    pub fn validate(&self) -> Result<()> {
        if self.max_phrase_span == 0 {
            return Err(ExtractError::invalid_config(
                "max_phrase_span must be at least 1",
            ));
        }
        if self.max_phrase_length == 0 {
            return Err(ExtractError::invalid_config(
                "max_phrase_length must be at least 1",
            ));
        }
        if self.min_nonterminal_span == 0 {
            return Err(ExtractError::invalid_config(
                "min_nonterminal_span must be at least 1",
            ));
        }
        Ok(())
    }

    /// The subset of limits that decides which occurrences may be joined
    pub fn intersect_limits(&self) -> IntersectLimits {
        IntersectLimits {
            max_phrase_span: self.max_phrase_span,
            min_nonterminal_span: self.min_nonterminal_span,
        }
    }
}

/// Settings used when compiling and loading a suffix-array index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Sentences longer than this are left out of the index
    pub max_sentence_length: usize,
    /// Corpus size above which suffixes are sorted with rayon
    pub parallel_sort_threshold: usize,
    /// Entries kept in the pattern memo (0 disables it)
    pub cache_capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_sentence_length: 256,
            parallel_sort_threshold: 100_000,
            cache_capacity: 1000,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub extraction: ExtractionConfig,
}

impl Config {
    /// Parse a configuration from JSON text and validate it
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| ExtractError::invalid_config(e.to_string()))?;
        config.extraction.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
