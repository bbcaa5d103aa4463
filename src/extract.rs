//! Per-sentence grammar summaries
//!
//! A prefix tree is an intermediate structure; what a caller usually wants
//! is the list of patterns the corpus supports for a sentence, with a few
//! sample occurrences each. Batches of sentences are processed in parallel
//! against one shared suffix array.

use crate::config::ExtractionConfig;
use crate::corpus::{SentenceId, Vocabulary, WordId};
use crate::error::Result;
use crate::index::suffix_array::SuffixArray;
use crate::tree::PrefixTree;
use crate::utils::progress;
use rayon::prelude::*;
use serde::Serialize;

/// Sample occurrences kept per pattern
pub const DEFAULT_SAMPLE_SIZE: usize = 3;

/// Corpus location of one occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceSpan {
    pub sentence: SentenceId,
    pub start: u32,
    pub end: u32,
}

/// A pattern found for the sentence and how often the corpus has it
#[derive(Debug, Clone, Serialize)]
pub struct PatternSummary {
    pub pattern: String,
    pub arity: usize,
    pub count: usize,
    pub samples: Vec<OccurrenceSpan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentenceGrammar {
    pub sentence_index: usize,
    pub length: usize,
    pub tree_size: usize,
    pub patterns: Vec<PatternSummary>,
}

impl SentenceGrammar {
    /// Summarize every active node that has occurrences, in tree order
    pub fn from_tree(
        sentence_index: usize,
        tree: &PrefixTree,
        vocab: Option<&Vocabulary>,
        sample_size: usize,
    ) -> Self {
        let patterns = tree
            .nodes()
            .filter(|node| node.is_active() && node.has_rules())
            .filter_map(|node| {
                let matches = node.matches()?;
                let pattern = node.pattern();
                let samples = matches
                    .iter()
                    .take(sample_size)
                    .filter_map(|phrase| {
                        let (start, end) = phrase.span()?;
                        Some(OccurrenceSpan {
                            sentence: phrase.sentence(),
                            start,
                            end,
                        })
                    })
                    .collect();

                Some(PatternSummary {
                    pattern: match vocab {
                        Some(vocab) => pattern.display_with(vocab),
                        None => pattern.to_string(),
                    },
                    arity: pattern.arity(),
                    count: matches.len(),
                    samples,
                })
            })
            .collect();

        Self {
            sentence_index,
            length: tree.sentence().len(),
            tree_size: tree.size(),
            patterns,
        }
    }
}

/// Build a tree per sentence and summarize it
pub fn extract_batch(
    sa: &SuffixArray,
    sentences: &[Vec<WordId>],
    config: &ExtractionConfig,
    vocab: Option<&Vocabulary>,
) -> Result<Vec<SentenceGrammar>> {
    extract_batch_with_progress(sa, sentences, config, vocab, false)
}

/// Build and summarize trees for a batch of sentences with optional progress bar
///
/// Results keep the order of `sentences`. The first failing sentence aborts
/// the batch.
pub fn extract_batch_with_progress(
    sa: &SuffixArray,
    sentences: &[Vec<WordId>],
    config: &ExtractionConfig,
    vocab: Option<&Vocabulary>,
    silent: bool,
) -> Result<Vec<SentenceGrammar>> {
    config.validate()?;

    let progress_bar = progress::counter(sentences.len(), "sentences", silent);

    let grammars = sentences
        .par_iter()
        .enumerate()
        .map(|(index, sentence)| {
            let tree = PrefixTree::build(sa, sentence, config)?;
            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
            Ok(SentenceGrammar::from_tree(
                index,
                &tree,
                vocab,
                DEFAULT_SAMPLE_SIZE,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    let stats = sa.cache_stats();
    log::info!(
        "extracted {} sentences, pattern cache hit rate {:.1}%",
        grammars.len(),
        stats.hit_rate() * 100.0
    );

    Ok(grammars)
}
