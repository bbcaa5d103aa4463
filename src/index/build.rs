use crate::config::IndexConfig;
use crate::corpus::Vocabulary;
use crate::index::suffix_array::{IndexMeta, SuffixArrayBuilder, SuffixArrayWriter};
use crate::utils::progress;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

/// Compile a text corpus, one whitespace-tokenized sentence per line, into
/// an index directory
pub fn compile_corpus(corpus_path: &Path, index_path: &Path, config: &IndexConfig) -> Result<IndexMeta> {
    compile_corpus_with_progress(corpus_path, index_path, config, false)
}

/// Compile a corpus with optional silent mode
pub fn compile_corpus_with_progress(
    corpus_path: &Path,
    index_path: &Path,
    config: &IndexConfig,
    silent: bool,
) -> Result<IndexMeta> {
    let started = Instant::now();
    let file = File::open(corpus_path)
        .with_context(|| format!("Failed to open {}", corpus_path.display()))?;

    let spinner = progress::spinner("Reading sentences...", silent);

    let mut vocab = Vocabulary::new();
    let mut builder = SuffixArrayBuilder::new(config.clone());

    for (line_number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| {
            format!("Failed to read line {} of {}", line_number + 1, corpus_path.display())
        })?;
        // Words seen only in skipped sentences stay out of the vocabulary.
        let len = line.split_whitespace().count();
        if builder.accepts(len) {
            builder.add_sentence(&vocab.intern_line(&line));
        } else {
            builder.skip_sentence();
            log::debug!("skipping sentence on line {} ({} words)", line_number + 1, len);
        }
    }

    if let Some(spinner) = &spinner {
        spinner.set_message(format!("Sorting suffixes of {} sentences...", builder.sentence_count()));
    }

    let built = builder.build();
    let meta = built.meta(vocab.len());
    let suffix_array = built.into_suffix_array();

    if let Some(spinner) = &spinner {
        spinner.set_message("Writing index...");
    }
    SuffixArrayWriter::write(index_path, &suffix_array, &vocab, &meta)?;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    log::info!(
        "compiled {} in {:?}: {} sentences, {} excluded",
        corpus_path.display(),
        started.elapsed(),
        meta.sentence_count,
        meta.excluded_count
    );

    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::suffix_array::SuffixArrayReader;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_compile_counts_excluded_sentences() {
        let temp_dir = tempdir().unwrap();
        let corpus_path = temp_dir.path().join("corpus.txt");
        fs::write(&corpus_path, "a b c\n\na b\nd e f g h\n").unwrap();

        let config = IndexConfig {
            max_sentence_length: 4,
            ..Default::default()
        };
        let index_path = temp_dir.path().join("idx");
        let meta = compile_corpus_with_progress(&corpus_path, &index_path, &config, true).unwrap();

        assert_eq!(meta.sentence_count, 2);
        assert_eq!(meta.word_count, 5);
        assert_eq!(meta.excluded_count, 2);
        // "d e f g h" is excluded, so only a b c are interned
        assert_eq!(meta.vocab_size, 3);

        let reader = SuffixArrayReader::open(&index_path).unwrap();
        assert_eq!(reader.stats().sentence_count, 2);
    }

    #[test]
    fn test_missing_corpus_file() {
        let temp_dir = tempdir().unwrap();
        let result = compile_corpus_with_progress(
            &temp_dir.path().join("nope.txt"),
            &temp_dir.path().join("idx"),
            &IndexConfig::default(),
            true,
        );
        assert!(result.is_err());
    }
}
