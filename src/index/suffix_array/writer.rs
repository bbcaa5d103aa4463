//! Suffix array writer
//!
//! Writes the corpus and suffix array to disk in a format optimized for
//! memory-mapped reading.

use super::search::SuffixArray;
use super::types::*;
use crate::corpus::Vocabulary;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes index files to a directory
pub struct SuffixArrayWriter;

impl SuffixArrayWriter {
    /// Write all index files to `index_path`
    ///
    /// Creates:
    /// - corpus.bin: Word ids and sentence starts
    /// - sa.bin: The suffix array itself
    /// - vocab.json: Word strings by id
    /// - meta.json: Counts describing the index
    pub fn write(
        index_path: &Path,
        sa: &SuffixArray,
        vocab: &Vocabulary,
        meta: &IndexMeta,
    ) -> Result<()> {
        std::fs::create_dir_all(index_path)
            .with_context(|| format!("Failed to create {}", index_path.display()))?;

        Self::write_corpus(index_path, sa)?;
        Self::write_suffix_array(index_path, sa.suffixes())?;

        let vocab_file = File::create(index_path.join("vocab.json"))
            .context("Failed to create vocab.json")?;
        serde_json::to_writer(BufWriter::new(vocab_file), vocab)?;

        let meta_file = File::create(index_path.join("meta.json"))
            .context("Failed to create meta.json")?;
        serde_json::to_writer_pretty(BufWriter::new(meta_file), meta)?;

        log::info!(
            "wrote index with {} words, {} sentences to {}",
            meta.word_count,
            meta.sentence_count,
            index_path.display()
        );
        Ok(())
    }

    /// Write word ids and sentence starts to corpus.bin
    fn write_corpus(index_path: &Path, sa: &SuffixArray) -> Result<()> {
        let corpus = sa.corpus();
        let path = index_path.join("corpus.bin");
        let mut file = BufWriter::with_capacity(65536, File::create(&path)?);

        // Write header
        let header = CorpusHeader::new(corpus.len() as u64, corpus.num_sentences() as u32);
        file.write_all(&header.magic.to_le_bytes())?;
        file.write_all(&header.version.to_le_bytes())?;
        file.write_all(&header.word_count.to_le_bytes())?;
        file.write_all(&header.sentence_count.to_le_bytes())?;
        file.write_all(&header.flags.to_le_bytes())?;

        write_u32s(&mut file, corpus.words())?;
        write_u32s(&mut file, corpus.sentence_starts())?;

        file.flush()?;
        Ok(())
    }

    /// Write suffix array to sa.bin
    fn write_suffix_array(index_path: &Path, suffixes: &[SuffixEntry]) -> Result<()> {
        let path = index_path.join("sa.bin");
        let mut file = BufWriter::with_capacity(65536, File::create(&path)?);

        // Write header
        let header = SuffixArrayHeader::new(suffixes.len() as u64);
        file.write_all(&header.magic.to_le_bytes())?;
        file.write_all(&header.version.to_le_bytes())?;
        file.write_all(&header.suffix_count.to_le_bytes())?;
        file.write_all(&header.flags.to_le_bytes())?;

        write_u32s(&mut file, suffixes)?;

        file.flush()?;
        Ok(())
    }
}

/// Write little-endian u32 values, batching to reduce write calls
fn write_u32s<W: Write>(out: &mut W, values: &[u32]) -> Result<()> {
    let mut buffer = Vec::with_capacity(8 * 1024);
    for &value in values {
        buffer.extend_from_slice(&value.to_le_bytes());
        if buffer.len() >= 8 * 1024 {
            out.write_all(&buffer)?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        out.write_all(&buffer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::suffix_array::builder::SuffixArrayBuilder;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_index_files() {
        let temp_dir = tempdir().unwrap();
        let index_path = temp_dir.path().join("idx");

        let mut vocab = Vocabulary::new();
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_sentence(&vocab.intern_line("hello world"));
        builder.add_sentence(&vocab.intern_line("foo bar"));
        let built = builder.build();
        let meta = built.meta(vocab.len());
        let sa = built.into_suffix_array();

        SuffixArrayWriter::write(&index_path, &sa, &vocab, &meta).unwrap();

        // Verify files exist
        assert!(index_path.join("corpus.bin").exists());
        assert!(index_path.join("sa.bin").exists());
        assert!(index_path.join("vocab.json").exists());
        assert!(index_path.join("meta.json").exists());

        // Verify sa.bin header and size
        let sa_data = fs::read(index_path.join("sa.bin")).unwrap();
        let magic = u32::from_le_bytes(sa_data[0..4].try_into().unwrap());
        assert_eq!(magic, SA_MAGIC);
        assert_eq!(sa_data.len(), SuffixArrayHeader::SIZE + 4 * 4);

        // corpus.bin holds 4 words and 2 sentence starts
        let corpus_data = fs::read(index_path.join("corpus.bin")).unwrap();
        assert_eq!(corpus_data.len(), CorpusHeader::SIZE + 6 * 4);
    }
}
