//! Suffix array reader
//!
//! Memory-maps the binary index files, validates them and rebuilds the
//! in-memory corpus and suffix array.

use super::search::SuffixArray;
use super::types::*;
use crate::config::IndexConfig;
use crate::corpus::{Corpus, Vocabulary};
use crate::error::ExtractError;
use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Reader for an index directory
pub struct SuffixArrayReader {
    /// Memory-mapped corpus.bin
    corpus_mmap: Mmap,
    /// Memory-mapped sa.bin
    sa_mmap: Mmap,
    word_count: u64,
    sentence_count: u32,
    suffix_count: u64,
    vocab: Vocabulary,
    meta: IndexMeta,
}

/// A fully loaded index
pub struct LoadedIndex {
    pub suffix_array: SuffixArray,
    pub vocab: Vocabulary,
    pub meta: IndexMeta,
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

#[inline]
fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

impl SuffixArrayReader {
    /// Open an index directory
    pub fn open(index_path: &Path) -> Result<Self> {
        let corpus_file = File::open(index_path.join("corpus.bin"))
            .context("Failed to open corpus.bin")?;
        let corpus_mmap = unsafe { Mmap::map(&corpus_file)? };

        let sa_file = File::open(index_path.join("sa.bin"))
            .context("Failed to open sa.bin")?;
        let sa_mmap = unsafe { Mmap::map(&sa_file)? };

        // Validate corpus header
        if corpus_mmap.len() < CorpusHeader::SIZE {
            anyhow::bail!("Invalid corpus.bin: file too small");
        }
        if read_u32(&corpus_mmap, 0) != CORPUS_MAGIC {
            anyhow::bail!("Invalid corpus.bin: bad magic number");
        }
        let version = read_u32(&corpus_mmap, 4);
        if version != SA_VERSION {
            anyhow::bail!("Unsupported corpus.bin version: {}", version);
        }
        let word_count = read_u64(&corpus_mmap, 8);
        let sentence_count = read_u32(&corpus_mmap, 16);

        let expected = CorpusHeader::SIZE as u64 + 4 * (word_count + sentence_count as u64);
        if corpus_mmap.len() as u64 != expected {
            anyhow::bail!(
                "Invalid corpus.bin: expected {} bytes, found {}",
                expected,
                corpus_mmap.len()
            );
        }

        // Validate suffix array header
        if sa_mmap.len() < SuffixArrayHeader::SIZE {
            anyhow::bail!("Invalid sa.bin: file too small");
        }
        if read_u32(&sa_mmap, 0) != SA_MAGIC {
            anyhow::bail!("Invalid sa.bin: bad magic number");
        }
        let version = read_u32(&sa_mmap, 4);
        if version != SA_VERSION {
            anyhow::bail!("Unsupported sa.bin version: {}", version);
        }
        let suffix_count = read_u64(&sa_mmap, 8);
        if suffix_count != word_count {
            anyhow::bail!(
                "Invalid sa.bin: {} suffixes for {} words",
                suffix_count,
                word_count
            );
        }
        if sa_mmap.len() as u64 != SuffixArrayHeader::SIZE as u64 + 4 * suffix_count {
            anyhow::bail!("Invalid sa.bin: truncated suffix array");
        }

        let vocab_text = std::fs::read_to_string(index_path.join("vocab.json"))
            .context("Failed to read vocab.json")?;
        let vocab: Vocabulary =
            serde_json::from_str(&vocab_text).context("Failed to parse vocab.json")?;

        let meta_text = std::fs::read_to_string(index_path.join("meta.json"))
            .context("Failed to read meta.json")?;
        let meta: IndexMeta =
            serde_json::from_str(&meta_text).context("Failed to parse meta.json")?;

        Ok(Self {
            corpus_mmap,
            sa_mmap,
            word_count,
            sentence_count,
            suffix_count,
            vocab,
            meta,
        })
    }

    /// Get suffix at index i in the suffix array
    #[inline]
    fn get_suffix(&self, i: u64) -> SuffixEntry {
        read_u32(&self.sa_mmap, SuffixArrayHeader::SIZE + i as usize * 4)
    }

    #[inline]
    fn corpus_u32(&self, i: u64) -> u32 {
        read_u32(&self.corpus_mmap, CorpusHeader::SIZE + i as usize * 4)
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// Get statistics about this index without loading it
    pub fn stats(&self) -> SuffixArrayStats {
        SuffixArrayStats {
            word_count: self.word_count,
            sentence_count: self.sentence_count,
            suffix_count: self.suffix_count,
            vocab_size: self.vocab.len(),
            file_size: (self.corpus_mmap.len() + self.sa_mmap.len()) as u64,
        }
    }

    /// Copy the mapped data into a searchable suffix array
    pub fn load(self, config: &IndexConfig) -> Result<LoadedIndex> {
        let words: Vec<u32> = (0..self.word_count).map(|i| self.corpus_u32(i)).collect();
        let sentence_starts: Vec<u32> = (0..self.sentence_count as u64)
            .map(|i| self.corpus_u32(self.word_count + i))
            .collect();

        if let Some(&bad) = words.iter().find(|&&w| w as usize >= self.vocab.len()) {
            return Err(ExtractError::invalid_index(format!(
                "corpus.bin: word id {} outside vocabulary",
                bad
            ))
            .into());
        }

        let corpus = Corpus::new(words, sentence_starts).context("Invalid corpus.bin")?;

        // Every position must appear exactly once
        let mut seen = vec![false; self.suffix_count as usize];
        let mut suffixes = Vec::with_capacity(self.suffix_count as usize);
        for i in 0..self.suffix_count {
            let pos = self.get_suffix(i);
            match seen.get_mut(pos as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(ExtractError::invalid_index(format!(
                        "sa.bin: position {} out of range or repeated",
                        pos
                    ))
                    .into());
                }
            }
            suffixes.push(pos);
        }

        log::info!(
            "loaded index: {} words, {} sentences, {} vocabulary entries",
            self.word_count,
            self.sentence_count,
            self.vocab.len()
        );

        let suffix_array =
            SuffixArray::from_parts(Arc::new(corpus), suffixes, config.cache_capacity);

        Ok(LoadedIndex {
            suffix_array,
            vocab: self.vocab,
            meta: self.meta,
        })
    }
}

/// Statistics about an index
#[derive(Debug, Clone)]
pub struct SuffixArrayStats {
    pub word_count: u64,
    pub sentence_count: u32,
    pub suffix_count: u64,
    pub vocab_size: usize,
    pub file_size: u64,
}
