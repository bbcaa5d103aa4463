//! Word ⇄ id table
//!
//! Ids are dense and assigned in first-seen order. The table is persisted as
//! a plain JSON array of words, the id being the array index.

use super::WordId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    words: Vec<String>,
    ids: FxHashMap<String, WordId>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `word`, assigning a new one if unseen
    pub fn intern(&mut self, word: &str) -> WordId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = self.words.len() as WordId;
        self.words.push(word.to_string());
        self.ids.insert(word.to_string(), id);
        id
    }

    /// Intern every whitespace-separated token of a line
    pub fn intern_line(&mut self, line: &str) -> Vec<WordId> {
        line.split_whitespace().map(|w| self.intern(w)).collect()
    }

    pub fn get(&self, word: &str) -> Option<WordId> {
        self.ids.get(word).copied()
    }

    pub fn word(&self, id: WordId) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    /// Encode a query line without growing the table
    ///
    /// Words missing from the corpus get fresh ids past the end of the table,
    /// one per distinct word, so they still compare equal to themselves but
    /// never match the corpus.
    pub fn encode_query(&self, line: &str) -> Vec<WordId> {
        let mut unknown: FxHashMap<&str, WordId> = FxHashMap::default();
        line.split_whitespace()
            .map(|w| match self.get(w) {
                Some(id) => id,
                None => {
                    let next = (self.words.len() + unknown.len()) as WordId;
                    *unknown.entry(w).or_insert(next)
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(words: Vec<String>) -> Self {
        let ids = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as WordId))
            .collect();
        Self { words, ids }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.words
    }
}
