//! Gapped patterns
//!
//! A pattern is a sequence of terminals and gaps. Its maximal blocks of
//! consecutive terminals are called runs; an occurrence of the pattern
//! records where each run starts in the corpus. The shape of a pattern at
//! either edge (gap, one terminal, or several terminals) decides how two
//! match lists are lined up when they are intersected, so it is computed
//! once at construction rather than on every comparison.

mod symbol;

pub use symbol::{GAP_TOKEN, Symbol};

use crate::corpus::{Vocabulary, WordId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// How a pattern begins or ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeCase {
    Empty,
    Gap,
    SingleTerminal,
    MultipleTerminals,
}

/// Immutable symbol sequence with cached shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct Pattern {
    symbols: Vec<Symbol>,
    arity: usize,
    run_lengths: Vec<usize>,
}

impl Pattern {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        let mut run_lengths = Vec::new();
        let mut arity = 0;
        let mut in_run = false;

        for symbol in &symbols {
            if symbol.is_gap() {
                arity += 1;
                in_run = false;
            } else if in_run {
                if let Some(last) = run_lengths.last_mut() {
                    *last += 1;
                }
            } else {
                run_lengths.push(1);
                in_run = true;
            }
        }

        Self {
            symbols,
            arity,
            run_lengths,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The pattern consisting of a single gap
    pub fn gap() -> Self {
        Self::new(vec![Symbol::Gap])
    }

    /// Contiguous pattern of words
    pub fn from_words(words: &[WordId]) -> Self {
        Self::new(words.iter().map(|&w| Symbol::Terminal(w)).collect())
    }

    /// Parse whitespace-separated tokens; `None` if a word is unknown
    pub fn parse(text: &str, vocab: &Vocabulary) -> Option<Self> {
        text.split_whitespace()
            .map(|token| Symbol::parse(token, vocab))
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    #[inline]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of gaps
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.arity == 0
    }

    /// Number of maximal terminal runs
    #[inline]
    pub fn run_count(&self) -> usize {
        self.run_lengths.len()
    }

    #[inline]
    pub fn run_lengths(&self) -> &[usize] {
        &self.run_lengths
    }

    pub fn first(&self) -> Option<Symbol> {
        self.symbols.first().copied()
    }

    pub fn last(&self) -> Option<Symbol> {
        self.symbols.last().copied()
    }

    pub fn prefix_case(&self) -> EdgeCase {
        match self.symbols.first() {
            None => EdgeCase::Empty,
            Some(Symbol::Gap) => EdgeCase::Gap,
            Some(_) if self.run_lengths[0] == 1 => EdgeCase::SingleTerminal,
            Some(_) => EdgeCase::MultipleTerminals,
        }
    }

    pub fn suffix_case(&self) -> EdgeCase {
        match self.symbols.last() {
            None => EdgeCase::Empty,
            Some(Symbol::Gap) => EdgeCase::Gap,
            Some(_) if self.run_lengths[self.run_lengths.len() - 1] == 1 => {
                EdgeCase::SingleTerminal
            }
            Some(_) => EdgeCase::MultipleTerminals,
        }
    }

    #[inline]
    pub fn starts_with_gap(&self) -> bool {
        self.prefix_case() == EdgeCase::Gap
    }

    #[inline]
    pub fn ends_with_gap(&self) -> bool {
        self.suffix_case() == EdgeCase::Gap
    }

    /// True when the first two symbols are both terminals
    #[inline]
    pub fn starts_with_two_terminals(&self) -> bool {
        self.prefix_case() == EdgeCase::MultipleTerminals
    }

    /// True when the last two symbols are both terminals
    #[inline]
    pub fn ends_with_two_terminals(&self) -> bool {
        self.suffix_case() == EdgeCase::MultipleTerminals
    }

    /// Terminal words, or `None` if the pattern has a gap
    pub fn words(&self) -> Option<Vec<WordId>> {
        self.symbols.iter().map(|s| s.word()).collect()
    }

    /// New pattern with `symbol` appended
    pub fn extend(&self, symbol: Symbol) -> Self {
        let mut symbols = Vec::with_capacity(self.symbols.len() + 1);
        symbols.extend_from_slice(&self.symbols);
        symbols.push(symbol);
        Self::new(symbols)
    }

    pub fn with_final_gap(&self) -> Self {
        self.extend(Symbol::Gap)
    }

    pub fn with_initial_gap(&self) -> Self {
        let mut symbols = Vec::with_capacity(self.symbols.len() + 1);
        symbols.push(Symbol::Gap);
        symbols.extend_from_slice(&self.symbols);
        Self::new(symbols)
    }

    /// Pattern with its first symbol removed (the suffix-link pattern)
    pub fn without_first(&self) -> Self {
        Self::new(self.symbols.get(1..).unwrap_or_default().to_vec())
    }

    /// Pattern with its last symbol removed (the parent pattern)
    pub fn without_last(&self) -> Self {
        let end = self.symbols.len().saturating_sub(1);
        Self::new(self.symbols[..end].to_vec())
    }

    /// Render with words from the vocabulary
    pub fn display_with(&self, vocab: &Vocabulary) -> String {
        self.symbols
            .iter()
            .map(|s| s.display_with(vocab))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Vec<Symbol>> for Pattern {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self::new(symbols)
    }
}

impl From<Pattern> for Vec<Symbol> {
    fn from(pattern: Pattern) -> Self {
        pattern.symbols
    }
}

// Everything besides `symbols` is derived from it.
impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbols.hash(state);
    }
}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbols.cmp(&other.symbols)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}
