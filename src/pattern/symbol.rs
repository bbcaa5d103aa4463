use crate::corpus::{Vocabulary, WordId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token written for a gap in human-readable patterns
pub const GAP_TOKEN: &str = "[X]";

/// One element of a pattern: a corpus word or a nonterminal slot
///
/// `Gap` orders before every terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    Gap,
    Terminal(WordId),
}

impl Symbol {
    #[inline]
    pub fn is_gap(self) -> bool {
        matches!(self, Symbol::Gap)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_gap()
    }

    #[inline]
    pub fn word(self) -> Option<WordId> {
        match self {
            Symbol::Terminal(id) => Some(id),
            Symbol::Gap => None,
        }
    }

    /// Parse a token, treating [`GAP_TOKEN`] as a gap
    pub fn parse(token: &str, vocab: &Vocabulary) -> Option<Symbol> {
        if token == GAP_TOKEN {
            Some(Symbol::Gap)
        } else {
            vocab.get(token).map(Symbol::Terminal)
        }
    }

    /// Render with words from the vocabulary
    pub fn display_with<'a>(&self, vocab: &'a Vocabulary) -> std::borrow::Cow<'a, str> {
        match *self {
            Symbol::Gap => GAP_TOKEN.into(),
            Symbol::Terminal(id) => match vocab.word(id) {
                Some(word) => word.into(),
                None => format!("<{id}>").into(),
            },
        }
    }
}

impl From<WordId> for Symbol {
    fn from(id: WordId) -> Self {
        Symbol::Terminal(id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Gap => write!(f, "X"),
            Symbol::Terminal(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_orders_first() {
        assert!(Symbol::Gap < Symbol::Terminal(0));
        assert!(Symbol::Terminal(1) < Symbol::Terminal(2));
    }

    #[test]
    fn test_parse() {
        let mut vocab = Vocabulary::new();
        vocab.intern_line("it him");
        assert_eq!(Symbol::parse("[X]", &vocab), Some(Symbol::Gap));
        assert_eq!(Symbol::parse("him", &vocab), Some(Symbol::Terminal(1)));
        assert_eq!(Symbol::parse("mars", &vocab), None);
    }
}
