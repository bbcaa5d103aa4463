pub mod build;
pub mod cache;
pub mod stats;
pub mod suffix_array;

pub use build::compile_corpus;
pub use cache::{CacheStats, PatternCache};
pub use suffix_array::{
    IndexMeta, LoadedIndex, SuffixArray, SuffixArrayBuilder, SuffixArrayReader, SuffixArrayWriter,
    SuffixRange,
};
