//! Performance benchmarks for suffix sorting and prefix-tree construction
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hierex::config::{ExtractionConfig, IndexConfig};
use hierex::corpus::{Corpus, WordId};
use hierex::index::SuffixArray;
use hierex::tree::PrefixTree;
use std::sync::Arc;

/// Deterministic pseudo-random corpus with a skewed vocabulary
fn synthetic_corpus(sentences: usize, length: usize, vocab: u32) -> Vec<Vec<WordId>> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    (0..sentences)
        .map(|_| {
            (0..length)
                .map(|_| {
                    // Squaring skews draws toward small ids, like word frequencies
                    let r = (next() % 1000) as f64 / 1000.0;
                    (r * r * vocab as f64) as WordId
                })
                .collect()
        })
        .collect()
}

fn bench_suffix_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("suffix_sort");
    group.sample_size(20);

    for &sentences in &[1_000usize, 10_000] {
        let corpus = Arc::new(Corpus::from_sentences(synthetic_corpus(sentences, 20, 500)));
        group.bench_with_input(BenchmarkId::from_parameter(sentences), &corpus, |b, corpus| {
            b.iter(|| SuffixArray::from_corpus(Arc::clone(corpus), &IndexConfig::default()))
        });
    }

    group.finish();
}

fn bench_prefix_tree(c: &mut Criterion) {
    let corpus = Arc::new(Corpus::from_sentences(synthetic_corpus(5_000, 20, 500)));
    let queries = synthetic_corpus(10, 15, 500);

    let mut group = c.benchmark_group("prefix_tree");
    group.sample_size(20);

    for &nonterminals in &[0usize, 1, 2] {
        let config = ExtractionConfig {
            max_nonterminals: nonterminals,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("cold_cache", nonterminals),
            &config,
            |b, config| {
                b.iter_with_setup(
                    || SuffixArray::from_corpus(Arc::clone(&corpus), &IndexConfig::default()),
                    |sa| {
                        for query in &queries {
                            black_box(PrefixTree::build(&sa, query, config).map(|t| t.size()).ok());
                        }
                    },
                )
            },
        );
    }

    let sa = SuffixArray::from_corpus(Arc::clone(&corpus), &IndexConfig::default());
    let config = ExtractionConfig::default();
    group.bench_function("warm_cache", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(PrefixTree::build(&sa, query, &config).map(|t| t.size()).ok());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_suffix_sort, bench_prefix_tree);
criterion_main!(benches);
