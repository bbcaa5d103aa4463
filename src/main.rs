use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hierex::config::{Config, ExtractionConfig};
use hierex::extract::{self, SentenceGrammar};
use hierex::index::{SuffixArrayReader, compile_corpus, stats};
use hierex::pattern::Pattern;
use hierex::tree::PrefixTree;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hierex")]
#[command(about = "Hierarchical phrase extraction over a suffix-array corpus index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a text corpus (one sentence per line) into an index
    Compile {
        /// Tokenized corpus, one sentence per line
        corpus: PathBuf,

        /// Output index directory
        index: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Extract gapped patterns for each sentence of a file
    Extract {
        /// Index directory
        index: PathBuf,

        /// Tokenized sentences, one per line
        sentences: PathBuf,

        #[command(flatten)]
        limits: LimitArgs,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,

        /// Print the prefix tree of each sentence instead of a summary
        #[arg(long, conflicts_with = "json")]
        tree: bool,
    },
    /// Show index statistics
    Stats {
        /// Index directory
        index: PathBuf,
    },
    /// Look up the occurrences of one pattern (`[X]` marks a gap)
    Lookup {
        /// Index directory
        index: PathBuf,

        /// Pattern tokens
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,

        #[command(flatten)]
        limits: LimitArgs,

        /// Maximum number of occurrences to print
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

/// Overrides applied on top of the configuration file
#[derive(Args)]
struct LimitArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_phrase_span: Option<usize>,

    #[arg(long)]
    max_phrase_length: Option<usize>,

    #[arg(long)]
    max_nonterminals: Option<usize>,

    #[arg(long)]
    min_nonterminal_span: Option<usize>,
}

impl LimitArgs {
    fn resolve(&self) -> Result<Config> {
        let mut config = load_config(self.config.as_deref())?;
        let extraction: &mut ExtractionConfig = &mut config.extraction;

        if let Some(v) = self.max_phrase_span {
            extraction.max_phrase_span = v;
        }
        if let Some(v) = self.max_phrase_length {
            extraction.max_phrase_length = v;
        }
        if let Some(v) = self.max_nonterminals {
            extraction.max_nonterminals = v;
        }
        if let Some(v) = self.min_nonterminal_span {
            extraction.min_nonterminal_span = v;
        }
        extraction.validate()?;

        Ok(config)
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            corpus,
            index,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let meta = compile_corpus(&corpus, &index, &config.index)?;
            println!(
                "Compiled {} sentences ({} words, {} excluded) into {}",
                meta.sentence_count,
                meta.word_count,
                meta.excluded_count,
                index.display()
            );
        }
        Commands::Extract {
            index,
            sentences,
            limits,
            json,
            tree,
        } => {
            let config = limits.resolve()?;
            run_extract(&index, &sentences, &config, json, tree)?;
        }
        Commands::Stats { index } => {
            stats::show_stats(&index)?;
        }
        Commands::Lookup {
            index,
            phrase,
            limits,
            limit,
        } => {
            let config = limits.resolve()?;
            run_lookup(&index, &phrase.join(" "), &config, limit)?;
        }
    }

    Ok(())
}

fn run_extract(
    index_path: &Path,
    sentences_path: &Path,
    config: &Config,
    json: bool,
    show_tree: bool,
) -> Result<()> {
    let loaded = SuffixArrayReader::open(index_path)?.load(&config.index)?;
    let text = std::fs::read_to_string(sentences_path)
        .with_context(|| format!("Failed to read {}", sentences_path.display()))?;
    let sentences: Vec<_> = text
        .lines()
        .map(|line| loaded.vocab.encode_query(line))
        .collect();

    if show_tree {
        for (i, sentence) in sentences.iter().enumerate() {
            let tree = PrefixTree::build(&loaded.suffix_array, sentence, &config.extraction)?;
            println!("# sentence {} ({} nodes)", i, tree.size());
            print!("{}", tree.to_tree_string(Some(&loaded.vocab)));
        }
        return Ok(());
    }

    let grammars = extract::extract_batch(
        &loaded.suffix_array,
        &sentences,
        &config.extraction,
        Some(&loaded.vocab),
    )?;

    for grammar in &grammars {
        if json {
            println!("{}", serde_json::to_string(grammar)?);
        } else {
            print_grammar(grammar);
        }
    }

    Ok(())
}

fn print_grammar(grammar: &SentenceGrammar) {
    println!(
        "# sentence {}: {} words, {} tree nodes, {} patterns",
        grammar.sentence_index,
        grammar.length,
        grammar.tree_size,
        grammar.patterns.len()
    );
    for pattern in &grammar.patterns {
        println!("{}\t{}", pattern.count, pattern.pattern);
    }
    println!();
}

fn run_lookup(index_path: &Path, phrase: &str, config: &Config, limit: usize) -> Result<()> {
    let loaded = SuffixArrayReader::open(index_path)?.load(&config.index)?;

    let Some(pattern) = Pattern::parse(phrase, &loaded.vocab) else {
        println!("0 occurrences (unknown word)");
        return Ok(());
    };

    let matches = loaded
        .suffix_array
        .matches_for(&pattern, config.extraction.intersect_limits())?;
    println!("{} occurrences of '{}'", matches.len(), pattern.display_with(&loaded.vocab));

    let corpus = loaded.suffix_array.corpus();
    for phrase in matches.iter().take(limit) {
        let Some((start, end)) = phrase.span() else {
            continue;
        };
        let words: Vec<_> = corpus.words()[start as usize..end as usize]
            .iter()
            .map(|&w| loaded.vocab.word(w).unwrap_or("?"))
            .collect();
        println!("  sentence {}: {}", phrase.sentence(), words.join(" "));
    }

    Ok(())
}
