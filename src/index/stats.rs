use crate::index::suffix_array::SuffixArrayReader;
use anyhow::Result;
use std::path::Path;

/// Display index statistics
pub fn show_stats(index_path: &Path) -> Result<()> {
    let reader = SuffixArrayReader::open(index_path)?;
    let stats = reader.stats();
    let meta = reader.meta();

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Index location:   {}", index_path.display());
    println!("Index version:    {}", meta.version);
    println!("Sentences:        {}", stats.sentence_count);
    println!("Excluded:         {}", meta.excluded_count);
    println!("Words:            {}", stats.word_count);
    println!("Vocabulary:       {}", stats.vocab_size);
    if stats.sentence_count > 0 {
        println!(
            "Mean length:      {:.1}",
            stats.word_count as f64 / stats.sentence_count as f64
        );
    }
    println!();
    println!("Index size:       {}", format_size(stats.file_size));

    Ok(())
}

/// Format byte size to human readable
pub(crate) fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
