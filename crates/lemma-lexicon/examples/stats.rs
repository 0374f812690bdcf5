use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lemma_lexicon::{LoadMode, Lexicon};

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p lemma-lexicon --example stats -- <lexicon.tsv>")?;

    let lex = Lexicon::load_with_mode(&path, LoadMode::Mmap)
        .with_context(|| format!("loading lexicon from {}", path.display()))?;

    let mut per_tag: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut ambiguous = 0usize;
    for (_, readings) in lex.iter() {
        if readings.len() > 1 {
            ambiguous += 1;
        }
        for reading in readings {
            *per_tag.entry(reading.pos.as_tag()).or_default() += 1;
        }
    }

    println!("Lexicon: {}", path.display());
    println!("  lines:           {}", lex.entry_count());
    println!("  forms:           {}", lex.form_count());
    println!("  lemmas:          {}", lex.lemma_count());
    println!("  ambiguous forms: {}", ambiguous);
    for (tag, count) in per_tag {
        println!("  {:<6} {}", tag, count);
    }

    Ok(())
}
