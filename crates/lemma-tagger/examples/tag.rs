use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use lemma_lexicon::LoadMode;
use lemma_tagger::Tagger;
use lemma_types::{Annotator, Language};

const USAGE: &str =
    "usage: cargo run -p lemma-tagger --example tag -- <de|fr> <lexicon.tsv> [--demo | <text>]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let language: Language = args.next().context(USAGE)?.parse()?;
    let lexicon = args.next().map(PathBuf::from).context(USAGE)?;
    let text = match args.next() {
        Some(arg) if arg == "--demo" => match language {
            Language::Fr => "les enfants mangeaient des pommes rouges dans le jardin".to_string(),
            Language::De => "die kleinen kinder haben gestern äpfel gegessen".to_string(),
        },
        Some(arg) => arg,
        None => bail!(USAGE),
    };
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let tagger = Tagger::load(language, &lexicon, LoadMode::Mmap)
        .with_context(|| format!("loading lexicon from {}", lexicon.display()))?;

    println!("Lexicon: {} ({})", lexicon.display(), language.name());
    for token in tagger.annotate(&text) {
        println!(
            "  {:<16} {:<16} {:<6} {}",
            token.text,
            token.lemma,
            token.pos,
            if token.is_alpha { "" } else { "(non-alpha)" }
        );
    }

    Ok(())
}
