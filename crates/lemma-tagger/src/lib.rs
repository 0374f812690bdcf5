//! Lexicon-backed lemmatizer and part-of-speech tagger.
//!
//! The tagger follows the classic morphy recipe and adds a little context:
//!
//! 1. Look the form up in the lexicon; every reading there is a candidate.
//! 2. If the lexicon does not know the form, apply the language's inflection
//!    rules and keep guesses whose lemma the lexicon confirms.
//! 3. If nothing matched, treat the form as a noun that is its own lemma.
//! 4. When several candidates remain, prefer the tag that fits after the
//!    previous token's tag, then the heavier lexicon reading.
//!
//! # Example
//! ```no_run
//! use lemma_lexicon::LoadMode;
//! use lemma_tagger::Tagger;
//! use lemma_types::{Annotator, Language};
//!
//! # fn main() -> anyhow::Result<()> {
//! let tagger = Tagger::load(Language::Fr, "/path/to/models/fr.tsv", LoadMode::Mmap)?;
//! for token in tagger.annotate("le chat mange") {
//!     println!("{} -> {} [{}]", token.text, token.lemma, token.pos);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p lemma-tagger --example tag -- <lang> <lexicon.tsv> <text>`.

pub mod rules;

use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use lemma_lexicon::{LoadMode, Lexicon};
use lemma_types::{Annotation, Annotator, Language, Pos};

use crate::rules::{RULE_TAGS, Rule, rules_for};

/// Where a candidate reading originated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CandidateSource {
    Lexicon,
    Rule(Rule),
    Fallback,
}

/// A lemma/tag guess for one form, with provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate<'a> {
    pub lemma: Cow<'a, str>,
    pub pos: Pos,
    pub weight: u32,
    pub source: CandidateSource,
}

pub struct Tagger {
    language: Language,
    lexicon: Lexicon,
}

impl Tagger {
    pub fn new(language: Language, lexicon: Lexicon) -> Self {
        Self { language, lexicon }
    }

    /// Load the lexicon for `language` from a file.
    pub fn load(language: Language, path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        let lexicon = Lexicon::load_with_mode(path, mode)
            .with_context(|| format!("load {language} lexicon from {}", path.display()))?;
        Ok(Self::new(language, lexicon))
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Every reading considered for `form`, before context is applied.
    pub fn candidates_for<'a>(&'a self, form: &str) -> Vec<Candidate<'a>> {
        let known: Vec<Candidate<'a>> = self
            .lexicon
            .analyses(form)
            .into_iter()
            .map(|analysis| Candidate {
                lemma: Cow::Borrowed(analysis.lemma),
                pos: analysis.pos,
                weight: analysis.weight,
                source: CandidateSource::Lexicon,
            })
            .collect();
        if !known.is_empty() {
            return known;
        }

        let lower = form.to_lowercase();
        let mut seen: HashSet<(Pos, String)> = HashSet::new();
        let mut out = Vec::new();
        for pos in RULE_TAGS {
            for rule in rules_for(self.language, pos) {
                if let Some(lemma) = rule.apply(&lower)
                    && self.lexicon.lemma_exists(pos, &lemma)
                    && seen.insert((pos, lemma.clone()))
                {
                    out.push(Candidate {
                        lemma: Cow::Owned(lemma),
                        pos,
                        weight: 0,
                        source: CandidateSource::Rule(*rule),
                    });
                }
            }
        }
        if !out.is_empty() {
            return out;
        }

        vec![Candidate {
            lemma: Cow::Owned(lower),
            pos: Pos::Noun,
            weight: 0,
            source: CandidateSource::Fallback,
        }]
    }

    fn annotate_word(&self, word: &str, prev: Option<Pos>) -> Annotation {
        if is_number(word) {
            return Annotation::new(word, word, Pos::Num);
        }
        if !word.chars().any(char::is_alphabetic) {
            return Annotation::new(word, word, Pos::Punct);
        }

        let candidates = self.candidates_for(word);
        let mut best: Option<&Candidate<'_>> = None;
        for cand in &candidates {
            let better = match best {
                None => true,
                Some(cur) => {
                    (context_score(prev, cand.pos), cand.weight)
                        > (context_score(prev, cur.pos), cur.weight)
                }
            };
            if better {
                best = Some(cand);
            }
        }
        match best {
            Some(cand) => Annotation::new(word, cand.lemma.as_ref(), cand.pos),
            None => Annotation::new(word, word.to_lowercase(), Pos::X),
        }
    }

    /// Split text into tokens: whitespace separates words, and hyphenated
    /// words the lexicon does not know are broken at their hyphens.
    pub fn tokenize<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut tokens = Vec::new();
        for word in text.split_whitespace() {
            if !word.contains('-') || self.lexicon.contains_form(word) {
                tokens.push(word);
                continue;
            }
            let mut rest = word;
            while let Some(idx) = rest.find('-') {
                if idx > 0 {
                    tokens.push(&rest[..idx]);
                }
                tokens.push(&rest[idx..idx + 1]);
                rest = &rest[idx + 1..];
            }
            if !rest.is_empty() {
                tokens.push(rest);
            }
        }
        tokens
    }
}

impl Annotator for Tagger {
    fn annotate(&self, text: &str) -> Vec<Annotation> {
        let mut out = Vec::new();
        let mut prev: Option<Pos> = None;
        for token in self.tokenize(text) {
            let annotation = self.annotate_word(token, prev);
            prev = Some(annotation.pos);
            out.push(annotation);
        }
        out
    }
}

/// How well a tag fits right after the previous token's tag.
fn context_score(prev: Option<Pos>, pos: Pos) -> u8 {
    match (prev, pos) {
        (Some(Pos::Det), Pos::Noun | Pos::Adj) => 2,
        (Some(Pos::Pron), Pos::Verb | Pos::Aux) => 2,
        (Some(Pos::Aux), Pos::Verb) => 2,
        (Some(Pos::Adj), Pos::Noun) => 1,
        (Some(Pos::Adp), Pos::Noun | Pos::Det | Pos::Pron) => 1,
        (Some(Pos::Part), Pos::Verb) => 1,
        _ => 0,
    }
}

fn is_number(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
}
