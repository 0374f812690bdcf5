//! Shared types for lexicon-backed lemmatization.
//!
//! [`Language`] is the closed set of languages a model can exist for,
//! [`Pos`] mirrors the Universal Dependencies part-of-speech tag set, and
//! [`Annotation`] is what a model hands back for every token it sees. The
//! [`Annotator`] trait is the seam between the word-counting pipeline and
//! whatever model implementation sits behind it.
//!
//! ```rust
//! use lemma_types::{Language, Pos};
//!
//! let lang: Language = "fr".parse().unwrap();
//! assert_eq!(lang.code(), "fr");
//! assert_eq!(Pos::from_tag("NOUN"), Some(Pos::Noun));
//! assert!(Pos::Verb.is_content_word());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages a lemmatization model can be selected for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    Fr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::De, Language::Fr];

    /// Two-letter tag used in requests and model file names.
    pub fn code(self) -> &'static str {
        match self {
            Language::De => "de",
            Language::Fr => "fr",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::De => "German",
            Language::Fr => "French",
        }
    }

    /// Position of the language in [`Language::ALL`], handy for fixed tables.
    pub fn index(self) -> usize {
        match self {
            Language::De => 0,
            Language::Fr => 1,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LanguageError {
    #[error("unsupported language {0:?} (expected one of: de, fr)")]
    Unsupported(String),
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "de" => Ok(Language::De),
            "fr" => Ok(Language::Fr),
            _ => Err(LanguageError::Unsupported(raw.to_string())),
        }
    }
}

/// Universal Dependencies part-of-speech tags.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Pos {
    /// Parse an upper-case UPOS tag (`NOUN`, `VERB`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let pos = match tag {
            "ADJ" => Pos::Adj,
            "ADP" => Pos::Adp,
            "ADV" => Pos::Adv,
            "AUX" => Pos::Aux,
            "CCONJ" => Pos::Cconj,
            "DET" => Pos::Det,
            "INTJ" => Pos::Intj,
            "NOUN" => Pos::Noun,
            "NUM" => Pos::Num,
            "PART" => Pos::Part,
            "PRON" => Pos::Pron,
            "PROPN" => Pos::Propn,
            "PUNCT" => Pos::Punct,
            "SCONJ" => Pos::Sconj,
            "SYM" => Pos::Sym,
            "VERB" => Pos::Verb,
            "X" => Pos::X,
            _ => return None,
        };
        Some(pos)
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::X => "X",
        }
    }

    /// Nouns, verbs and adjectives; everything else counts as a function word.
    pub fn is_content_word(self) -> bool {
        matches!(self, Pos::Noun | Pos::Verb | Pos::Adj)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One reading of a word form as stored in a lexicon.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Analysis<'a> {
    pub lemma: &'a str,
    pub pos: Pos,
    /// Relative frequency of this reading; higher wins when nothing else decides.
    pub weight: u32,
}

/// A token as annotated by a model.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    pub is_alpha: bool,
}

impl Annotation {
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, pos: Pos) -> Self {
        let text = text.into();
        let is_alpha = is_alphabetic(&text);
        Self {
            text,
            lemma: lemma.into(),
            pos,
            is_alpha,
        }
    }
}

/// True when the text is non-empty and every character is a letter.
pub fn is_alphabetic(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_alphabetic)
}

/// A lemmatization / tagging model.
///
/// Implementations receive a whole document at once so that tagging can use
/// the surrounding tokens, and return one annotation per token in order.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Vec<Annotation>;
}
