//! Load form/lemma/tag lexicons with zero-copy lemma text.
//!
//! A lexicon file is plain UTF-8 with one reading per line:
//!
//! ```text
//! # form      lemma     UPOS   [weight]
//! mangeait    manger    VERB   12
//! écoles      école     NOUN
//! ```
//!
//! Fields are tab-separated; the weight column is optional and defaults to 1.
//! Blank lines and lines starting with `#` are ignored. Forms are matched
//! case-insensitively. Lemma strings borrow from the original bytes, which
//! are either memory-mapped or read into an owned buffer ([`LoadMode`]).
//!
//! # Example
//! ```no_run
//! use lemma_lexicon::{LoadMode, Lexicon};
//! use lemma_types::Pos;
//!
//! # fn main() -> anyhow::Result<()> {
//! let lex = Lexicon::load_with_mode("/path/to/models/fr.tsv", LoadMode::Mmap)?;
//! for analysis in lex.analyses("mangeait") {
//!     println!("{} {}", analysis.lemma, analysis.pos);
//! }
//! assert!(lex.lemma_exists(Pos::Verb, "manger"));
//! # Ok(()) }
//! ```
//!
//! Lexicon files can be built from Universal Dependencies treebanks with
//! [`conllu::LexiconBuilder`].
//!
//! For a runnable demo, see `cargo run -p lemma-lexicon --example stats -- <lexicon.tsv>`.

pub mod conllu;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use lemma_types::{Analysis, Pos};
use memmap2::Mmap;

/// Strategy for loading lexicon files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy).
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Clone, Copy)]
struct TextRef {
    start: usize,
    len: usize,
}

#[derive(Clone, Copy)]
struct EntryData {
    lemma: TextRef,
    pos: Pos,
    weight: u32,
}

/// In-memory view of a lexicon backed by mmap or an owned buffer.
pub struct Lexicon {
    buffer: Buffer,
    forms: HashMap<String, Vec<EntryData>>,
    lemmas: HashSet<(Pos, String)>,
    entries: usize,
}

impl Lexicon {
    /// Load a lexicon file, memory-mapping it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a lexicon file choosing between mmap and an owned buffer.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        let buffer = load_file(path, mode)?;
        Self::from_buffer(buffer).with_context(|| format!("parse lexicon {}", path.display()))
    }

    /// Build a lexicon from bytes already in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_buffer(Buffer::Owned(bytes.into()))
    }

    fn from_buffer(buffer: Buffer) -> Result<Self> {
        let mut forms: HashMap<String, Vec<EntryData>> = HashMap::new();
        let mut lemmas = HashSet::new();
        let mut entries = 0usize;

        let root = buffer.as_slice();
        for (lineno, raw_line) in root.split(|b| *b == b'\n').enumerate() {
            let line = strip_cr(raw_line);
            if line.is_empty() || line.first() == Some(&b'#') {
                continue;
            }
            let line_str = std::str::from_utf8(line)
                .with_context(|| format!("line {} is not valid utf-8", lineno + 1))?;
            if line_str.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line_str.split('\t').map(str::trim).collect();
            if fields.len() < 3 || fields.len() > 4 {
                anyhow::bail!(
                    "line {}: expected 3 or 4 tab-separated fields, got {}",
                    lineno + 1,
                    fields.len()
                );
            }
            let (form, lemma, tag) = (fields[0], fields[1], fields[2]);
            if form.is_empty() || lemma.is_empty() {
                anyhow::bail!("line {}: empty form or lemma", lineno + 1);
            }
            let pos = Pos::from_tag(&tag.to_ascii_uppercase())
                .with_context(|| format!("line {}: unknown tag {tag:?}", lineno + 1))?;
            let weight = match fields.get(3) {
                Some(raw) if !raw.is_empty() => raw
                    .parse::<u32>()
                    .with_context(|| format!("line {}: weight {raw:?}", lineno + 1))?,
                _ => 1,
            };

            let lemma_ref = text_ref_str(root, lemma);
            let readings = forms.entry(normalize_form(form)).or_default();
            let existing = readings
                .iter_mut()
                .find(|e| e.pos == pos && slice(root, e.lemma) == lemma.as_bytes());
            match existing {
                Some(entry) => entry.weight = entry.weight.saturating_add(weight),
                None => readings.push(EntryData {
                    lemma: lemma_ref,
                    pos,
                    weight,
                }),
            }
            lemmas.insert((pos, normalize_form(lemma)));
            entries += 1;
        }

        // Stable sort keeps file order among equally weighted readings.
        for readings in forms.values_mut() {
            readings.sort_by(|a, b| b.weight.cmp(&a.weight));
        }

        Ok(Self {
            buffer,
            forms,
            lemmas,
            entries,
        })
    }

    /// All readings of a form, heaviest first.
    pub fn analyses(&self, form: &str) -> Vec<Analysis<'_>> {
        self.forms
            .get(&normalize_form(form))
            .map(|readings| {
                readings
                    .iter()
                    .map(|entry| Analysis {
                        lemma: self.text(entry.lemma),
                        pos: entry.pos,
                        weight: entry.weight,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains_form(&self, form: &str) -> bool {
        self.forms.contains_key(&normalize_form(form))
    }

    /// Check whether some line of the lexicon names `lemma` with this tag.
    pub fn lemma_exists(&self, pos: Pos, lemma: &str) -> bool {
        self.lemmas.contains(&(pos, normalize_form(lemma)))
    }

    /// Distinct (lower-cased) forms.
    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    /// Distinct (tag, lemma) pairs.
    pub fn lemma_count(&self) -> usize {
        self.lemmas.len()
    }

    /// Lines read, duplicates included.
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Iterate every form with its readings, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec<Analysis<'_>>)> + '_ {
        self.forms.keys().map(|form| (form.as_str(), self.analyses(form)))
    }

    fn text(&self, r: TextRef) -> &str {
        std::str::from_utf8(slice(self.buffer.as_slice(), r)).expect("lexicon text is valid utf8")
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn text_ref_str(root: &[u8], token: &str) -> TextRef {
    let start = token.as_ptr() as usize - root.as_ptr() as usize;
    TextRef {
        start,
        len: token.len(),
    }
}

fn slice(root: &[u8], r: TextRef) -> &[u8] {
    &root[r.start..r.start + r.len]
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}

fn normalize_form(text: &str) -> String {
    text.trim().to_lowercase()
}
