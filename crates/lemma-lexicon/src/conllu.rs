//! Build lexicon files from Universal Dependencies treebanks.
//!
//! CoNLL-U token lines carry `ID FORM LEMMA UPOS ...` in their first four
//! columns, which map directly onto the lexicon's `form lemma UPOS` fields.
//! Each distinct (form, lemma, tag) triple becomes one lexicon line whose
//! weight is the number of times it occurred.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use lemma_types::Pos;

const UNSPECIFIED: &str = "_";

#[derive(Default)]
pub struct LexiconBuilder {
    counts: BTreeMap<(String, String, Pos), u32>,
    tokens: usize,
}

impl LexiconBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every word token of a CoNLL-U document.
    ///
    /// Comments, blank lines, multiword ranges (`3-4`) and empty nodes
    /// (`5.1`) are skipped, as are tokens without a lemma or tag or with
    /// whitespace in the form.
    pub fn add_conllu(&mut self, reader: impl BufRead) -> Result<()> {
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read line {}", lineno + 1))?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 4 {
                anyhow::bail!(
                    "line {}: expected at least 4 tab-separated columns, got {}",
                    lineno + 1,
                    fields.len()
                );
            }
            let (id, form, lemma, tag) = (fields[0], fields[1], fields[2], fields[3]);
            if id.contains(['-', '.']) {
                continue;
            }
            if lemma == UNSPECIFIED || tag == UNSPECIFIED || form.contains(char::is_whitespace) {
                continue;
            }
            let pos = Pos::from_tag(tag)
                .with_context(|| format!("line {}: unknown tag {tag:?}", lineno + 1))?;

            let count = self
                .counts
                .entry((form.to_lowercase(), lemma.to_string(), pos))
                .or_default();
            *count = count.saturating_add(1);
            self.tokens += 1;
        }
        Ok(())
    }

    /// Word tokens accepted so far.
    pub fn token_count(&self) -> usize {
        self.tokens
    }

    /// Distinct lexicon lines that [`write_tsv`](Self::write_tsv) will emit.
    pub fn entry_count(&self) -> usize {
        self.counts.len()
    }

    pub fn write_tsv(&self, mut out: impl Write) -> Result<()> {
        writeln!(out, "# form\tlemma\tupos\tweight")?;
        for ((form, lemma, pos), count) in &self.counts {
            writeln!(out, "{form}\t{lemma}\t{pos}\t{count}")?;
        }
        out.flush()?;
        Ok(())
    }
}
