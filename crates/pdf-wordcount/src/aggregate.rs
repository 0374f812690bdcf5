//! Group annotated tokens by lemma and rank them.

use std::collections::{BTreeMap, BTreeSet};

use lemma_types::{Annotation, Annotator};
use serde::Serialize;

/// Separator between surface forms in the variants column.
pub const VARIANT_SEPARATOR: &str = "/";

/// One output row: every surface form of a lemma and how often the lemma occurred.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct WordCountRow {
    pub variants: String,
    pub count: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LemmaGroups {
    variants: BTreeMap<String, BTreeSet<String>>,
    counts: BTreeMap<String, usize>,
}

impl LemmaGroups {
    pub fn variants(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.variants
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    fn insert(&mut self, annotation: Annotation) {
        *self.counts.entry(annotation.lemma.clone()).or_default() += 1;
        self.variants
            .entry(annotation.lemma)
            .or_default()
            .insert(annotation.text);
    }

    /// Rows ordered by count (descending), ties broken by lemma (ascending).
    pub fn ranked(&self) -> Vec<WordCountRow> {
        let mut ordered: Vec<(&String, usize)> =
            self.counts.iter().map(|(lemma, n)| (lemma, *n)).collect();
        // `counts` iterates in lemma order and the sort is stable.
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        ordered
            .into_iter()
            .map(|(lemma, count)| WordCountRow {
                variants: self.variants[lemma]
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(VARIANT_SEPARATOR),
                count,
            })
            .collect()
    }
}

/// Whether an annotated token is counted at all.
pub fn is_countable(annotation: &Annotation) -> bool {
    annotation.is_alpha && annotation.pos.is_content_word() && annotation.text.chars().count() > 1
}

/// Annotate the whole token stream in one model call and group the content words.
pub fn aggregate<A>(tokens: &[String], annotator: &A) -> LemmaGroups
where
    A: Annotator + ?Sized,
{
    let mut groups = LemmaGroups::default();
    if tokens.is_empty() {
        return groups;
    }
    let text = tokens.join(" ");
    for annotation in annotator.annotate(&text) {
        if is_countable(&annotation) {
            groups.insert(annotation);
        }
    }
    groups
}
