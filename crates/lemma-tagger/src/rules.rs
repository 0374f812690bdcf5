//! Inflection rules used when a form is missing from the lexicon.
//!
//! Each rule rewrites the end (and optionally the start) of a lower-cased
//! form into a lemma guess. Guesses are only kept when the lexicon confirms
//! the lemma exists for that tag, so the tables can be generous.

use lemma_types::{Language, Pos};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rule {
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub replacement: &'static str,
}

const fn r(suffix: &'static str, replacement: &'static str) -> Rule {
    Rule {
        prefix: "",
        suffix,
        replacement,
    }
}

const fn circumfix(prefix: &'static str, suffix: &'static str, replacement: &'static str) -> Rule {
    Rule {
        prefix,
        suffix,
        replacement,
    }
}

/// Shortest stem (in chars) a rule may leave behind.
const MIN_STEM: usize = 2;

impl Rule {
    pub fn apply(&self, form: &str) -> Option<String> {
        let rest = form.strip_prefix(self.prefix)?;
        let stem = rest.strip_suffix(self.suffix)?;
        if stem.chars().count() < MIN_STEM {
            return None;
        }
        Some(format!("{stem}{}", self.replacement))
    }
}

/// Tags the rules can produce, in the order they are tried.
pub const RULE_TAGS: [Pos; 3] = [Pos::Noun, Pos::Verb, Pos::Adj];

pub fn rules_for(language: Language, pos: Pos) -> &'static [Rule] {
    match (language, pos) {
        (Language::Fr, Pos::Noun) => FR_NOUN,
        (Language::Fr, Pos::Verb) => FR_VERB,
        (Language::Fr, Pos::Adj) => FR_ADJ,
        (Language::De, Pos::Noun) => DE_NOUN,
        (Language::De, Pos::Verb) => DE_VERB,
        (Language::De, Pos::Adj) => DE_ADJ,
        _ => &[],
    }
}

static FR_NOUN: &[Rule] = &[
    r("s", ""),
    r("x", ""),
    r("aux", "al"),
    r("eaux", "eau"),
    r("eux", "eu"),
];

static FR_ADJ: &[Rule] = &[
    r("e", ""),
    r("s", ""),
    r("es", ""),
    r("aux", "al"),
    r("ale", "al"),
    r("ales", "al"),
    r("ive", "if"),
    r("ives", "if"),
    r("ifs", "if"),
    r("euse", "eux"),
    r("euses", "eux"),
    r("enne", "en"),
    r("ennes", "en"),
    r("elle", "el"),
    r("elles", "el"),
    r("ère", "er"),
    r("ères", "er"),
];

static FR_VERB: &[Rule] = &[
    // -er
    r("e", "er"),
    r("es", "er"),
    r("ent", "er"),
    r("ons", "er"),
    r("eons", "er"),
    r("ez", "er"),
    r("ais", "er"),
    r("ait", "er"),
    r("aient", "er"),
    r("eais", "er"),
    r("eait", "er"),
    r("eaient", "er"),
    r("ions", "er"),
    r("iez", "er"),
    r("a", "er"),
    r("ea", "er"),
    r("èrent", "er"),
    r("erai", "er"),
    r("era", "er"),
    r("eront", "er"),
    r("erait", "er"),
    r("eraient", "er"),
    r("é", "er"),
    r("ée", "er"),
    r("és", "er"),
    r("ées", "er"),
    r("ant", "er"),
    r("eant", "er"),
    // -ir
    r("is", "ir"),
    r("it", "ir"),
    r("issons", "ir"),
    r("issez", "ir"),
    r("issent", "ir"),
    r("issait", "ir"),
    r("issant", "ir"),
    r("i", "ir"),
    r("ie", "ir"),
    r("ies", "ir"),
    r("ira", "ir"),
    // -re
    r("s", "re"),
    r("t", "re"),
    r("ons", "re"),
    r("ez", "re"),
    r("ent", "re"),
    r("ait", "re"),
    r("u", "re"),
    r("ue", "re"),
    r("us", "re"),
    r("ues", "re"),
    r("ra", "re"),
];

static DE_NOUN: &[Rule] = &[
    r("e", ""),
    r("en", ""),
    r("n", ""),
    r("er", ""),
    r("ern", ""),
    r("s", ""),
    r("es", ""),
    r("nen", ""),
];

static DE_ADJ: &[Rule] = &[
    r("e", ""),
    r("en", ""),
    r("em", ""),
    r("er", ""),
    r("es", ""),
    r("ere", ""),
    r("eren", ""),
    r("erer", ""),
    r("ste", ""),
    r("sten", ""),
    r("ster", ""),
    r("stes", ""),
];

static DE_VERB: &[Rule] = &[
    r("e", "en"),
    r("st", "en"),
    r("t", "en"),
    r("et", "en"),
    r("est", "en"),
    r("te", "en"),
    r("ten", "en"),
    r("test", "en"),
    r("tet", "en"),
    r("ete", "en"),
    r("eten", "en"),
    circumfix("ge", "t", "en"),
    circumfix("ge", "et", "en"),
    circumfix("ge", "en", "en"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_suffix_rules() {
        assert_eq!(r("eons", "er").apply("mangeons").as_deref(), Some("manger"));
        assert_eq!(r("aux", "al").apply("journaux").as_deref(), Some("journal"));
        assert_eq!(r("s", "").apply("xs"), None);
    }

    #[test]
    fn applies_circumfix_rules() {
        let rule = circumfix("ge", "t", "en");
        assert_eq!(rule.apply("gemacht").as_deref(), Some("machen"));
        assert_eq!(rule.apply("macht"), None);
    }

    #[test]
    fn keeps_accented_stems_intact() {
        assert_eq!(r("ées", "er").apply("créées").as_deref(), Some("créer"));
        assert_eq!(r("en", "").apply("straßen").as_deref(), Some("straß"));
    }

    #[test]
    fn only_content_tags_have_rules() {
        for lang in Language::ALL {
            for pos in RULE_TAGS {
                assert!(!rules_for(lang, pos).is_empty());
            }
            assert!(rules_for(lang, Pos::Det).is_empty());
        }
    }
}
