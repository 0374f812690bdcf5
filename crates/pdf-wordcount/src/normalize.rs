//! Turn raw page text into lower-case word tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// A one-letter word glued to the next word by an apostrophe (`l'`, `n'`, `d’`).
static ELISION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w['’]").unwrap());

/// Accented letters kept as-is; other letters are folded to their ASCII base.
const KEPT_ACCENTS: &str = "éàèùâêîôûëïüçßöäÉÀÈÙÂÊÎÔÛËÏÜÇÖÄẞ";

/// Elisions stripped, characters filtered and lower-cased, but not yet split.
pub fn clean_text(text: &str) -> String {
    let without_elisions = ELISION.replace_all(text, "");
    let mut filtered = String::with_capacity(without_elisions.len());
    for c in without_elisions.chars() {
        push_filtered(c, &mut filtered);
    }
    filtered.to_lowercase()
}

pub fn normalize(text: &str) -> Vec<String> {
    clean_text(text)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

fn push_filtered(c: char, out: &mut String) {
    if c.is_ascii_alphabetic() || c.is_whitespace() || c == '-' || KEPT_ACCENTS.contains(c) {
        out.push(c);
        return;
    }
    if !c.is_alphabetic() {
        return;
    }
    if let Some(base) = std::iter::once(c)
        .nfd()
        .next()
        .filter(char::is_ascii_alphabetic)
    {
        out.push(base);
        return;
    }
    // Compatibility forms such as ligatures and full-width letters.
    let compat: String = std::iter::once(c).nfkd().collect();
    if compat.chars().all(|d| d.is_ascii_alphabetic()) {
        out.push_str(&compat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_reference_sentence() {
        assert_eq!(
            normalize("Ce n'est pas l'école, mais l'Écòle2024!"),
            vec!["ce", "est", "pas", "école", "mais", "école"]
        );
    }

    #[test]
    fn strips_typographic_elisions() {
        assert_eq!(normalize("l’arbre s’est dit"), vec!["arbre", "est", "dit"]);
        // Apostrophes inside a word are not elisions.
        assert_eq!(normalize("aujourd'hui"), vec!["aujourdhui"]);
    }

    #[test]
    fn keeps_german_letters_and_hyphens() {
        assert_eq!(
            normalize("Die STRASSE, die Straße; Öl-Förderung (2x)"),
            vec!["die", "strasse", "die", "straße", "öl-förderung", "x"]
        );
    }

    #[test]
    fn folds_unsupported_accents() {
        assert_eq!(normalize("mañana Čech"), vec!["manana", "cech"]);
        assert_eq!(normalize("日本"), Vec::<String>::new());
    }

    #[test]
    fn expands_ligatures_and_full_width_letters() {
        assert_eq!(normalize("l’oﬃce ﬂeurit"), vec!["office", "fleurit"]);
        assert_eq!(normalize("ＰＤＦ ﬁn"), vec!["pdf", "fin"]);
    }

    #[test]
    fn stray_hyphens_survive_as_tokens() {
        assert_eq!(normalize("a - b"), vec!["a", "-", "b"]);
    }

    #[test]
    fn empty_and_blank_input() {
        assert!(normalize("").is_empty());
        assert!(normalize(" \n\t 123 !!").is_empty());
    }
}
