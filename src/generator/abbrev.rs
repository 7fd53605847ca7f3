//! Program abbreviation derivation for group names.
//!
//! Program names on the portal come in several shapes: a short code in
//! parentheses, a «quoted» title, or a plain word sequence polluted with
//! study-mode tokens and course codes. The abbreviation is derived from
//! the best available shape, falling back tier by tier.

use regex::Regex;
use std::sync::LazyLock;

/// Mode/year noise stripped from parenthesized codes.
const NOISE_TOKENS: &[&str] = &[
    "очная",
    "заочная",
    "очно-заочная",
    "вечерняя",
    "форма",
    "обучения",
];

/// Words skipped when building initials.
const STOPWORDS: &[&str] = &["и", "в", "на", "по", "с", "для", "of", "and", "the"];

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]*)\)").unwrap());
static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"«([^»]+)»").unwrap());
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());
/// Course-code artifact: a single letter followed by digits ("б1", "c09.03").
static CODE_ARTIFACT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[а-яa-z]\d").unwrap());

/// Derives a short uppercase abbreviation from a program name.
pub fn derive(program_name: &str) -> String {
    if let Some(code) = parenthesized_code(program_name) {
        return code;
    }
    if let Some(initials) = quoted_initials(program_name) {
        return initials;
    }
    word_initials(program_name)
}

/// Tier 1: content inside parentheses, minus noise tokens, if what
/// remains is a single short token.
fn parenthesized_code(name: &str) -> Option<String> {
    let caps = PARENTHESIZED.captures(name)?;
    let inner = caps[1].to_lowercase();
    let remaining: Vec<&str> = inner
        .split_whitespace()
        .filter(|token| !NOISE_TOKENS.contains(token) && !YEAR.is_match(token))
        .collect();
    match remaining.as_slice() {
        [only] if only.chars().count() <= 6 && only.chars().any(char::is_alphabetic) => {
            Some(only.to_uppercase())
        }
        _ => None,
    }
}

/// Tier 2: initials of a «quoted» title, if at least two letters result.
fn quoted_initials(name: &str) -> Option<String> {
    let caps = QUOTED.captures(name)?;
    let initials = initials_of(&caps[1], true);
    (initials.chars().count() >= 2).then_some(initials)
}

/// Tiers 3–5: initials over the name (parenthesized noise removed), then
/// without stopword skipping, then a single letter duplicated.
fn word_initials(name: &str) -> String {
    let name = PARENTHESIZED.replace_all(name, " ");
    let name = name.as_ref();
    let initials = initials_of(name, true);
    if initials.chars().count() >= 2 {
        return initials;
    }
    let relaxed = initials_of(name, false);
    if relaxed.chars().count() >= 2 {
        return relaxed;
    }
    let fallback = if !initials.is_empty() { initials } else { relaxed };
    match fallback.chars().next() {
        Some(c) => format!("{c}{c}"),
        None => String::new(),
    }
}

fn initials_of(text: &str, skip_stopwords: bool) -> String {
    text.split(|c: char| c.is_whitespace() || c == '-')
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .filter(|token| {
            let lower = token.to_lowercase();
            if skip_stopwords && STOPWORDS.contains(&lower.as_str()) {
                return false;
            }
            !CODE_ARTIFACT.is_match(&lower)
        })
        .filter_map(|token| token.chars().find(|c| c.is_alphabetic()))
        .map(|c| c.to_uppercase().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_parenthesized_code() {
        assert_eq!(derive("09.03.01 Информатика (ИВТ)"), "ИВТ");
        assert_eq!(derive("Программная инженерия (ПИНЖ очная 2023)"), "ПИНЖ");
    }

    #[test]
    fn noisy_parentheses_fall_through_to_initials() {
        // Only mode/year noise inside: tier 1 yields nothing.
        assert_eq!(derive("Прикладная математика (очная 2024)"), "ПМ");
    }

    #[test]
    fn quoted_title_initials() {
        assert_eq!(derive("09.03.02 «Информационные системы и технологии»"), "ИСТ");
    }

    #[test]
    fn word_initials_skip_stopwords_and_codes() {
        assert_eq!(derive("Управление в технических системах б1"), "УТС");
    }

    #[test]
    fn hyphenated_words_contribute_both_initials() {
        assert_eq!(derive("Инженерно-строительное дело"), "ИСД");
    }

    #[test]
    fn single_word_duplicates_its_letter() {
        assert_eq!(derive("Менеджмент"), "ММ");
    }

    #[test]
    fn stopword_only_name_relaxes_skipping() {
        assert_eq!(derive("и на"), "ИН");
    }

    #[test]
    fn empty_name_is_empty() {
        assert_eq!(derive(""), "");
    }
}
