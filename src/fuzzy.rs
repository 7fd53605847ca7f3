//! Pluggable string-similarity scoring.
//!
//! Practice template matching needs token-order-insensitive similarity
//! ("производственная практика (технологическая)" vs "технологическая
//! производственная практика"). The scorer sits behind a trait so tests
//! can substitute a canned one.

/// Similarity on a 0–100 scale; 100 is an exact match.
pub trait Similarity {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Token-sort ratio: lowercase, split on whitespace, sort tokens, rejoin,
/// then Levenshtein ratio over the joined forms.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenSortRatio;

impl Similarity for TokenSortRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let a = token_sort(a);
        let b = token_sort(b);
        ratio(&a, &b)
    }
}

fn token_sort(s: &str) -> String {
    let mut tokens: Vec<String> = s
        .to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    tokens.sort();
    tokens.join(" ")
}

fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 100;
    }
    let distance = levenshtein(&a, &b);
    (100.0 * (1.0 - distance as f64 / longest as f64)).round() as u8
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Best-scoring candidate, like fuzzywuzzy's `extractOne`.
pub fn best_match<'a, S, I>(scorer: &S, query: &str, candidates: I) -> Option<(&'a str, u8)>
where
    S: Similarity + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (candidate, scorer.score(query, candidate)))
        .max_by_key(|(_, score)| *score)
}
