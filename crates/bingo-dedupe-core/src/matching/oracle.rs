use std::collections::BTreeSet;

use crate::error::Result;

/// One candidate that scored at or above the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCandidate {
    /// Index into the candidate slice passed to the oracle.
    pub index: usize,
    /// Similarity in `0..=100`.
    pub score: u8,
}

/// Ranks candidates by similarity to a query.
///
/// Results are sorted by descending score; ordering among equal scores is up
/// to the implementation.
pub trait SimilarityOracle {
    fn best_matches(
        &self,
        query: &str,
        candidates: &[&str],
        score_cutoff: u8,
    ) -> Result<Vec<ScoredCandidate>>;
}

/// Weighted fuzzy ratio over normalized strings, built on `strsim`.
///
/// Takes the best of a plain edit ratio, token-sorted and token-set ratios, and
/// (for strings of very different length) a best-window partial ratio.
#[derive(Debug, Clone, Default)]
pub struct FuzzyOracle;

impl FuzzyOracle {
    pub fn new() -> Self {
        Self
    }

    /// Score two raw strings in `0..=100`.
    pub fn score(&self, left: &str, right: &str) -> u8 {
        let left = normalize(left);
        let right = normalize(right);
        if left.is_empty() || right.is_empty() {
            return 0;
        }
        if left == right {
            return 100;
        }

        let base = ratio(&left, &right);
        let (short_len, long_len) = {
            let (a, b) = (left.chars().count(), right.chars().count());
            (a.min(b) as f64, a.max(b) as f64)
        };
        let len_ratio = long_len / short_len;

        let best = if len_ratio < 1.5 {
            let token_sort = ratio(&sorted_tokens(&left), &sorted_tokens(&right));
            let token_set = token_set_ratio(&left, &right);
            base.max(0.95 * token_sort.max(token_set))
        } else {
            let scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
            let partial = partial_ratio(&left, &right);
            let token_partial = partial_ratio(&sorted_tokens(&left), &sorted_tokens(&right));
            base.max(partial * scale).max(0.95 * scale * token_partial)
        };

        (best * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

impl SimilarityOracle for FuzzyOracle {
    fn best_matches(
        &self,
        query: &str,
        candidates: &[&str],
        score_cutoff: u8,
    ) -> Result<Vec<ScoredCandidate>> {
        let mut results: Vec<ScoredCandidate> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| ScoredCandidate {
                index,
                score: self.score(query, candidate),
            })
            .filter(|scored| scored.score >= score_cutoff)
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(results)
    }
}

/// Lowercase, replace punctuation with spaces, collapse whitespace.
fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ratio(left: &str, right: &str) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(left, right)
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set_ratio(left: &str, right: &str) -> f64 {
    let left_tokens: BTreeSet<&str> = left.split_whitespace().collect();
    let right_tokens: BTreeSet<&str> = right.split_whitespace().collect();

    let shared = join(left_tokens.intersection(&right_tokens));
    let left_only = join(left_tokens.difference(&right_tokens));
    let right_only = join(right_tokens.difference(&left_tokens));

    let combined_left = join_nonempty(&shared, &left_only);
    let combined_right = join_nonempty(&shared, &right_only);

    let mut best = ratio(&combined_left, &combined_right);
    if !shared.is_empty() {
        best = best
            .max(ratio(&shared, &combined_left))
            .max(ratio(&shared, &combined_right));
    }
    best
}

/// Best ratio of the shorter string against every same-length window of the longer.
fn partial_ratio(left: &str, right: &str) -> f64 {
    let (short, long) = if left.chars().count() <= right.chars().count() {
        (left, right)
    } else {
        (right, left)
    };
    let long_chars: Vec<char> = long.chars().collect();
    let window = short.chars().count();
    if window == 0 {
        return 0.0;
    }

    let mut best = 0.0_f64;
    for start in 0..=(long_chars.len() - window) {
        let slice: String = long_chars[start..start + window].iter().collect();
        best = best.max(ratio(short, &slice));
        if best >= 1.0 {
            break;
        }
    }
    best
}

fn join<S: AsRef<str>>(tokens: impl Iterator<Item = S>) -> String {
    tokens
        .map(|token| token.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_nonempty(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{first} {second}"),
    }
}
