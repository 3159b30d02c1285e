//! Bounded similarity scores over normalized strings.

use std::collections::{HashMap, HashSet};

/// Character-bigram Dice coefficient in `[0, 1]`.
///
/// Equal non-empty strings score 1.0; an empty string or a string with no
/// bigrams (shorter than two characters) scores 0.0. The intersection is a
/// multiset intersection: each shared bigram instance is consumed at most
/// once, so `"AAAA"` vs `"AA"` scores 0.5, not 1.0.
pub fn bigram_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let a_pairs = bigrams(a);
    let b_pairs = bigrams(b);
    if a_pairs.is_empty() || b_pairs.is_empty() {
        return 0.0;
    }

    let mut remaining: HashMap<[char; 2], usize> = HashMap::with_capacity(b_pairs.len());
    for pair in &b_pairs {
        *remaining.entry(*pair).or_insert(0) += 1;
    }

    let mut intersection = 0usize;
    for pair in &a_pairs {
        if let Some(count) = remaining.get_mut(pair) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    (2.0 * intersection as f64) / (a_pairs.len() + b_pairs.len()) as f64
}

fn bigrams(s: &str) -> Vec<[char; 2]> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| [w[0], w[1]]).collect()
}

/// Blended header score: `0.65 * dice + 0.35 * token_overlap`.
///
/// The bigram part is robust to the word-order and spacing noise typical of
/// free-form request lines; the token part rewards genuinely shared
/// vocabulary. Token overlap is the share of unique query tokens present in
/// the candidate's token set. When either side has no tokens the score falls
/// back to the plain bigram similarity.
pub fn header_score(
    query: &str,
    candidate: &str,
    query_tokens: &[String],
    candidate_tokens: &[String],
) -> f64 {
    let dice = bigram_similarity(query, candidate);
    if query_tokens.is_empty() || candidate_tokens.is_empty() {
        return dice;
    }

    let candidate_set: HashSet<&str> = candidate_tokens.iter().map(String::as_str).collect();
    let unique_query: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();
    let overlap = unique_query
        .iter()
        .filter(|token| candidate_set.contains(**token))
        .count();
    let token_score = overlap as f64 / unique_query.len() as f64;

    0.65 * dice + 0.35 * token_score
}
