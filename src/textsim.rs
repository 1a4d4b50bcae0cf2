//! Token-set ratio (§4.3), built on `strsim`'s Levenshtein distance. No
//! crate provides `thefuzz`-style token-set ratio directly, so this ports
//! its semantics on top of a real distance primitive: tokenize, split into
//! the intersection and the two set-differences, rejoin each into a
//! string, and take the best Levenshtein ratio among three pairings.

use std::collections::BTreeSet;

/// Token-set ratio, 0-100, matching `thefuzz.fuzz.token_set_ratio` semantics.
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 100;
    }

    let intersection: BTreeSet<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: BTreeSet<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: BTreeSet<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let sorted_intersection = join_sorted(&intersection);
    let combined_a = join_sorted(&union(&intersection, &only_a));
    let combined_b = join_sorted(&union(&intersection, &only_b));

    let mut best = ratio(&combined_a, &combined_b);
    best = best.max(ratio(&sorted_intersection, &combined_a));
    best = best.max(ratio(&sorted_intersection, &combined_b));
    best
}

fn union<'a>(left: &BTreeSet<&'a str>, right: &BTreeSet<&'a str>) -> BTreeSet<&'a str> {
    left.union(right).copied().collect()
}

fn join_sorted(tokens: &BTreeSet<&str>) -> String {
    tokens.iter().copied().collect::<Vec<_>>().join(" ")
}

fn tokenize(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}

/// Levenshtein-distance-derived similarity ratio, 0-100, as used by
/// `difflib`/`thefuzz`'s underlying `ratio()`: `100 * (1 - distance / max_len)`.
pub fn ratio(a: &str, b: &str) -> u32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let distance = strsim::levenshtein(a, b);
    let similarity = 1.0 - (distance as f64 / max_len as f64);
    (similarity * 100.0).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(token_set_ratio("jane tan", "jane tan"), 100);
        assert_eq!(ratio("jane tan", "jane tan"), 100);
    }

    #[test]
    fn reordered_tokens_score_100() {
        assert_eq!(token_set_ratio("tan jane", "jane tan"), 100);
    }

    #[test]
    fn subset_tokens_score_highly() {
        // token-set ratio is forgiving of one side containing extra tokens
        // the other doesn't.
        let score = token_set_ratio("jane tan wei ling", "jane tan");
        assert!(score >= 90, "expected high score, got {score}");
    }

    #[test]
    fn unrelated_strings_score_low() {
        let score = token_set_ratio("jane tan", "mohammed ali");
        assert!(score < 40, "expected low score, got {score}");
    }

    #[test]
    fn empty_inputs_score_100() {
        assert_eq!(token_set_ratio("", ""), 100);
    }
}
