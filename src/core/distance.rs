// File: src/core/distance.rs
use crate::core::confusion::{cost, is_phonetic_confusion, is_visual_confusion, is_vowel};

/// Cost of writing `from` where `to` was meant.
fn substitution_cost(from: char, to: char) -> f32 {
    if from == to {
        0.0
    } else if is_visual_confusion(from, to) {
        cost::VISUAL
    } else if is_phonetic_confusion(from, to) {
        cost::PHONETIC
    } else if is_vowel(from) && is_vowel(to) {
        cost::VOWEL
    } else {
        cost::DEFAULT
    }
}

/// Edit distance that discounts dyslexia-typical errors: visual and phonetic
/// letter swaps, vowel-for-vowel substitutions and adjacent transpositions.
///
/// Always `>= 0`, and `0` exactly when `a == b`.
/// Complexity: O(|a| * |b|) time and space.
pub fn weighted_distance(a: &str, b: &str) -> f32 {
    if a == b {
        return 0.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());

    let mut dp = vec![vec![0.0f32; m + 1]; n + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i as f32;
    }
    for j in 0..=m {
        dp[0][j] = j as f32;
    }

    for i in 1..=n {
        for j in 1..=m {
            let deletion = dp[i - 1][j] + cost::INDEL;
            let insertion = dp[i][j - 1] + cost::INDEL;
            let substitution = dp[i - 1][j - 1] + substitution_cost(a[i - 1], b[j - 1]);
            let mut best = deletion.min(insertion).min(substitution);

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(dp[i - 2][j - 2] + cost::TRANSPOSITION);
            }
            dp[i][j] = best;
        }
    }
    dp[n][m]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_levenshtein(a: &str, b: &str) -> usize {
        strsim::levenshtein(a, b)
    }

    #[test]
    fn identical_strings_are_free() {
        for s in ["", "a", "friend", "bdpq", "naïve"] {
            assert_eq!(weighted_distance(s, s), 0.0);
        }
    }

    #[test]
    fn empty_side_costs_one_per_char() {
        assert_eq!(weighted_distance("", "abc"), 3.0);
        assert_eq!(weighted_distance("abcd", ""), 4.0);
    }

    #[test]
    fn visual_swap_is_cheaper_than_random_swap() {
        let visual = weighted_distance("bad", "dad");
        let random = weighted_distance("bad", "zaz");
        assert!((visual - 0.4).abs() < 1e-6);
        assert!(visual < random);
    }

    #[test]
    fn substitution_cost_tiers() {
        assert_eq!(substitution_cost('b', 'd'), 0.4);
        assert_eq!(substitution_cost('f', 'v'), 0.6);
        assert_eq!(substitution_cost('e', 'a'), 0.7);
        assert_eq!(substitution_cost('x', 'r'), 1.0);
        // visual wins over phonetic when both could apply: f -> t is visual only
        assert_eq!(substitution_cost('f', 't'), 0.4);
    }

    #[test]
    fn transposition_is_discounted() {
        let d = weighted_distance("teh", "the");
        assert!((d - 0.5).abs() < 1e-6);
        assert!(d < plain_levenshtein("teh", "the") as f32);
    }

    #[test]
    fn direction_matters_for_asymmetric_entries() {
        // 'b' lists 'h' as visual, 'h' does not list 'b'.
        assert!((weighted_distance("bat", "hat") - 0.4).abs() < 1e-6);
        assert_eq!(weighted_distance("hat", "bat"), 1.0);
    }

    #[test]
    fn never_negative() {
        let words = ["", "ab", "ba", "abc", "cab", "frend", "friend", "qpdb"];
        for a in words {
            for b in words {
                assert!(weighted_distance(a, b) >= 0.0, "{a} vs {b}");
            }
        }
    }
}
