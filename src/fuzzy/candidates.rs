// File: src/fuzzy/candidates.rs
use crate::core::distance::weighted_distance;
use crate::core::types::ScoredCandidate;
use crate::fuzzy::phonetic::{MetaphoneFingerprint, PhoneticFingerprint};
use rayon::prelude::*;
use std::collections::HashMap;

/// Tunables for the two-pass sieve.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorLimits {
    /// Max plain edit distance between fingerprints for a phonetic match.
    pub phonetic_tolerance: usize,
    /// Max length difference for the weighted-distance pass.
    pub length_window: usize,
    /// Max weighted distance accepted by the second pass.
    pub max_distance: f32,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        Self {
            phonetic_tolerance: 1,
            length_window: 2,
            max_distance: 3.0,
        }
    }
}

/// Sieves a dictionary into a shortlist of plausible corrections.
///
/// Pass one accepts anything that *sounds* like the misspelling ("frend" and
/// "friend" share a fingerprint). Pass two catches short visual typos, but only
/// runs the weighted distance on words of similar length.
pub struct CandidateGenerator {
    fingerprint: Box<dyn PhoneticFingerprint>,
    limits: GeneratorLimits,
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self::new(Box::new(MetaphoneFingerprint::new()), GeneratorLimits::default())
    }
}

impl CandidateGenerator {
    pub fn new(fingerprint: Box<dyn PhoneticFingerprint>, limits: GeneratorLimits) -> Self {
        Self { fingerprint, limits }
    }

    /// Best match first, no duplicates.
    pub fn generate(&self, misspelled: &str, dictionary: &[String], top_n: usize) -> Vec<String> {
        self.generate_scored(misspelled, dictionary, top_n)
            .into_iter()
            .map(|c| c.word)
            .collect()
    }

    /// Same as [`generate`](Self::generate) but keeps each word's weighted distance.
    pub fn generate_scored(&self, misspelled: &str, dictionary: &[String], top_n: usize) -> Vec<ScoredCandidate> {
        let misspelled = misspelled.trim().to_lowercase();
        if misspelled.is_empty() || top_n == 0 {
            return vec![];
        }
        let target_code = self.fingerprint.fingerprint(&misspelled);
        let target_len = misspelled.chars().count();

        let accepted: Vec<(String, f32)> = dictionary
            .par_iter()
            .filter_map(|entry| self.sieve(entry, &misspelled, &target_code, target_len))
            .collect();

        // Case-folding can map two entries onto one word; keep the closer one.
        let mut best: HashMap<String, f32> = HashMap::with_capacity(accepted.len());
        for (word, distance) in accepted {
            best.entry(word)
                .and_modify(|d| *d = d.min(distance))
                .or_insert(distance);
        }

        let mut ranked: Vec<ScoredCandidate> = best
            .into_iter()
            .map(|(word, distance)| ScoredCandidate { word, distance })
            .collect();
        ranked.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.word.cmp(&b.word))
        });
        ranked.truncate(top_n);
        ranked
    }

    fn sieve(&self, entry: &str, misspelled: &str, target_code: &str, target_len: usize) -> Option<(String, f32)> {
        let word = entry.trim().to_lowercase();
        if word.is_empty() {
            return None;
        }

        // Pass 1: phonetic match. An empty code carries no information.
        if !target_code.is_empty() {
            let code = self.fingerprint.fingerprint(&word);
            if strsim::levenshtein(target_code, &code) <= self.limits.phonetic_tolerance {
                let distance = weighted_distance(misspelled, &word);
                return Some((word, distance));
            }
        }

        // Pass 2: length-bounded weighted distance.
        if word.chars().count().abs_diff(target_len) <= self.limits.length_window {
            let distance = weighted_distance(misspelled, &word);
            if distance <= self.limits.max_distance {
                return Some((word, distance));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn phonetic_match_found_and_unrelated_word_excluded() {
        let generator = CandidateGenerator::default();
        let candidates = generator.generate("frend", &dict(&["friend", "apple", "banana"]), 20);
        assert!(candidates.contains(&"friend".to_string()));
        assert!(!candidates.contains(&"banana".to_string()));
    }

    #[test]
    fn visual_match_found() {
        let generator = CandidateGenerator::default();
        let candidates = generator.generate("friend", &dict(&["friend", "fiend", "fended"]), 5);
        assert!(candidates.contains(&"fiend".to_string()));
    }

    #[test]
    fn no_match_is_empty() {
        let generator = CandidateGenerator::default();
        assert!(generator.generate("xyz", &dict(&["apple", "banana"]), 5).is_empty());
    }

    #[test]
    fn accented_entries_are_scanned_safely() {
        let generator = CandidateGenerator::default();
        let dictionary = dict(&["friend", "café", "résumé", "soupçon", "cœur"]);
        assert!(generator.generate("frend", &dictionary, 5).contains(&"friend".to_string()));
        assert!(generator.generate("cafe", &dictionary, 5).contains(&"café".to_string()));
    }

    #[test]
    fn repeated_calls_return_identical_order() {
        let generator = CandidateGenerator::default();
        let dictionary = dict(&["friend", "field", "fry", "fiend", "fend", "trend"]);
        let first = generator.generate("frend", &dictionary, 5);
        let second = generator.generate("frend", &dictionary, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn sorted_by_distance_and_deduplicated() {
        let generator = CandidateGenerator::default();
        let dictionary = dict(&["Dad", "dad", "bad", "bed"]);
        let scored = generator.generate_scored("bad", &dictionary, 10);

        let words: Vec<&str> = scored.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words.iter().filter(|w| **w == "dad").count(), 1);
        assert_eq!(words[0], "bad");
        assert!(scored.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn respects_top_n() {
        let generator = CandidateGenerator::default();
        let dictionary = dict(&["bat", "bad", "bag", "ban", "bar", "bay"]);
        assert_eq!(generator.generate("bab", &dictionary, 3).len(), 3);
        assert!(generator.generate("bab", &dictionary, 0).is_empty());
    }

    #[test]
    fn length_window_limits_second_pass() {
        struct Silent;
        impl PhoneticFingerprint for Silent {
            fn fingerprint(&self, _word: &str) -> String {
                String::new()
            }
        }
        let generator = CandidateGenerator::new(Box::new(Silent), GeneratorLimits::default());
        // "abcdef" is 3 longer than "abc": skipped even though only insertions differ.
        let candidates = generator.generate("abc", &dict(&["abcdef", "abcd"]), 5);
        assert_eq!(candidates, vec!["abcd".to_string()]);
    }
}
