// File: src/core/bigram.rs
use crate::core::context::MaskedLanguageModel;
use crate::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A lightweight masked-slot model built from word bigram counts.
///
/// A target `t` filling the slot between `left` and `right` scores
/// `P(t | left) * P(right | t)` with add-one smoothing; scores are then
/// normalized over the target set so they sum to 1.
#[derive(Debug, Clone, Default)]
pub struct BigramMaskModel {
    unigrams: HashMap<String, u64>,
    /// Maps (prev_word, current_word) -> frequency
    bigrams: HashMap<(String, String), u64>,
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
}

impl BigramMaskModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_corpus(text: &str) -> Self {
        let mut model = Self::new();
        model.train(text);
        model
    }

    /// Trains from a plain-text file, one sentence or paragraph per line.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_corpus(&text))
    }

    /// Adds the sentences in `text` to the counts. Bigrams never span lines.
    pub fn train(&mut self, text: &str) {
        for line in text.lines() {
            let mut prev: Option<String> = None;
            for word in tokenize(line) {
                *self.unigrams.entry(word.clone()).or_insert(0) += 1;
                if let Some(prev_word) = prev.take() {
                    *self.bigrams.entry((prev_word, word.clone())).or_insert(0) += 1;
                }
                prev = Some(word);
            }
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.unigrams.len()
    }

    fn conditional(&self, given: &str, next: &str) -> f64 {
        let vocab = (self.unigrams.len() + 1) as f64;
        let pair = self
            .bigrams
            .get(&(given.to_string(), next.to_string()))
            .copied()
            .unwrap_or(0) as f64;
        let base = self.unigrams.get(given).copied().unwrap_or(0) as f64;
        (pair + 1.0) / (base + vocab)
    }

    /// Words immediately before and after the mask, if any.
    fn neighbours(masked_text: &str, mask: &str) -> (Option<String>, Option<String>) {
        let words: Vec<&str> = masked_text.split_whitespace().collect();
        let Some(index) = words.iter().position(|w| w.contains(mask)) else {
            return (None, None);
        };
        let clean = |w: &str| tokenize(w).next();
        let left = index.checked_sub(1).and_then(|i| clean(words[i]));
        let right = words.get(index + 1).and_then(|w| clean(*w));
        (left, right)
    }
}

impl MaskedLanguageModel for BigramMaskModel {
    fn score_targets(&self, masked_text: &str, targets: &[String]) -> Result<Vec<(String, f32)>> {
        let (left, right) = Self::neighbours(masked_text, self.mask_token());

        let raw: Vec<f64> = targets
            .iter()
            .map(|target| {
                let target = target.to_lowercase();
                let mut p = 1.0;
                if let Some(left) = &left {
                    p *= self.conditional(left, &target);
                }
                if let Some(right) = &right {
                    p *= self.conditional(&target, right);
                }
                p
            })
            .collect();

        let total: f64 = raw.iter().sum();
        Ok(targets
            .iter()
            .zip(raw)
            .map(|(target, p)| {
                let score = if total > 0.0 { p / total } else { 0.0 };
                (target.clone(), score as f32)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn counts_words_within_lines_only() {
        let model = BigramMaskModel::from_corpus("my friend is here\nhere we go");
        assert_eq!(model.vocabulary_size(), 6);
        assert!(model.bigrams.contains_key(&("my".into(), "friend".into())));
        assert!(!model.bigrams.contains_key(&("here".into(), "here".into())));
    }

    #[test]
    fn prefers_the_word_seen_in_context() {
        let model = BigramMaskModel::from_corpus(
            "my friend is here\nmy friend is kind\nthe field is green",
        );
        let scores = model
            .score_targets("My <mask> is here.", &targets(&["field", "friend", "fry"]))
            .unwrap();
        let best = scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(best.0, "friend");
    }

    #[test]
    fn scores_are_normalized() {
        let model = BigramMaskModel::from_corpus("a b c");
        let scores = model.score_targets("a <mask> c", &targets(&["b", "x"])).unwrap();
        let sum: f32 = scores.iter().map(|(_, s)| s).sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(scores.iter().all(|(_, s)| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn untrained_model_is_uniform() {
        let model = BigramMaskModel::new();
        let scores = model.score_targets("<mask>", &targets(&["a", "b"])).unwrap();
        assert_eq!(scores[0].1, scores[1].1);
    }
}
