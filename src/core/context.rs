// File: src/core/context.rs
use crate::core::types::RankedCandidate;
use crate::error::{Result, SpellerError};
use regex::RegexBuilder;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const MASK_TOKEN: &str = "<mask>";

/// A fill-in-the-blank model: given text containing its mask token, how likely
/// is each target to fill the slot? Scores are probability-like, in `[0, 1]`.
///
/// Implementations are shared read-only across requests.
pub trait MaskedLanguageModel: Send + Sync {
    fn mask_token(&self) -> &str {
        MASK_TOKEN
    }

    /// How many tokens the model would see for `text`. Subword models
    /// should override the word count.
    fn token_count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn score_targets(&self, masked_text: &str, targets: &[String]) -> Result<Vec<(String, f32)>>;
}

pub type ModelLoader = Arc<dyn Fn() -> Result<Arc<dyn MaskedLanguageModel>> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct RankerLimits {
    /// Above this many model tokens the masked sentence is windowed.
    pub token_budget: usize,
    /// Words kept on each side of the mask when windowing.
    pub window_words: usize,
    pub timeout: Duration,
}

impl Default for RankerLimits {
    fn default() -> Self {
        Self {
            token_budget: 512,
            window_words: 30,
            timeout: Duration::from_millis(1500),
        }
    }
}

/// Replaces the first occurrence of `target` with `mask`. Exact match first,
/// then case-insensitive. `None` when the target is not in the sentence.
pub fn mask_target(sentence: &str, target: &str, mask: &str) -> Option<String> {
    if target.is_empty() {
        return None;
    }
    if let Some(start) = sentence.find(target) {
        let end = start + target.len();
        return Some(format!("{}{}{}", &sentence[..start], mask, &sentence[end..]));
    }
    let pattern = RegexBuilder::new(&regex::escape(target))
        .case_insensitive(true)
        .build()
        .ok()?;
    let found = pattern.find(sentence)?;
    Some(format!(
        "{}{}{}",
        &sentence[..found.start()],
        mask,
        &sentence[found.end()..]
    ))
}

/// Keeps `context_words` words either side of the word carrying the mask.
/// Text without the mask is returned unchanged.
pub fn window_around_mask(masked: &str, mask: &str, context_words: usize) -> String {
    let words: Vec<&str> = masked.split_whitespace().collect();
    let Some(mask_index) = words.iter().position(|w| w.contains(mask)) else {
        return masked.to_string();
    };
    let start = mask_index.saturating_sub(context_words);
    let end = (mask_index + context_words + 1).min(words.len());
    words[start..end].join(" ")
}

fn neutral(candidates: &[String]) -> Vec<RankedCandidate> {
    candidates
        .iter()
        .map(|word| RankedCandidate {
            word: word.clone(),
            score: 0.0,
        })
        .collect()
}

/// Scores candidates by sentence fit using an injected masked language model.
///
/// The model is loaded lazily, once, on first use, in a background task;
/// concurrent first callers all share that load. A slow load, a failed load,
/// a failed inference or a timeout never fails the request: every candidate
/// then scores `0.0`. One deadline covers both the load wait and inference.
pub struct ContextRanker {
    loader: ModelLoader,
    model: Arc<OnceCell<Option<Arc<dyn MaskedLanguageModel>>>>,
    limits: RankerLimits,
}

impl ContextRanker {
    pub fn new(loader: ModelLoader, limits: RankerLimits) -> Self {
        Self {
            loader,
            model: Arc::new(OnceCell::new()),
            limits,
        }
    }

    /// A ranker around an already-loaded model.
    pub fn with_model(model: Arc<dyn MaskedLanguageModel>, limits: RankerLimits) -> Self {
        let loader_model = model.clone();
        Self {
            loader: Arc::new(move || -> Result<Arc<dyn MaskedLanguageModel>> { Ok(loader_model.clone()) }),
            model: Arc::new(OnceCell::new_with(Some(Some(model)))),
            limits,
        }
    }

    /// A ranker with no model; every candidate scores `0.0`.
    pub fn unavailable(limits: RankerLimits) -> Self {
        Self::new(
            Arc::new(|| -> Result<Arc<dyn MaskedLanguageModel>> {
                Err(SpellerError::ModelUnavailable("no model configured".into()))
            }),
            limits,
        )
    }

    /// Loads the model now instead of on the first request. Waits for the
    /// load however long it takes.
    pub async fn init(&self) -> bool {
        if let Some(model) = self.model.get() {
            return model.is_some();
        }
        matches!(self.load().await, Ok(Some(_)))
    }

    /// Drops the loaded model. A later request loads it again.
    pub fn shutdown(&mut self) {
        if self.model.initialized() {
            log::info!("[ContextRanker] Model released.");
        }
        self.model = Arc::new(OnceCell::new());
    }

    /// Joins (or starts) the shared load. The task is detached, so a caller
    /// that stops waiting does not cancel it.
    fn load(&self) -> JoinHandle<Option<Arc<dyn MaskedLanguageModel>>> {
        let cell = self.model.clone();
        let loader = self.loader.clone();
        tokio::spawn(async move {
            let model = cell
                .get_or_init(|| async move {
                    match tokio::task::spawn_blocking(move || loader()).await {
                        Ok(Ok(model)) => {
                            log::info!("[ContextRanker] Context model loaded.");
                            Some(model)
                        }
                        Ok(Err(e)) => {
                            log::error!("[ContextRanker] Failed to load context model: {}", e);
                            None
                        }
                        Err(e) => {
                            log::error!("[ContextRanker] Model loader panicked: {}", e);
                            None
                        }
                    }
                })
                .await;
            model.clone()
        })
    }

    async fn model_before(&self, deadline: Instant) -> Option<Arc<dyn MaskedLanguageModel>> {
        if let Some(model) = self.model.get() {
            return model.clone();
        }
        match tokio::time::timeout_at(deadline, self.load()).await {
            Ok(Ok(model)) => model,
            Ok(Err(e)) => {
                log::error!("[ContextRanker] Model load task aborted: {}", e);
                None
            }
            Err(_) => {
                log::warn!(
                    "[ContextRanker] Model still loading after {:?}, using neutral scores.",
                    self.limits.timeout
                );
                None
            }
        }
    }

    /// Scores of each candidate, best first.
    pub async fn rank(&self, sentence: &str, target_word: &str, candidates: &[String]) -> Vec<RankedCandidate> {
        let candidates: Vec<String> = candidates
            .iter()
            .filter(|c| !c.trim().is_empty())
            .cloned()
            .collect();
        if candidates.is_empty() {
            return vec![];
        }

        let deadline = Instant::now() + self.limits.timeout;
        let Some(model) = self.model_before(deadline).await else {
            return neutral(&candidates);
        };

        let mask = model.mask_token().to_string();
        let Some(masked) = mask_target(sentence, target_word, &mask) else {
            log::debug!("[ContextRanker] '{}' not found in sentence, skipping model.", target_word);
            return neutral(&candidates);
        };
        let masked = if model.token_count(&masked) > self.limits.token_budget {
            window_around_mask(&masked, &mask, self.limits.window_words)
        } else {
            masked
        };

        let targets = candidates.clone();
        let inference = tokio::task::spawn_blocking(move || model.score_targets(&masked, &targets));
        let scores = match tokio::time::timeout_at(deadline, inference).await {
            Ok(Ok(Ok(scores))) => scores,
            Ok(Ok(Err(e))) => {
                log::error!("[ContextRanker] Inference failed: {}", e);
                return neutral(&candidates);
            }
            Ok(Err(e)) => {
                log::error!("[ContextRanker] Inference task aborted: {}", e);
                return neutral(&candidates);
            }
            Err(_) => {
                log::warn!(
                    "[ContextRanker] Inference exceeded {:?}, using neutral scores.",
                    self.limits.timeout
                );
                return neutral(&candidates);
            }
        };

        let by_word: HashMap<String, f32> = scores.into_iter().collect();
        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .map(|word| {
                let score = by_word.get(&word).copied().unwrap_or(0.0);
                RankedCandidate {
                    word,
                    score: if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 },
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}
