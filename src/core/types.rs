// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::confusion::DEFAULT_WEIGHTS;

/// Per-category multipliers learned from the user's corrections.
/// Only `visual_substitution` is currently adjusted by the learning loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveWeights {
    pub visual_substitution: f32,
    pub phonetic_swap: f32,
    pub vowel_error: f32,
    pub transposition: f32,
}

impl Default for AdaptiveWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

/// Everything the engine remembers about one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Keyed `"x->y"`: typed `x` where `y` was meant.
    pub error_counts: HashMap<String, u32>,
    pub adaptive_weights: AdaptiveWeights,
    /// Misspellings the user asked us to leave alone.
    pub lexicon: BTreeSet<String>,
    pub accepted_words: HashMap<String, u32>,
    pub ui_preferences: BTreeMap<String, String>,
}

impl UserProfile {
    pub fn new(ui_preferences: BTreeMap<String, String>) -> Self {
        Self {
            error_counts: HashMap::new(),
            adaptive_weights: AdaptiveWeights::default(),
            lexicon: BTreeSet::new(),
            accepted_words: HashMap::new(),
            ui_preferences,
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        let mut prefs = BTreeMap::new();
        prefs.insert("font".to_string(), "Arial".to_string());
        prefs.insert("contrast".to_string(), "normal".to_string());
        Self::new(prefs)
    }
}

/// A dictionary word that survived candidate generation, with its
/// weighted distance to the misspelling.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub word: String,
    pub distance: f32,
}

/// A candidate with the context-fit score returned by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub word: String,
    pub score: f32,
}

/// Full scoring breakdown for one candidate.
/// `final_score = context_score * personalization_factor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub word: String,
    pub raw_distance: f32,
    pub context_score: f32,
    pub personalization_factor: f32,
    pub final_score: f32,
}

impl CandidateScore {
    pub fn new(word: String, raw_distance: f32, context_score: f32, personalization_factor: f32) -> Self {
        Self {
            word,
            raw_distance,
            context_score,
            personalization_factor,
            final_score: context_score * personalization_factor,
        }
    }
}

/// One enriched suggestion as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub word: String,
    /// e.g. `"90%"`.
    pub confidence_percent: String,
    pub example_sentence: String,
    pub definition_snippet: String,
    pub audio_preview_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homophone_hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Success,
    Ignored,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionResponse {
    pub status: SuggestionStatus,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ui_adaptations: BTreeMap<String, String>,
}

impl SuggestionResponse {
    pub fn terminal(status: SuggestionStatus) -> Self {
        Self {
            status,
            suggestions: Vec::new(),
            ui_adaptations: BTreeMap::new(),
        }
    }
}
