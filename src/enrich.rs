// File: src/enrich.rs
use crate::core::types::{CandidateScore, Suggestion};
use std::collections::HashMap;

const NO_EXAMPLE: &str = "No example available.";
const DEFINITION_SNIPPET_CHARS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordExample {
    pub definition: String,
    pub example: String,
}

/// Looks up a definition and a usage example for a word.
pub trait ExampleProvider: Send + Sync {
    fn lookup(&self, word: &str) -> Option<WordExample>;
}

/// Builds a reference the presentation layer can use to read a word aloud.
pub trait AudioLinkProvider: Send + Sync {
    fn audio_reference(&self, word: &str, example: &str) -> String;
}

/// Examples from an in-memory table.
#[derive(Default)]
pub struct StaticExamples {
    entries: HashMap<String, WordExample>,
}

impl StaticExamples {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, word: &str, definition: &str, example: &str) -> Self {
        self.entries.insert(
            word.to_lowercase(),
            WordExample {
                definition: definition.to_string(),
                example: example.to_string(),
            },
        );
        self
    }
}

impl ExampleProvider for StaticExamples {
    fn lookup(&self, word: &str) -> Option<WordExample> {
        self.entries.get(&word.to_lowercase()).cloned()
    }
}

/// Points at the speech endpoint with the word followed by its example.
pub struct SpeakEndpoint {
    base: String,
}

impl Default for SpeakEndpoint {
    fn default() -> Self {
        Self {
            base: "/voice/speak".to_string(),
        }
    }
}

impl SpeakEndpoint {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl AudioLinkProvider for SpeakEndpoint {
    fn audio_reference(&self, word: &str, example: &str) -> String {
        format!("{}?text={}. For example: {}", self.base, word, example)
    }
}

/// Warning for commonly confused homophones.
pub fn homophone_hint(word: &str) -> Option<&'static str> {
    match word.to_lowercase().as_str() {
        "their" => Some("Check: 'their' means possession (their house)."),
        "there" => Some("Check: 'there' means location (over there)."),
        "they're" => Some("Check: 'they're' means 'they are'."),
        "to" => Some("Check: 'to' indicates direction."),
        "too" => Some("Check: 'too' means also or excessive."),
        "two" => Some("Check: 'two' is the number 2."),
        _ => None,
    }
}

pub fn confidence_percent(final_score: f32) -> String {
    format!("{}%", (final_score * 100.0) as i64)
}

fn definition_snippet(definition: &str) -> String {
    if definition.is_empty() {
        return String::new();
    }
    let head: String = definition.chars().take(DEFINITION_SNIPPET_CHARS).collect();
    format!("{}...", head)
}

/// Attaches comprehension aids to ranked candidates.
pub struct Enricher {
    examples: Box<dyn ExampleProvider>,
    audio: Box<dyn AudioLinkProvider>,
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new(Box::new(StaticExamples::new()), Box::new(SpeakEndpoint::default()))
    }
}

impl Enricher {
    pub fn new(examples: Box<dyn ExampleProvider>, audio: Box<dyn AudioLinkProvider>) -> Self {
        Self { examples, audio }
    }

    pub fn enrich(&self, scored: &CandidateScore) -> Suggestion {
        let aid = self.examples.lookup(&scored.word).unwrap_or_default();
        let example = if aid.example.is_empty() {
            NO_EXAMPLE.to_string()
        } else {
            aid.example
        };
        Suggestion {
            word: scored.word.clone(),
            confidence_percent: confidence_percent(scored.final_score),
            audio_preview_reference: self.audio.audio_reference(&scored.word, &example),
            definition_snippet: definition_snippet(&aid.definition),
            example_sentence: example,
            homophone_hint: homophone_hint(&scored.word).map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(word: &str, final_score: f32) -> CandidateScore {
        CandidateScore::new(word.to_string(), 1.0, final_score, 1.0)
    }

    #[test]
    fn confidence_truncates_toward_zero() {
        assert_eq!(confidence_percent(0.9), "90%");
        assert_eq!(confidence_percent(0.999), "99%");
        assert_eq!(confidence_percent(0.0), "0%");
        assert_eq!(confidence_percent(1.5), "150%");
    }

    #[test]
    fn missing_example_uses_placeholder() {
        let suggestion = Enricher::default().enrich(&scored("friend", 0.9));
        assert_eq!(suggestion.example_sentence, NO_EXAMPLE);
        assert_eq!(suggestion.definition_snippet, "");
        assert_eq!(
            suggestion.audio_preview_reference,
            "/voice/speak?text=friend. For example: No example available."
        );
        assert_eq!(suggestion.homophone_hint, None);
    }

    #[test]
    fn long_definitions_are_cut() {
        let long = "a".repeat(80);
        let examples = StaticExamples::new().with_entry("there", &long, "Put it over there.");
        let enricher = Enricher::new(Box::new(examples), Box::new(SpeakEndpoint::new("/tts")));
        let suggestion = enricher.enrich(&scored("there", 0.5));

        assert_eq!(suggestion.definition_snippet, format!("{}...", "a".repeat(50)));
        assert_eq!(suggestion.example_sentence, "Put it over there.");
        assert!(suggestion.audio_preview_reference.starts_with("/tts?text=there."));
        assert!(suggestion.homophone_hint.unwrap().contains("location"));
    }

    #[test]
    fn homophones_are_case_insensitive() {
        assert!(homophone_hint("Their").is_some());
        assert!(homophone_hint("friend").is_none());
    }
}
