use crate::config::EngineSettings;
use crate::core::context::{ContextRanker, ModelLoader};
use crate::core::types::{CandidateScore, SuggestionResponse, SuggestionStatus};
use crate::dictionary::DictionaryProvider;
use crate::enrich::Enricher;
use crate::error::{Result, SpellerError};
use crate::feedback::{FeedbackAck, FeedbackAction, FeedbackHandler};
use crate::fuzzy::candidates::CandidateGenerator;
use crate::fuzzy::phonetic::MetaphoneFingerprint;
use crate::persistence::FileProfileBackend;
use crate::profile::UserProfileStore;
use std::collections::HashMap;
use std::sync::Arc;

// The engine owns every stage of the pipeline. Profiles are the only
// per-user mutable state; the ranker's model is shared and read-only.
pub struct SuggestionEngine {
    settings: EngineSettings,
    generator: CandidateGenerator,
    ranker: ContextRanker,
    profiles: UserProfileStore,
    dictionary: Arc<dyn DictionaryProvider>,
    enricher: Enricher,
}

impl SuggestionEngine {
    pub fn new(
        settings: EngineSettings,
        dictionary: Arc<dyn DictionaryProvider>,
        ranker: ContextRanker,
        profiles: UserProfileStore,
    ) -> Self {
        Self {
            generator: CandidateGenerator::new(
                Box::new(MetaphoneFingerprint::new()),
                settings.generator_limits(),
            ),
            settings,
            ranker,
            profiles,
            dictionary,
            enricher: Enricher::default(),
        }
    }

    /// Builds every collaborator from `settings`: file-backed profiles when a
    /// profile directory is set, and a lazily loaded model from `loader`.
    pub fn from_settings(settings: EngineSettings, dictionary: Arc<dyn DictionaryProvider>, loader: ModelLoader) -> Self {
        let profiles = match &settings.profile_dir {
            Some(dir) => UserProfileStore::new(Box::new(FileProfileBackend::new(dir.clone()))),
            None => UserProfileStore::in_memory(),
        }
        .with_base_preferences(settings.base_preferences());
        let ranker = ContextRanker::new(loader, settings.ranker_limits());
        Self::new(settings, dictionary, ranker, profiles)
    }

    pub fn with_enricher(mut self, enricher: Enricher) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn profiles(&self) -> &UserProfileStore {
        &self.profiles
    }

    /// Loads the context model ahead of the first request.
    pub async fn init(&self) -> bool {
        self.ranker.init().await
    }

    pub fn shutdown(&mut self) {
        self.ranker.shutdown();
    }

    /// One full pass: ignore list, candidates, context, personalization,
    /// truncation, enrichment. Only empty input is an error.
    pub async fn generate_suggestions(
        &self,
        sentence: &str,
        misspelled_word: &str,
        user_id: &str,
    ) -> Result<SuggestionResponse> {
        if sentence.trim().is_empty() {
            return Err(SpellerError::InvalidInput("sentence is empty"));
        }
        if misspelled_word.trim().is_empty() {
            return Err(SpellerError::InvalidInput("misspelled word is empty"));
        }

        let profile = self.profiles.snapshot(user_id);
        if profile.is_ignored(misspelled_word) {
            log::debug!("[Engine] '{}' is on {}'s ignore list.", misspelled_word, user_id);
            return Ok(SuggestionResponse::terminal(SuggestionStatus::Ignored));
        }

        let candidates = self.generator.generate_scored(
            misspelled_word,
            self.dictionary.words(),
            self.settings.candidate_pool,
        );
        if candidates.is_empty() {
            log::debug!("[Engine] No candidates for '{}'.", misspelled_word);
            return Ok(SuggestionResponse::terminal(SuggestionStatus::NoMatch));
        }
        let distances: HashMap<&str, f32> = candidates
            .iter()
            .map(|c| (c.word.as_str(), c.distance))
            .collect();
        let words: Vec<String> = candidates.iter().map(|c| c.word.clone()).collect();

        let ranked = self.ranker.rank(sentence, misspelled_word, &words).await;

        // The profile may have changed while the model was busy.
        let profile = self.profiles.snapshot(user_id);
        let mut scored: Vec<CandidateScore> = ranked
            .into_iter()
            .map(|r| {
                let factor = profile.personalization_factor(&r.word, misspelled_word);
                let distance = distances.get(r.word.as_str()).copied().unwrap_or(f32::INFINITY);
                CandidateScore::new(r.word, distance, r.score, factor)
            })
            .collect();
        scored.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        scored.truncate(self.settings.suggestion_limit());

        Ok(SuggestionResponse {
            status: SuggestionStatus::Success,
            suggestions: scored.iter().map(|s| self.enricher.enrich(s)).collect(),
            ui_adaptations: profile.ui_recommendations(),
        })
    }

    pub fn record_feedback(
        &self,
        misspelling: &str,
        chosen: &str,
        action: &str,
        user_id: &str,
    ) -> Result<FeedbackAck> {
        if misspelling.trim().is_empty() {
            return Err(SpellerError::InvalidInput("misspelling is empty"));
        }
        let action = FeedbackAction::from(action);
        if action == FeedbackAction::Accepted && chosen.trim().is_empty() {
            return Err(SpellerError::InvalidInput("accepted word is empty"));
        }
        Ok(FeedbackHandler::new(&self.profiles).handle(user_id, misspelling, chosen, &action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::{MaskedLanguageModel, RankerLimits};
    use crate::dictionary::WordList;

    struct Uniform;

    impl MaskedLanguageModel for Uniform {
        fn score_targets(&self, _masked_text: &str, targets: &[String]) -> Result<Vec<(String, f32)>> {
            Ok(targets.iter().map(|t| (t.clone(), 0.5)).collect())
        }
    }

    fn engine(words: &[&str]) -> SuggestionEngine {
        SuggestionEngine::new(
            EngineSettings::default(),
            Arc::new(WordList::new(words.iter().copied())),
            ContextRanker::with_model(Arc::new(Uniform), RankerLimits::default()),
            UserProfileStore::in_memory(),
        )
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let engine = engine(&["friend"]);
        assert!(matches!(
            engine.generate_suggestions("", "frend", "u").await,
            Err(SpellerError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.generate_suggestions("My frend", "  ", "u").await,
            Err(SpellerError::InvalidInput(_))
        ));
        assert!(engine.record_feedback("", "the", "accepted", "u").is_err());
        assert!(engine.record_feedback("teh", "", "accepted", "u").is_err());
        assert!(engine.record_feedback("GitHub", "", "ignored", "u").is_ok());
    }

    #[tokio::test]
    async fn no_candidates_is_no_match() {
        let engine = engine(&["apple", "banana"]);
        let response = engine.generate_suggestions("xyz here", "xyz", "u").await.unwrap();
        assert_eq!(response.status, SuggestionStatus::NoMatch);
        assert!(response.suggestions.is_empty());
    }

    #[tokio::test]
    async fn accepted_word_wins_a_tie() {
        let engine = engine(&["bat", "bad", "bag"]);
        engine.record_feedback("bax", "bag", "accepted", "u").unwrap();

        let response = engine.generate_suggestions("a bax of chips", "bax", "u").await.unwrap();
        assert_eq!(response.suggestions[0].word, "bag");
        assert_eq!(response.suggestions[0].confidence_percent, "60%");
    }

    #[tokio::test]
    async fn users_do_not_share_history() {
        let engine = engine(&["bat", "bad", "bag"]);
        engine.record_feedback("bax", "bag", "ignored", "alice").unwrap();

        let alice = engine.generate_suggestions("a bax", "bax", "alice").await.unwrap();
        let bob = engine.generate_suggestions("a bax", "bax", "bob").await.unwrap();
        assert_eq!(alice.status, SuggestionStatus::Ignored);
        assert_eq!(bob.status, SuggestionStatus::Success);
    }

    #[tokio::test]
    async fn file_profiles_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = EngineSettings {
            profile_dir: Some(dir.path().to_path_buf()),
            base_font: "Verdana".into(),
            ..EngineSettings::default()
        };
        let loader: ModelLoader = Arc::new(|| Ok::<_, SpellerError>(Arc::new(Uniform) as Arc<dyn MaskedLanguageModel>));
        let engine = SuggestionEngine::from_settings(settings, Arc::new(WordList::new(["friend"])), loader);

        assert!(engine.init().await);
        engine.record_feedback("frend", "friend", "accepted", "u").unwrap();
        let response = engine.generate_suggestions("My frend", "frend", "u").await.unwrap();
        assert_eq!(response.ui_adaptations["font"], "Verdana");
        assert!(std::fs::read_dir(dir.path()).unwrap().count() >= 1);
    }
}
