// File: src/feedback.rs
use crate::profile::UserProfileStore;
use serde::Serialize;

/// What the user did with a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackAction {
    Accepted,
    Ignored,
    Other(String),
}

impl From<&str> for FeedbackAction {
    fn from(action: &str) -> Self {
        match action {
            "accepted" => FeedbackAction::Accepted,
            "ignored" => FeedbackAction::Ignored,
            other => FeedbackAction::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAck {
    /// The correction was learned.
    Learned,
    /// The misspelling is now on the ignore list (or already was).
    AddedToLexicon,
    /// Unknown action, nothing changed.
    NoOp,
}

/// Routes accept/ignore feedback into the profile store.
pub struct FeedbackHandler<'a> {
    profiles: &'a UserProfileStore,
}

impl<'a> FeedbackHandler<'a> {
    pub fn new(profiles: &'a UserProfileStore) -> Self {
        Self { profiles }
    }

    pub fn handle(&self, user_id: &str, misspelling: &str, chosen: &str, action: &FeedbackAction) -> FeedbackAck {
        match action {
            FeedbackAction::Ignored => {
                self.profiles.add_to_lexicon(user_id, misspelling);
                FeedbackAck::AddedToLexicon
            }
            FeedbackAction::Accepted => {
                let patterns = self.profiles.learn_from_correction(user_id, misspelling, chosen);
                log::debug!(
                    "[Feedback] {} accepted '{}' for '{}', patterns {:?}",
                    user_id,
                    chosen,
                    misspelling,
                    patterns
                );
                FeedbackAck::Learned
            }
            FeedbackAction::Other(name) => {
                log::debug!("[Feedback] Ignoring unknown action '{}'", name);
                FeedbackAck::NoOp
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_actions() {
        assert_eq!(FeedbackAction::from("accepted"), FeedbackAction::Accepted);
        assert_eq!(FeedbackAction::from("ignored"), FeedbackAction::Ignored);
        assert_eq!(FeedbackAction::from("Accepted"), FeedbackAction::Other("Accepted".into()));
    }

    #[test]
    fn routes_actions_to_the_store() {
        let store = UserProfileStore::in_memory();
        let handler = FeedbackHandler::new(&store);

        assert_eq!(handler.handle("u", "teh", "the", &"accepted".into()), FeedbackAck::Learned);
        assert_eq!(handler.handle("u", "GitHub", "", &"ignored".into()), FeedbackAck::AddedToLexicon);

        let profile = store.snapshot("u");
        assert_eq!(profile.accepted_words["the"], 1);
        assert!(profile.is_ignored("GitHub"));
    }

    #[test]
    fn unknown_action_changes_nothing() {
        let store = UserProfileStore::in_memory();
        let handler = FeedbackHandler::new(&store);
        let before = store.snapshot("u");

        assert_eq!(handler.handle("u", "teh", "the", &"starred".into()), FeedbackAck::NoOp);
        assert_eq!(store.snapshot("u"), before);
    }
}
