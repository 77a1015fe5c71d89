// File: src/profile.rs
use crate::core::confusion::VISUAL_QUARTET;
use crate::core::types::UserProfile;
use crate::learning::{CorrectionEvent, LearningEngine};
use crate::persistence::{MemoryProfileBackend, ProfileBackend};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Visual (b/d/p/q) error count above which the UI should adapt.
const VISUAL_ERROR_THRESHOLD: u32 = 5;
/// `visual_substitution` weight above which b/d candidates get a boost.
const VISUAL_BOOST_THRESHOLD: f32 = 1.5;
const ACCEPTED_WORD_BOOST: f32 = 0.2;
const VISUAL_SWAP_BOOST: f32 = 0.3;

impl UserProfile {
    /// Multiplier (`>= 1.0`) applied to a candidate's context score.
    ///
    /// The b/d check is a plain "contains" test on each string, not a
    /// positional comparison.
    pub fn personalization_factor(&self, candidate: &str, misspelling: &str) -> f32 {
        let mut factor = 1.0;
        if self.accepted_words.contains_key(candidate) {
            factor += ACCEPTED_WORD_BOOST;
        }
        if self.adaptive_weights.visual_substitution > VISUAL_BOOST_THRESHOLD
            && ((misspelling.contains('b') && candidate.contains('d'))
                || (misspelling.contains('d') && candidate.contains('b')))
        {
            factor += VISUAL_SWAP_BOOST;
        }
        factor
    }

    /// Stored UI preferences, with a dyslexia-friendly font and wider spacing
    /// once b/d/p/q mistakes pile up.
    pub fn ui_recommendations(&self) -> BTreeMap<String, String> {
        let visual_errors: u32 = self
            .error_counts
            .iter()
            .filter(|(pattern, _)| pattern.chars().any(|c| VISUAL_QUARTET.contains(&c)))
            .map(|(_, count)| *count)
            .sum();

        let mut recommendations = self.ui_preferences.clone();
        if visual_errors > VISUAL_ERROR_THRESHOLD {
            recommendations.insert("font".to_string(), "OpenDyslexic".to_string());
            recommendations.insert("spacing".to_string(), "1.5".to_string());
        }
        recommendations
    }

    pub fn is_ignored(&self, word: &str) -> bool {
        self.lexicon.contains(word)
    }
}

/// In-memory state for one user.
struct Slot {
    profile: UserProfile,
    /// The backend has answered a read for this user at least once.
    loaded: bool,
    /// Holds changes the backend has not stored yet.
    dirty: bool,
}

/// Per-user profiles behind a keyed backend.
///
/// Every mutation is a read-modify-write under that user's lock: the stored
/// profile is re-read, changed and written back before the lock is released.
/// Backend failures never fail the caller; the last state seen in memory is
/// used instead and the failure is counted. A user's slot is dropped once no
/// request holds it and the backend has all of its changes.
pub struct UserProfileStore {
    backend: Box<dyn ProfileBackend>,
    learning_engine: LearningEngine,
    base_preferences: BTreeMap<String, String>,
    slots: Mutex<HashMap<String, Arc<Mutex<Slot>>>>,
    persistence_failures: AtomicU64,
}

impl Default for UserProfileStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl UserProfileStore {
    pub fn new(backend: Box<dyn ProfileBackend>) -> Self {
        Self {
            backend,
            learning_engine: LearningEngine::new(),
            base_preferences: UserProfile::default().ui_preferences,
            slots: Mutex::new(HashMap::new()),
            persistence_failures: AtomicU64::new(0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryProfileBackend::new()))
    }

    /// Preferences given to profiles created from now on.
    pub fn with_base_preferences(mut self, preferences: BTreeMap<String, String>) -> Self {
        self.base_preferences = preferences;
        self
    }

    /// Number of profile reads or writes that failed since start-up.
    pub fn persistence_failures(&self) -> u64 {
        self.persistence_failures.load(Ordering::Relaxed)
    }

    fn slot(&self, user_id: &str) -> Arc<Mutex<Slot>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(user_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(Slot {
                    profile: UserProfile::new(self.base_preferences.clone()),
                    loaded: false,
                    dirty: false,
                }))
            })
            .clone()
    }

    /// Forgets the slot when the map and `slot` hold the only references and
    /// nothing is waiting to be written. Clones are only handed out under the
    /// map lock, so the count cannot grow while it is checked.
    fn release(&self, user_id: &str, slot: Arc<Mutex<Slot>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&slot) == 2 && !slot.lock().unwrap_or_else(PoisonError::into_inner).dirty {
            slots.remove(user_id);
        }
    }

    /// Replaces the slot's profile with the stored copy, if one can be read.
    fn refresh(&self, user_id: &str, slot: &mut Slot) {
        match self.backend.load(user_id) {
            Ok(Some(stored)) => {
                slot.profile = stored;
                slot.loaded = true;
                slot.dirty = false;
            }
            Ok(None) => slot.loaded = true,
            Err(e) => {
                self.persistence_failures.fetch_add(1, Ordering::Relaxed);
                log::error!(
                    "[ProfileStore] Failed to load profile for '{}', using last known state: {}",
                    user_id,
                    e
                );
            }
        }
    }

    fn persist(&self, user_id: &str, profile: &UserProfile) -> bool {
        match self.backend.save(user_id, profile) {
            Ok(()) => true,
            Err(e) => {
                self.persistence_failures.fetch_add(1, Ordering::Relaxed);
                log::error!("[ProfileStore] Failed to save profile for '{}': {}", user_id, e);
                false
            }
        }
    }

    fn update<R>(&self, user_id: &str, change: impl FnOnce(&mut UserProfile) -> Option<R>) -> Option<R> {
        let slot = self.slot(user_id);
        let outcome = {
            let mut state = slot.lock().unwrap_or_else(PoisonError::into_inner);
            self.refresh(user_id, &mut state);
            let outcome = change(&mut state.profile);
            if outcome.is_some() {
                state.dirty = true;
                if !state.loaded {
                    // Never overwrite a stored profile that could not be read.
                    log::warn!(
                        "[ProfileStore] Profile for '{}' was never read, keeping the change in memory only.",
                        user_id
                    );
                } else if self.persist(user_id, &state.profile) {
                    state.dirty = false;
                }
            }
            outcome
        };
        self.release(user_id, slot);
        outcome
    }

    /// A consistent copy of the user's current profile, defaults on first access.
    pub fn snapshot(&self, user_id: &str) -> UserProfile {
        let slot = self.slot(user_id);
        let profile = {
            let mut state = slot.lock().unwrap_or_else(PoisonError::into_inner);
            self.refresh(user_id, &mut state);
            state.profile.clone()
        };
        self.release(user_id, slot);
        profile
    }

    /// Records an accepted correction. Returns the error patterns it counted.
    pub fn learn_from_correction(&self, user_id: &str, misspelling: &str, chosen_word: &str) -> Vec<String> {
        let correction = CorrectionEvent {
            misspelling: misspelling.to_string(),
            chosen: chosen_word.to_string(),
        };
        self.update(user_id, |profile| Some(self.learning_engine.learn(profile, &correction)))
            .unwrap_or_default()
    }

    /// Adds `word` to the user's ignore list. Returns `false` if it was already there.
    pub fn add_to_lexicon(&self, user_id: &str, word: &str) -> bool {
        self.update(user_id, |profile| profile.lexicon.insert(word.to_string()).then_some(()))
            .is_some()
    }

    pub fn personalization_factor(&self, user_id: &str, candidate: &str, misspelling: &str) -> f32 {
        self.snapshot(user_id).personalization_factor(candidate, misspelling)
    }

    pub fn ui_recommendations(&self, user_id: &str) -> BTreeMap<String, String> {
        self.snapshot(user_id).ui_recommendations()
    }
}
