// File: src/config.rs
use crate::core::context::RankerLimits;
use crate::error::Result;
use crate::fuzzy::candidates::GeneratorLimits;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hard cap on suggestions shown to the user, whatever the settings say.
pub const MAX_SUGGESTIONS: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Candidates kept after the dictionary sieve.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    #[serde(default = "default_phonetic_tolerance")]
    pub phonetic_tolerance: usize,
    #[serde(default = "default_length_window")]
    pub length_window: usize,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_context_window_words")]
    pub context_window_words: usize,
    #[serde(default = "default_model_token_budget")]
    pub model_token_budget: usize,
    #[serde(default = "default_ranker_timeout_ms")]
    pub ranker_timeout_ms: u64,
    /// Where user profiles live. Unset keeps them in memory.
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,
    #[serde(default = "default_base_font")]
    pub base_font: String,
    #[serde(default = "default_base_contrast")]
    pub base_contrast: String,
}

fn default_candidate_pool() -> usize {
    20
}

fn default_max_distance() -> f32 {
    3.0
}

fn default_phonetic_tolerance() -> usize {
    1
}

fn default_length_window() -> usize {
    2
}

fn default_max_suggestions() -> usize {
    MAX_SUGGESTIONS
}

fn default_context_window_words() -> usize {
    30
}

fn default_model_token_budget() -> usize {
    512
}

fn default_ranker_timeout_ms() -> u64 {
    1500
}

fn default_base_font() -> String {
    "Arial".to_string()
}

fn default_base_contrast() -> String {
    "normal".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            candidate_pool: default_candidate_pool(),
            max_distance: default_max_distance(),
            phonetic_tolerance: default_phonetic_tolerance(),
            length_window: default_length_window(),
            max_suggestions: default_max_suggestions(),
            context_window_words: default_context_window_words(),
            model_token_budget: default_model_token_budget(),
            ranker_timeout_ms: default_ranker_timeout_ms(),
            profile_dir: None,
            base_font: default_base_font(),
            base_contrast: default_base_contrast(),
        }
    }
}

fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "dyslexic-speller", "DyslexicSpeller")
}

impl EngineSettings {
    /// `config.toml` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        get_project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Default profile directory in the platform data directory.
    pub fn default_profile_dir() -> Option<PathBuf> {
        get_project_dirs().map(|dirs| dirs.data_local_dir().join("profiles"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads settings from `path`, or the default location when `None`.
    ///
    /// A missing file is created with defaults. An unreadable or malformed
    /// file is logged and defaults are used; this never fails.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            log::error!("[Config] Could not determine project directories. Using default settings.");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(settings) => {
                    log::info!("[Config] Settings loaded from {}", path.display());
                    return settings;
                }
                Err(e) => {
                    log::error!("[Config] Failed to parse config file '{}': {}", path.display(), e);
                    return Self::default();
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("[Config] Config file not found. Creating default.");
            }
            Err(e) => {
                log::error!("[Config] Failed to read config file '{}': {}", path.display(), e);
                return Self::default();
            }
        }

        let settings = Self::default();
        if let Err(e) = settings.save(&path) {
            log::error!("[Config] Failed to write default config file: {}", e);
        }
        settings
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        log::info!("[Config] Settings saved to {}", path.display());
        Ok(())
    }

    /// Suggestions to return, never more than [`MAX_SUGGESTIONS`].
    pub fn suggestion_limit(&self) -> usize {
        self.max_suggestions.min(MAX_SUGGESTIONS)
    }

    pub fn generator_limits(&self) -> GeneratorLimits {
        GeneratorLimits {
            phonetic_tolerance: self.phonetic_tolerance,
            length_window: self.length_window,
            max_distance: self.max_distance,
        }
    }

    pub fn ranker_limits(&self) -> RankerLimits {
        RankerLimits {
            token_budget: self.model_token_budget,
            window_words: self.context_window_words,
            timeout: Duration::from_millis(self.ranker_timeout_ms),
        }
    }

    /// UI preferences a brand-new profile starts with.
    pub fn base_preferences(&self) -> BTreeMap<String, String> {
        let mut prefs = BTreeMap::new();
        prefs.insert("font".to_string(), self.base_font.clone());
        prefs.insert("contrast".to_string(), self.base_contrast.clone());
        prefs
    }
}
