// File: src/error.rs

/// Errors raised inside the suggestion engine.
///
/// Only `InvalidInput` ever escapes the public operations. Model and
/// persistence failures are logged and degraded to a well-defined response.
#[derive(Debug, thiserror::Error)]
pub enum SpellerError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("context model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("profile persistence failed: {0}")]
    Persistence(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("profile encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("settings parse failed: {0}")]
    SettingsParse(#[from] toml::de::Error),
    #[error("settings serialization failed: {0}")]
    SettingsWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, SpellerError>;
