// File: src/fuzzy/phonetic.rs
use rphonetic::DoubleMetaphone;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Produces a short code describing how a word sounds.
/// Equal codes mean "sounds alike".
pub trait PhoneticFingerprint: Send + Sync {
    fn fingerprint(&self, word: &str) -> String;
}

/// Primary Double Metaphone code, the canonical fingerprint for English.
pub struct MetaphoneFingerprint {
    encoder: DoubleMetaphone,
}

impl Default for MetaphoneFingerprint {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaphoneFingerprint {
    pub fn new() -> Self {
        Self {
            encoder: DoubleMetaphone::default(),
        }
    }
}

/// Lowercase ASCII letters of `word` with diacritics folded away
/// ("Résumé" -> "resume"). Letters with no ASCII base are dropped.
pub fn ascii_letters(word: &str) -> String {
    word.nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl PhoneticFingerprint for MetaphoneFingerprint {
    fn fingerprint(&self, word: &str) -> String {
        // The encoder slices by byte offset and only copes with ASCII.
        let word = ascii_letters(word);
        if word.is_empty() {
            return String::new();
        }
        self.encoder.double_metaphone(&word).primary().to_string()
    }
}
