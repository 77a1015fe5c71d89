// File: src/dictionary.rs
use crate::error::Result;
use std::fs;
use std::path::Path;

/// The universe of words candidates are drawn from.
pub trait DictionaryProvider: Send + Sync {
    fn words(&self) -> &[String];
}

/// A lowercased, deduplicated word list.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort_unstable();
        words.dedup();
        Self { words }
    }

    /// One word per line.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let list = Self::new(content.lines());
        log::info!("[Dictionary] Loaded {} words from {}.", list.len(), path.display());
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl DictionaryProvider for WordList {
    fn words(&self) -> &[String] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_entries() {
        let list = WordList::new(["Friend", "friend", "  field ", "", "Fry"]);
        assert_eq!(list.words(), &["field", "friend", "fry"]);
    }

    #[test]
    fn reads_one_word_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "apple\nBanana\n\ncherry\n").unwrap();

        let list = WordList::from_file(&path).unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.words().contains(&"banana".to_string()));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(WordList::from_file(Path::new("/definitely/not/here.txt")).is_err());
    }
}
