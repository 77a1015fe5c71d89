// File: src/persistence.rs
use crate::core::types::UserProfile;
use crate::error::Result;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

/// Keyed storage for user profiles. Each `save` replaces the stored profile
/// as a whole; readers never observe a partial write.
pub trait ProfileBackend: Send + Sync {
    /// `Ok(None)` when the user has never been stored.
    fn load(&self, user_id: &str) -> Result<Option<UserProfile>>;
    fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()>;
}

/// One bincode file per user under a directory.
pub struct FileProfileBackend {
    dir: PathBuf,
}

impl FileProfileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// User ids are hex-encoded so no id can escape the directory.
    fn path_for(&self, user_id: &str) -> PathBuf {
        let name: String = user_id.bytes().map(|b| format!("{:02x}", b)).collect();
        self.dir.join(format!("{}.bin", name))
    }
}

impl ProfileBackend for FileProfileBackend {
    fn load(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let file = match File::open(self.path_for(user_id)) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let profile: UserProfile = bincode::deserialize_from(BufReader::new(file))?;
        Ok(Some(profile))
    }

    fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let temp_file = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            bincode::serialize_into(&mut writer, profile)?;
            writer.flush()?;
        }
        temp_file
            .persist(self.path_for(user_id))
            .map_err(|e| e.error)?;
        Ok(())
    }
}

/// Profiles kept only for the life of the process.
#[derive(Default)]
pub struct MemoryProfileBackend {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl MemoryProfileBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileBackend for MemoryProfileBackend {
    fn load(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.get(user_id).cloned())
    }

    fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backend_round_trips_a_profile() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileProfileBackend::new(dir.path());

        let mut profile = UserProfile::default();
        profile.lexicon.insert("GitHub".into());
        profile.accepted_words.insert("the".into(), 3);
        profile.adaptive_weights.visual_substitution = 1.7;

        backend.save("alice", &profile).unwrap();
        assert_eq!(backend.load("alice").unwrap(), Some(profile));
    }

    #[test]
    fn unknown_user_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileProfileBackend::new(dir.path().join("not-created-yet"));
        assert_eq!(backend.load("nobody").unwrap(), None);
    }

    #[test]
    fn user_ids_cannot_escape_the_directory() {
        let backend = FileProfileBackend::new("/profiles");
        let path = backend.path_for("../../etc/passwd");
        assert_eq!(path.parent(), Some(std::path::Path::new("/profiles")));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileProfileBackend::new(dir.path());
        fs::write(backend.path_for("bob"), b"\xff\xff\xff").unwrap();
        assert!(backend.load("bob").is_err());
    }

    #[test]
    fn memory_backend_keeps_users_apart() {
        let backend = MemoryProfileBackend::new();
        let mut profile = UserProfile::default();
        profile.lexicon.insert("teh".into());
        backend.save("a", &profile).unwrap();

        assert!(backend.load("a").unwrap().unwrap().lexicon.contains("teh"));
        assert_eq!(backend.load("b").unwrap(), None);
    }
}
