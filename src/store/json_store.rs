use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::ProgressData;
use crate::store::wrong_words::WrongWordBook;

const PROGRESS_FILE: &str = "progress.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = Self::default_dir();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("qwerty-learner")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let content = fs::read_to_string(self.file_path(name)).ok()?;
        match serde_json::from_str(&content) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(file = name, error = %e, "ignoring unreadable store file");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Saved position, or `None` when there is none or it is unusable.
    pub fn load_progress(&self) -> Option<ProgressData> {
        self.load::<ProgressData>(PROGRESS_FILE)
            .filter(|p| !p.needs_reset())
    }

    pub fn save_progress(&self, data: &ProgressData) -> Result<()> {
        self.save(PROGRESS_FILE, data)
    }

    /// The wrong-word ledger lives next to the progress file.
    pub fn wrong_word_book(&self) -> WrongWordBook {
        WrongWordBook::in_dir(&self.base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_progress_round_trip() {
        let (_dir, store) = make_test_store();
        assert!(store.load_progress().is_none());

        let progress = ProgressData::new("cet4", 2, 7);
        store.save_progress(&progress).unwrap();
        assert_eq!(store.load_progress(), Some(progress));
        assert!(!store.file_path("progress.tmp").exists());
    }

    #[test]
    fn test_corrupt_progress_is_ignored() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROGRESS_FILE), "{ nope").unwrap();
        assert!(store.load_progress().is_none());
    }

    #[test]
    fn test_stale_schema_is_ignored() {
        let (_dir, store) = make_test_store();
        let mut progress = ProgressData::new("cet4", 1, 1);
        progress.schema_version = 99;
        store.save_progress(&progress).unwrap();
        assert!(store.load_progress().is_none());
    }

    #[test]
    fn test_wrong_word_book_in_store_dir() {
        let (dir, store) = make_test_store();
        let book = store.wrong_word_book();
        assert_eq!(book.path(), dir.path().join("wrong_words.txt"));
    }
}
