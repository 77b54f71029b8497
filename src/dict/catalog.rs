use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_embed::Embed;

use crate::config::Config;
use crate::dict::cache::{DiskCache, fetch_url};
use crate::dict::dictionary::Dictionary;
use crate::dict::word::Word;
use crate::error::{Result, TrainerError};

#[derive(Embed)]
#[folder = "assets/dicts/"]
struct DictAssets;

struct BuiltinDict {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    language: &'static str,
    file: &'static str,
}

const BUILTIN_DICTS: &[BuiltinDict] = &[
    BuiltinDict {
        id: "cet4",
        name: "CET-4",
        description: "大学英语四级词库",
        language: "en",
        file: "cet4.json",
    },
    BuiltinDict {
        id: "cet6",
        name: "CET-6",
        description: "大学英语六级词库",
        language: "en",
        file: "cet6.json",
    },
    BuiltinDict {
        id: "coder",
        name: "Coder Dict",
        description: "程序员常见单词词库",
        language: "code",
        file: "coder.json",
    },
];

/// Where a dictionary's word list comes from.
#[derive(Clone, Debug)]
pub enum DictSource {
    /// Bundled into the binary.
    Embedded(&'static str),
    /// A JSON word list on local disk.
    File(PathBuf),
    /// A JSON word list fetched over HTTPS and cached locally.
    Remote(String),
    /// Words supplied directly by the host.
    Memory(Arc<Vec<Word>>),
}

#[derive(Clone, Debug)]
pub struct DictionaryDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub language: String,
    pub source: DictSource,
}

impl DictionaryDescriptor {
    pub fn inline(id: &str, name: &str) -> Self {
        Self::memory(id, name, Vec::new())
    }

    pub fn memory(id: &str, name: &str, words: Vec<Word>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            url: String::new(),
            language: "en".to_string(),
            source: DictSource::Memory(Arc::new(words)),
        }
    }
}

/// Registry of the dictionaries a session can switch between.
pub struct Catalog {
    entries: Vec<DictionaryDescriptor>,
    downloads_enabled: bool,
    cache: Option<DiskCache>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            downloads_enabled: false,
            cache: None,
        }
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for dict in BUILTIN_DICTS {
            catalog.entries.push(DictionaryDescriptor {
                id: dict.id.to_string(),
                name: dict.name.to_string(),
                description: dict.description.to_string(),
                url: format!("./dicts/{}", dict.file),
                language: dict.language.to_string(),
                source: DictSource::Embedded(dict.file),
            });
        }
        catalog
    }

    /// Built-in lists, then `<dict_dir>/*.json`, then remote lists from config.
    pub fn from_config(config: &Config) -> Self {
        let mut catalog = Self::builtin();
        catalog.scan_dir(Path::new(&config.dict_dir));
        for remote in &config.remote_dicts {
            catalog.push(DictionaryDescriptor {
                id: remote.id.clone(),
                name: remote.name.clone(),
                description: remote.description.clone(),
                url: remote.url.clone(),
                language: "en".to_string(),
                source: DictSource::Remote(remote.url.clone()),
            });
        }
        catalog.downloads_enabled = config.dictionary_downloads_enabled;
        if catalog.downloads_enabled {
            catalog.cache = DiskCache::new("dicts");
        }
        catalog
    }

    /// Add every `*.json` file in `dir` as a user dictionary keyed by its stem.
    pub fn scan_dir(&mut self, dir: &Path) {
        let Ok(read_dir) = fs::read_dir(dir) else {
            return;
        };
        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("json"))
            .collect();
        paths.sort();
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            self.push(DictionaryDescriptor {
                id: stem.to_string(),
                name: stem.to_string(),
                description: path.display().to_string(),
                url: path.display().to_string(),
                language: "en".to_string(),
                source: DictSource::File(path.clone()),
            });
        }
    }

    /// Register a descriptor. Ids are unique; a later entry with a taken id
    /// is ignored.
    pub fn push(&mut self, descriptor: DictionaryDescriptor) -> bool {
        if self.get(&descriptor.id).is_some() {
            tracing::warn!(id = %descriptor.id, "duplicate dictionary id ignored");
            return false;
        }
        self.entries.push(descriptor);
        true
    }

    pub fn list(&self) -> &[DictionaryDescriptor] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&DictionaryDescriptor> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|d| d.id == id)
    }

    pub fn load(&self, id: &str) -> Result<Dictionary> {
        let descriptor = self
            .get(id)
            .ok_or_else(|| TrainerError::NotFound(id.to_string()))?;

        let words = match &descriptor.source {
            DictSource::Embedded(file) => {
                let asset = DictAssets::get(file)
                    .ok_or_else(|| TrainerError::load(id, format!("missing bundled list {file}")))?;
                let content = std::str::from_utf8(asset.data.as_ref())
                    .map_err(|e| TrainerError::load(id, e.to_string()))?;
                parse_words(id, content)?
            }
            DictSource::File(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|e| TrainerError::load(id, format!("{}: {e}", path.display())))?;
                parse_words(id, &content)?
            }
            DictSource::Remote(url) => {
                let content = self.fetch_remote(id, url)?;
                parse_words(id, &content)?
            }
            DictSource::Memory(words) => words
                .iter()
                .cloned()
                .map(Word::normalize)
                .filter(|w| !w.is_empty())
                .collect(),
        };

        tracing::info!(id, words = words.len(), "dictionary loaded");
        Dictionary::new(descriptor.clone(), words)
            .ok_or_else(|| TrainerError::load(id, "dictionary has no words"))
    }

    fn fetch_remote(&self, id: &str, url: &str) -> Result<String> {
        if let Some(content) = self.cache.as_ref().and_then(|c| c.get(url)) {
            return Ok(content);
        }
        if !self.downloads_enabled {
            return Err(TrainerError::load(id, "dictionary downloads are disabled"));
        }
        if !url.starts_with("https://") {
            return Err(TrainerError::load(id, format!("refusing non-https url {url}")));
        }
        tracing::info!(id, url, "fetching dictionary");
        let content = fetch_url(url).map_err(|e| TrainerError::load(id, e))?;
        if let Some(cache) = &self.cache
            && !cache.put(url, &content)
        {
            tracing::warn!(id, "could not cache downloaded dictionary");
        }
        Ok(content)
    }
}

/// Parse a JSON word list. Entries with a blank spelling are dropped.
pub fn parse_words(id: &str, content: &str) -> Result<Vec<Word>> {
    let words: Vec<Word> = serde_json::from_str(content)
        .map_err(|e| TrainerError::load(id, format!("invalid word list: {e}")))?;
    let total = words.len();
    let words: Vec<Word> = words
        .into_iter()
        .map(Word::normalize)
        .filter(|w| !w.is_empty())
        .collect();
    if words.len() != total {
        tracing::debug!(id, dropped = total - words.len(), "blank words dropped");
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_dictionaries_all_load() {
        let catalog = Catalog::builtin();
        assert!(!catalog.list().is_empty());
        for descriptor in catalog.list() {
            let dict = catalog.load(&descriptor.id).unwrap();
            assert!(!dict.is_empty(), "{} is empty", descriptor.id);
            assert!(dict.words().iter().all(|w| !w.translation().is_empty()));
        }
    }

    #[test]
    fn unknown_id_is_not_found() {
        let catalog = Catalog::builtin();
        assert!(matches!(
            catalog.load("no-such-dict"),
            Err(TrainerError::NotFound(id)) if id == "no-such-dict"
        ));
    }

    #[test]
    fn user_dir_lists_json_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("mine.json"),
            r#"[{"name":"alpha","trans":["甲"]},{"name":"  ","trans":["空"]}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = Catalog::builtin();
        catalog.scan_dir(dir.path());
        assert!(catalog.get("notes").is_none());

        let dict = catalog.load("mine").unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.words()[0].name, "alpha");
    }

    #[test]
    fn malformed_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        let mut catalog = Catalog::empty();
        catalog.scan_dir(dir.path());
        assert!(matches!(catalog.load("broken"), Err(TrainerError::Load { .. })));
    }

    #[test]
    fn empty_list_is_load_error() {
        let mut catalog = Catalog::empty();
        catalog.push(DictionaryDescriptor::inline("void", "Void"));
        assert!(matches!(catalog.load("void"), Err(TrainerError::Load { .. })));
    }

    #[test]
    fn remote_without_downloads_is_load_error() {
        let mut config = Config::default();
        config.dict_dir = "/nonexistent/qwerty-learner-test".to_string();
        config.remote_dicts.push(crate::config::RemoteDict {
            id: "far".to_string(),
            name: "Far".to_string(),
            description: String::new(),
            url: "https://example.invalid/far.json".to_string(),
        });
        let catalog = Catalog::from_config(&config);
        assert!(catalog.get("far").is_some());
        assert!(matches!(catalog.load("far"), Err(TrainerError::Load { .. })));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut catalog = Catalog::builtin();
        let first_name = catalog.list()[0].name.clone();
        let id = catalog.list()[0].id.clone();
        assert!(!catalog.push(DictionaryDescriptor::memory(&id, "Other", vec![Word::new("a", "b")])));
        assert_eq!(catalog.get(&id).unwrap().name, first_name);
    }
}
