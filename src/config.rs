use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const MIN_CHAPTER_LENGTH: usize = 1;
pub const MAX_CHAPTER_LENGTH: usize = 500;
pub const MIN_READ_ONLY_INTERVAL_MS: u64 = 500;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_placeholder")]
    pub placeholder: char,
    #[serde(default = "default_chapter_length")]
    pub chapter_length: usize,
    #[serde(default = "default_true")]
    pub word_visibility: bool,
    #[serde(default)]
    pub read_only_mode: bool,
    #[serde(default = "default_read_only_interval_ms")]
    pub read_only_interval_ms: u64,
    #[serde(default = "default_highlight_wrong_delay_ms")]
    pub highlight_wrong_delay_ms: u64,
    #[serde(default)]
    pub chapter_cycle_mode: bool,
    #[serde(default = "default_true")]
    pub translation_visible: bool,
    #[serde(default = "default_true")]
    pub dict_name_visible: bool,
    #[serde(default = "default_dict_dir")]
    pub dict_dir: String,
    #[serde(default)]
    pub dictionary_downloads_enabled: bool,
    #[serde(default)]
    pub remote_dicts: Vec<RemoteDict>,
}

/// A word list published at an `https://` URL, declared by the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDict {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
}

fn default_placeholder() -> char {
    '_'
}
fn default_chapter_length() -> usize {
    20
}
fn default_true() -> bool {
    true
}
fn default_read_only_interval_ms() -> u64 {
    5000
}
fn default_highlight_wrong_delay_ms() -> u64 {
    400
}
fn default_dict_dir() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qwerty-learner")
        .join("dicts")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            chapter_length: default_chapter_length(),
            word_visibility: true,
            read_only_mode: false,
            read_only_interval_ms: default_read_only_interval_ms(),
            highlight_wrong_delay_ms: default_highlight_wrong_delay_ms(),
            chapter_cycle_mode: false,
            translation_visible: true,
            dict_name_visible: true,
            dict_dir: default_dict_dir(),
            dictionary_downloads_enabled: false,
            remote_dicts: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("qwerty-learner")
            .join("config.toml")
    }

    /// Clamp numeric settings into ranges the trainer can work with.
    /// Call after deserialization or after applying CLI overrides.
    pub fn validate(&mut self) {
        self.chapter_length = self
            .chapter_length
            .clamp(MIN_CHAPTER_LENGTH, MAX_CHAPTER_LENGTH);
        self.read_only_interval_ms = self.read_only_interval_ms.max(MIN_READ_ONLY_INTERVAL_MS);
        if self.placeholder.is_control() {
            self.placeholder = default_placeholder();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.placeholder, '_');
        assert_eq!(config.chapter_length, 20);
        assert!(config.word_visibility);
        assert!(!config.read_only_mode);
        assert!(!config.chapter_cycle_mode);
        assert!(config.translation_visible);
        assert!(config.dict_name_visible);
        assert!(config.dict_dir.contains("dicts"));
    }

    #[test]
    fn test_config_serde_partial_file() {
        let toml_str = r#"
placeholder = "*"
chapter_length = 10
chapter_cycle_mode = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.placeholder, '*');
        assert_eq!(config.chapter_length, 10);
        assert!(config.chapter_cycle_mode);
        assert_eq!(config.read_only_interval_ms, 5000);
        assert_eq!(config.highlight_wrong_delay_ms, 400);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.translation_visible = false;
        config.placeholder = '#';
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.placeholder, '#');
        assert!(!deserialized.translation_visible);
        assert_eq!(deserialized.dict_dir, config.dict_dir);
    }

    #[test]
    fn test_config_remote_dicts_table() {
        let toml_str = r#"
dictionary_downloads_enabled = true

[[remote_dicts]]
id = "gre"
name = "GRE"
url = "https://example.org/gre.json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.dictionary_downloads_enabled);
        assert_eq!(config.remote_dicts.len(), 1);
        assert_eq!(config.remote_dicts[0].id, "gre");
        assert!(config.remote_dicts[0].description.is_empty());
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.chapter_length = 0;
        config.read_only_interval_ms = 10;
        config.placeholder = '\n';
        config.validate();
        assert_eq!(config.chapter_length, MIN_CHAPTER_LENGTH);
        assert_eq!(config.read_only_interval_ms, MIN_READ_ONLY_INTERVAL_MS);
        assert_eq!(config.placeholder, '_');

        config.chapter_length = 10_000;
        config.validate();
        assert_eq!(config.chapter_length, MAX_CHAPTER_LENGTH);
    }
}
