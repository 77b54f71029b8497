use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: u32 = 1;

/// Where the learner left off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    pub dict_id: Option<String>,
    #[serde(default)]
    pub chapter: usize,
    #[serde(default)]
    pub word: usize,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            dict_id: None,
            chapter: 0,
            word: 0,
            updated_at: None,
        }
    }
}

impl ProgressData {
    pub fn new(dict_id: &str, chapter: usize, word: usize) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            dict_id: Some(dict_id.to_string()),
            chapter,
            word,
            updated_at: Some(Utc::now()),
        }
    }

    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
