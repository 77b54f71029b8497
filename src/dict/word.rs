use icu_normalizer::ComposingNormalizerBorrowed;
use serde::{Deserialize, Serialize};

/// Separator used when joining several translation senses for display.
pub const TRANSLATION_SEPARATOR: &str = "；";

/// One entry of a word list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub name: String,
    #[serde(default)]
    pub trans: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usphone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ukphone: Option<String>,
}

impl Word {
    pub fn new(name: &str, translation: &str) -> Self {
        Self {
            name: name.to_string(),
            trans: vec![translation.to_string()],
            usphone: None,
            ukphone: None,
        }
    }

    /// Expected spelling as the sequence of characters a typist must enter.
    pub fn chars(&self) -> Vec<char> {
        self.name.chars().collect()
    }

    pub fn len(&self) -> usize {
        self.name.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    pub fn translation(&self) -> String {
        self.trans
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(TRANSLATION_SEPARATOR)
    }

    /// Phonetic transcription, preferring the American one.
    pub fn phonetic(&self) -> Option<&str> {
        self.usphone
            .as_deref()
            .or(self.ukphone.as_deref())
            .filter(|p| !p.is_empty())
    }

    /// Trim the spelling and bring it into NFC so that precomposed keyboard
    /// input compares equal to decomposed dictionary data.
    pub(crate) fn normalize(mut self) -> Self {
        let nfc = ComposingNormalizerBorrowed::new_nfc();
        self.name = nfc.normalize(self.name.trim()).into_owned();
        self
    }
}
