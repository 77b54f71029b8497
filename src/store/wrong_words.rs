use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{ParseError, Result};

pub const WRONG_WORDS_FILE: &str = "wrong_words.txt";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrongWordEntry {
    pub word: String,
    pub translation: String,
    pub count: u32,
}

impl WrongWordEntry {
    fn to_line(&self) -> String {
        format!("{} {} {}", self.word, self.translation, self.count)
    }
}

/// Per-word mistake counts, kept sorted by descending count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrongWordLedger {
    entries: Vec<WrongWordEntry>,
}

impl WrongWordLedger {
    /// Count one more mistake on `word` and return its new count. The
    /// translation is only stored the first time a word is seen.
    pub fn record(&mut self, word: &str, translation: &str) -> u32 {
        let word = word.trim();
        let count = match self.entries.iter_mut().find(|e| e.word == word) {
            Some(entry) => {
                entry.count = entry.count.saturating_add(1);
                entry.count
            }
            None => {
                self.entries.push(WrongWordEntry {
                    word: word.to_string(),
                    translation: sanitize_translation(translation),
                    count: 1,
                });
                1
            }
        };
        self.sort();
        count
    }

    pub fn entries(&self) -> &[WrongWordEntry] {
        &self.entries
    }

    pub fn get(&self, word: &str) -> Option<&WrongWordEntry> {
        self.entries.iter().find(|e| e.word == word)
    }

    pub fn remove(&mut self, word: &str) -> Option<WrongWordEntry> {
        let idx = self.entries.iter().position(|e| e.word == word)?;
        Some(self.entries.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `<word> <translation> <count>` record per line.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(WrongWordEntry::to_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse ledger text. Bad lines are skipped and reported; they never
    /// affect the entries that did parse.
    pub fn deserialize(content: &str) -> (Self, Vec<ParseError>) {
        Self::from_lines(content.split('\n').map(Ok))
    }

    /// Like [`deserialize`](Self::deserialize), but decodes each line on its
    /// own so one line that is not UTF-8 is reported instead of losing the file.
    pub fn deserialize_bytes(content: &[u8]) -> (Self, Vec<ParseError>) {
        Self::from_lines(content.split(|b| *b == b'\n').map(|raw| {
            std::str::from_utf8(raw).map_err(|e| format!("line is not valid UTF-8: {e}"))
        }))
    }

    fn from_lines<'a>(
        lines: impl Iterator<Item = std::result::Result<&'a str, String>>,
    ) -> (Self, Vec<ParseError>) {
        let mut ledger = Self::default();
        let mut errors = Vec::new();

        for (idx, raw) in lines.enumerate() {
            let parsed = raw.and_then(|raw| {
                let line = raw.trim_end_matches('\r');
                if line.trim().is_empty() {
                    return Ok(None);
                }
                parse_line(line).map(Some)
            });
            match parsed {
                Ok(None) => {}
                Ok(Some(entry)) => match ledger.entries.iter_mut().find(|e| e.word == entry.word) {
                    // A repeated word replaces the earlier record.
                    Some(existing) => *existing = entry,
                    None => ledger.entries.push(entry),
                },
                Err(reason) => errors.push(ParseError {
                    line: idx + 1,
                    reason,
                }),
            }
        }

        ledger.sort();
        (ledger, errors)
    }

    fn sort(&mut self) {
        // Stable, so equal counts keep their relative order.
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
    }
}

fn parse_line(line: &str) -> std::result::Result<WrongWordEntry, String> {
    let mut parts = line.rsplitn(3, ' ');
    let (Some(count), Some(translation), Some(word)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected `<word> <translation> <count>`, got `{line}`"));
    };
    if word.trim().is_empty() {
        return Err("empty word".to_string());
    }
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid count `{count}`: {e}"))?;
    Ok(WrongWordEntry {
        word: word.to_string(),
        translation: translation.to_string(),
        count,
    })
}

/// Translations are stored as a single token so the last two fields of a
/// line stay unambiguous.
fn sanitize_translation(translation: &str) -> String {
    translation
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// The ledger's backing file. Every record re-reads the file, updates it and
/// rewrites it in full.
pub struct WrongWordBook {
    path: PathBuf,
}

impl WrongWordBook {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(WRONG_WORDS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty ledger.
    pub fn load(&self) -> Result<(WrongWordLedger, Vec<ParseError>)> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let (ledger, errors) = WrongWordLedger::deserialize_bytes(&content);
        for err in &errors {
            tracing::warn!(path = %self.path.display(), %err, "skipping wrong-word line");
        }
        Ok((ledger, errors))
    }

    pub fn record(&self, word: &str, translation: &str) -> Result<u32> {
        let (mut ledger, _) = self.load()?;
        let count = ledger.record(word, translation);
        self.save(&ledger)?;
        tracing::info!(word, count, "wrong word recorded");
        Ok(count)
    }

    /// Create the file if it does not exist yet, so it can be opened.
    pub fn touch(&self) -> Result<()> {
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, "")?;
        }
        Ok(())
    }

    pub fn save(&self, ledger: &WrongWordLedger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("txt.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(ledger.serialize().as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_twice_counts_two() {
        let mut ledger = WrongWordLedger::default();
        assert_eq!(ledger.record("apple", "苹果"), 1);
        assert_eq!(ledger.record("apple", "苹果"), 2);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get("apple").unwrap().count, 2);
    }

    #[test]
    fn translation_fixed_at_first_insert() {
        let mut ledger = WrongWordLedger::default();
        ledger.record("bank", "银行");
        ledger.record("bank", "河岸");
        assert_eq!(ledger.get("bank").unwrap().translation, "银行");

        ledger.remove("bank");
        ledger.record("bank", "河岸");
        assert_eq!(ledger.get("bank").unwrap().translation, "河岸");
        assert_eq!(ledger.get("bank").unwrap().count, 1);
    }

    #[test]
    fn repeat_error_moves_word_above_single_counts() {
        let mut ledger = WrongWordLedger::default();
        ledger.record("banana", "香蕉");
        ledger.record("apple", "苹果");
        assert_eq!(ledger.serialize(), "banana 香蕉 1\napple 苹果 1");
        ledger.record("apple", "苹果");
        assert_eq!(ledger.serialize(), "apple 苹果 2\nbanana 香蕉 1");
    }

    #[test]
    fn serialize_then_deserialize_preserves_entries() {
        let mut ledger = WrongWordLedger::default();
        ledger.record("ice cream", "冰淇淋");
        ledger.record("cancel", "v. 取消；撤销");
        ledger.record("cancel", "v. 取消；撤销");
        ledger.record("x", "");

        let (back, errors) = WrongWordLedger::deserialize(&ledger.serialize());
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(back, ledger);
        assert_eq!(back.get("ice cream").unwrap().translation, "冰淇淋");
        assert_eq!(back.get("cancel").unwrap().translation, "v._取消；撤销");
        assert_eq!(back.get("x").unwrap().translation, "");
    }

    #[test]
    fn malformed_lines_are_isolated() {
        let content = "apple 苹果 3\nbroken\npear 梨 many\n\nplum 李子 1\r\n";
        let (ledger, errors) = WrongWordLedger::deserialize(content);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get("apple").unwrap().count, 3);
        assert_eq!(ledger.get("plum").unwrap().count, 1);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].line, 2);
        assert_eq!(errors[1].line, 3);
        assert!(errors[1].reason.contains("many"));
    }

    #[test]
    fn deserialize_sorts_by_count() {
        let (ledger, _) = WrongWordLedger::deserialize("a x 1\nb y 5\nc z 3");
        let order: Vec<&str> = ledger.entries().iter().map(|e| e.word.as_str()).collect();
        assert_eq!(order, ["b", "c", "a"]);
    }

    #[test]
    fn book_record_rewrites_file_sorted() {
        let dir = TempDir::new().unwrap();
        let book = WrongWordBook::in_dir(dir.path());

        assert!(book.load().unwrap().0.is_empty());
        book.record("banana", "香蕉").unwrap();
        book.record("apple", "苹果").unwrap();
        assert_eq!(book.record("apple", "苹果").unwrap(), 2);

        let content = fs::read_to_string(book.path()).unwrap();
        assert_eq!(content, "apple 苹果 2\nbanana 香蕉 1");
        assert!(!dir.path().join("wrong_words.txt.tmp").exists());
    }

    #[test]
    fn book_record_survives_corrupt_line() {
        let dir = TempDir::new().unwrap();
        let book = WrongWordBook::in_dir(dir.path());
        fs::write(book.path(), "apple 苹果 2\ngarbage line NaN\n").unwrap();

        book.record("pear", "梨").unwrap();
        let (ledger, errors) = book.load().unwrap();
        assert!(errors.is_empty());
        assert_eq!(ledger.get("apple").unwrap().count, 2);
        assert_eq!(ledger.get("pear").unwrap().count, 1);
    }

    #[test]
    fn book_record_survives_non_utf8_line() {
        let dir = TempDir::new().unwrap();
        let book = WrongWordBook::in_dir(dir.path());
        let mut content = "apple 苹果 3\n".as_bytes().to_vec();
        content.extend_from_slice(b"caf\xe9 coffee 1\npear x 2\n");
        fs::write(book.path(), content).unwrap();

        let (ledger, errors) = book.load().unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);

        assert_eq!(book.record("plum", "李子").unwrap(), 1);
        let (ledger, errors) = book.load().unwrap();
        assert!(errors.is_empty());
        assert_eq!(ledger.get("apple").unwrap().count, 3);
        assert_eq!(ledger.get("pear").unwrap().count, 2);
        assert_eq!(ledger.get("plum").unwrap().count, 1);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn touch_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let book = WrongWordBook::new(dir.path().join("nested").join(WRONG_WORDS_FILE));
        book.touch().unwrap();
        assert_eq!(fs::read_to_string(book.path()).unwrap(), "");
    }
}
