use crate::dict::catalog::DictionaryDescriptor;
use crate::dict::word::Word;

/// A loaded word list. Immutable once built; always holds at least one word.
#[derive(Clone, Debug)]
pub struct Dictionary {
    descriptor: DictionaryDescriptor,
    words: Vec<Word>,
}

impl Dictionary {
    /// Returns `None` for an empty word list, which could never satisfy the
    /// cursor invariant.
    pub fn new(descriptor: DictionaryDescriptor, words: Vec<Word>) -> Option<Self> {
        if words.is_empty() {
            return None;
        }
        Some(Self { descriptor, words })
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &DictionaryDescriptor {
        &self.descriptor
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn total_chapters(&self, chapter_length: usize) -> usize {
        self.words.len().div_ceil(chapter_length.max(1))
    }

    /// Words of chapter `chapter`; empty when the chapter does not exist.
    pub fn chapter(&self, chapter: usize, chapter_length: usize) -> &[Word] {
        let chapter_length = chapter_length.max(1);
        let start = chapter.saturating_mul(chapter_length);
        if start >= self.words.len() {
            return &[];
        }
        let end = (start + chapter_length).min(self.words.len());
        &self.words[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> Dictionary {
        let words = (0..count)
            .map(|i| Word::new(&format!("w{i}"), &format!("t{i}")))
            .collect();
        Dictionary::new(DictionaryDescriptor::inline("test", "Test"), words).unwrap()
    }

    #[test]
    fn chapter_count_rounds_up() {
        let dict = numbered(25);
        assert_eq!(dict.total_chapters(10), 3);
        assert_eq!(dict.chapter(0, 10).len(), 10);
        assert_eq!(dict.chapter(2, 10).len(), 5);
        assert_eq!(dict.chapter(2, 10)[0].name, "w20");
        assert!(dict.chapter(3, 10).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let dict = numbered(20);
        assert_eq!(dict.total_chapters(10), 2);
        assert_eq!(dict.chapter(1, 10).len(), 10);
    }

    #[test]
    fn empty_word_list_is_rejected() {
        assert!(Dictionary::new(DictionaryDescriptor::inline("x", "X"), Vec::new()).is_none());
    }
}
