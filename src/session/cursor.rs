use crate::dict::{Catalog, Dictionary, Word};
use crate::error::{Result, TrainerError};

/// Result of moving the cursor one word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Moved within the chapter.
    Moved,
    /// Crossed a chapter boundary.
    ChapterChanged,
    /// Ran past the last word and wrapped to the first chapter.
    Wrapped,
    /// Already on the last word; nothing changed.
    EndOfDictionary,
    /// Already on the first word; nothing changed.
    StartOfDictionary,
}

/// Position of the learner inside a dictionary, split into fixed-size chapters.
///
/// The cursor always addresses an existing word: the dictionary is never
/// empty and every mutation keeps `word` inside the (possibly short) last
/// chapter.
pub struct Cursor {
    dictionary: Dictionary,
    chapter_length: usize,
    chapter: usize,
    word: usize,
}

impl Cursor {
    pub fn new(dictionary: Dictionary, chapter_length: usize) -> Self {
        Self {
            dictionary,
            chapter_length: chapter_length.max(1),
            chapter: 0,
            word: 0,
        }
    }

    /// Load `id` from the catalog and move to its first word. On any error the
    /// current dictionary and position are left untouched.
    pub fn select_dictionary(&mut self, catalog: &Catalog, id: &str) -> Result<()> {
        let dictionary = catalog.load(id)?;
        self.set_dictionary(dictionary);
        Ok(())
    }

    pub fn set_dictionary(&mut self, dictionary: Dictionary) {
        self.dictionary = dictionary;
        self.chapter = 0;
        self.word = 0;
    }

    pub fn select_chapter(&mut self, chapter: usize) -> Result<()> {
        let total = self.total_chapters();
        if chapter >= total {
            return Err(TrainerError::Range {
                what: "chapter",
                index: chapter,
                len: total,
            });
        }
        self.chapter = chapter;
        self.word = 0;
        Ok(())
    }

    /// Jump to a word inside the current chapter.
    pub fn select_word(&mut self, word: usize) -> Result<()> {
        let len = self.chapter_len();
        if word >= len {
            return Err(TrainerError::Range {
                what: "word",
                index: word,
                len,
            });
        }
        self.word = word;
        Ok(())
    }

    pub fn next_word(&mut self, cycle: bool) -> Step {
        if self.word + 1 < self.chapter_len() {
            self.word += 1;
            return Step::Moved;
        }
        if self.chapter + 1 < self.total_chapters() {
            self.chapter += 1;
            self.word = 0;
            return Step::ChapterChanged;
        }
        if cycle {
            self.chapter = 0;
            self.word = 0;
            return Step::Wrapped;
        }
        Step::EndOfDictionary
    }

    pub fn prev_word(&mut self) -> Step {
        if self.word > 0 {
            self.word -= 1;
            return Step::Moved;
        }
        if self.chapter > 0 {
            self.chapter -= 1;
            self.word = self.chapter_len() - 1;
            return Step::ChapterChanged;
        }
        Step::StartOfDictionary
    }

    pub fn current_word(&self) -> &Word {
        &self.dictionary.words()[self.absolute_index()]
    }

    /// Change the chapter size, keeping the learner on the same word.
    pub fn set_chapter_length(&mut self, chapter_length: usize) {
        let absolute = self.absolute_index();
        self.chapter_length = chapter_length.max(1);
        self.chapter = absolute / self.chapter_length;
        self.word = absolute % self.chapter_length;
    }

    /// Move to a saved position, clamping anything that no longer exists.
    pub fn restore(&mut self, chapter: usize, word: usize) {
        self.chapter = chapter.min(self.total_chapters() - 1);
        self.word = word.min(self.chapter_len() - 1);
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn chapter(&self) -> usize {
        self.chapter
    }

    pub fn word_index(&self) -> usize {
        self.word
    }

    pub fn chapter_length(&self) -> usize {
        self.chapter_length
    }

    pub fn total_chapters(&self) -> usize {
        self.dictionary.total_chapters(self.chapter_length)
    }

    pub fn chapter_words(&self) -> &[Word] {
        self.dictionary.chapter(self.chapter, self.chapter_length)
    }

    pub fn chapter_len(&self) -> usize {
        self.chapter_words().len()
    }

    pub fn absolute_index(&self) -> usize {
        self.chapter * self.chapter_length + self.word
    }
}
