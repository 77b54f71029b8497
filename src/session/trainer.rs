use std::time::{Duration, Instant};

use crate::dict::{Catalog, Word};
use crate::error::{Result, TrainerError};
use crate::session::cursor::{Cursor, Step};
use crate::session::input::{Comparison, InputState};
use crate::session::mode::{ModeController, Settings};
use crate::store::json_store::JsonStore;
use crate::store::schema::ProgressData;
use crate::store::wrong_words::WrongWordBook;

/// Requests for the audio layer, drained by the host after each event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    Click,
    Success,
    Wrong,
    Pronounce(String),
}

/// The whole typing session. Every keystroke, command and timer tick goes
/// through `&mut self`, so mutations are serialized by ownership.
pub struct Trainer {
    catalog: Catalog,
    cursor: Cursor,
    input: InputState,
    modes: ModeController,
    book: Option<WrongWordBook>,
    store: Option<JsonStore>,
    voice_lock: bool,
    cues: Vec<Cue>,
    message: Option<String>,
}

impl Trainer {
    /// Open `dict_id`, or the first catalog entry if it is `None` or cannot
    /// be loaded.
    pub fn new(catalog: Catalog, settings: Settings, dict_id: Option<&str>) -> Result<Self> {
        let dictionary = match dict_id.map(|id| catalog.load(id)) {
            Some(Ok(dictionary)) => dictionary,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "falling back to first dictionary");
                Self::load_first(&catalog)?
            }
            None => Self::load_first(&catalog)?,
        };

        let cursor = Cursor::new(dictionary, settings.chapter_length);
        let input = InputState::new(settings.highlight_wrong_delay);
        Ok(Self {
            catalog,
            cursor,
            input,
            modes: ModeController::new(settings),
            book: None,
            store: None,
            voice_lock: false,
            cues: Vec::new(),
            message: None,
        })
    }

    fn load_first(catalog: &Catalog) -> Result<crate::dict::Dictionary> {
        let first = catalog
            .list()
            .first()
            .ok_or_else(|| TrainerError::NotFound("<empty catalog>".to_string()))?;
        catalog.load(&first.id)
    }

    pub fn with_wrong_word_book(mut self, book: WrongWordBook) -> Self {
        self.book = Some(book);
        self
    }

    /// Attach progress storage and jump to the saved position, if it still
    /// refers to this dictionary.
    pub fn with_store(mut self, store: JsonStore) -> Self {
        if let Some(progress) = store.load_progress()
            && progress.dict_id.as_deref() == Some(self.cursor.dictionary().id())
        {
            self.cursor.restore(progress.chapter, progress.word);
        }
        self.store = Some(store);
        self
    }

    /// Turn the session on or off. Starting re-initialises the current word.
    pub fn toggle_active(&mut self, now: Instant) -> bool {
        let active = !self.modes.is_active();
        self.modes.set_active(active, now);
        if active {
            self.begin_word();
        } else {
            self.input.reset();
        }
        active
    }

    pub fn set_active(&mut self, active: bool, now: Instant) {
        if self.modes.is_active() != active {
            self.toggle_active(now);
        }
    }

    pub fn type_char(&mut self, ch: char) -> Option<Comparison> {
        self.type_char_at(ch, Instant::now())
    }

    /// Handle one typed character. `None` means the key was swallowed
    /// without effect.
    pub fn type_char_at(&mut self, ch: char, now: Instant) -> Option<Comparison> {
        if !self.modes.is_active() || self.modes.settings().read_only_mode {
            return None;
        }
        if self.input.has_wrong() {
            return None;
        }

        self.cues.push(Cue::Click);
        let result = self.input.consume_at(ch, now)?;
        match &result {
            Comparison::Continuing => {}
            Comparison::Completed => {
                self.cues.push(Cue::Success);
                self.finish_word();
            }
            Comparison::Mismatch(mismatch) => {
                self.cues.push(Cue::Wrong);
                tracing::debug!(
                    word = %mismatch.word,
                    index = mismatch.index,
                    expected = %mismatch.expected,
                    actual = %mismatch.actual,
                    "mismatch"
                );
                self.record_wrong(&mismatch.word, &mismatch.translation);
            }
        }
        Some(result)
    }

    /// Timer entry point: clears an expired error highlight and runs the
    /// read-only auto-advance. Returns true when anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.modes.is_active() {
            return false;
        }
        let mut changed = false;
        if self.input.cooldown_elapsed(now) {
            changed |= self.input.clear_wrong();
        }
        if self.modes.poll_read_only(now) {
            self.finish_word();
            changed = true;
        }
        changed
    }

    /// Advance after a completed word (or an auto-advance tick).
    pub fn finish_word(&mut self) -> Step {
        self.next_word()
    }

    pub fn next_word(&mut self) -> Step {
        let step = self.cursor.next_word(self.modes.settings().chapter_cycle_mode);
        match step {
            Step::EndOfDictionary => {
                self.message = Some(format!(
                    "end of {}; turn on chapter cycle mode to start over",
                    self.cursor.dictionary().name()
                ));
            }
            Step::Wrapped => {
                self.message = Some("back to chapter 1".to_string());
            }
            _ => {}
        }
        self.begin_word();
        self.save_progress();
        step
    }

    pub fn prev_word(&mut self) -> Step {
        let step = self.cursor.prev_word();
        self.begin_word();
        self.save_progress();
        step
    }

    /// Switch dictionaries. Any partially typed word is discarded. On error
    /// nothing changes.
    pub fn select_dictionary(&mut self, id: &str) -> Result<()> {
        self.cursor.select_dictionary(&self.catalog, id)?;
        self.input.reset();
        self.begin_word();
        self.save_progress();
        Ok(())
    }

    /// Cycle to the next catalog entry, skipping ones that fail to load.
    pub fn next_dictionary(&mut self) -> Result<()> {
        let len = self.catalog.list().len();
        let current = self
            .catalog
            .position(self.cursor.dictionary().id())
            .unwrap_or(0);
        let mut last_err = None;
        for offset in 1..len {
            let id = self.catalog.list()[(current + offset) % len].id.clone();
            match self.select_dictionary(&id) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping dictionary");
                    last_err = Some(e);
                }
            }
        }
        last_err.map_or(Ok(()), Err)
    }

    pub fn select_chapter(&mut self, chapter: usize) -> Result<()> {
        self.cursor.select_chapter(chapter)?;
        self.begin_word();
        self.save_progress();
        Ok(())
    }

    pub fn next_chapter(&mut self) -> Result<()> {
        self.select_chapter(self.cursor.chapter() + 1)
    }

    pub fn prev_chapter(&mut self) -> Result<()> {
        let chapter = self.cursor.chapter().checked_sub(1).ok_or(TrainerError::Range {
            what: "chapter",
            index: 0,
            len: self.cursor.total_chapters(),
        })?;
        self.select_chapter(chapter)
    }

    pub fn set_chapter_length(&mut self, chapter_length: usize) {
        let chapter_length = self.modes.set_chapter_length(chapter_length);
        self.cursor.set_chapter_length(chapter_length);
        self.begin_word();
        self.save_progress();
    }

    pub fn set_placeholder(&mut self, placeholder: char) {
        self.modes.set_placeholder(placeholder);
    }

    pub fn set_highlight_wrong_delay(&mut self, delay: Duration) {
        self.modes.set_highlight_wrong_delay(delay);
        self.input.set_cooldown(delay);
    }

    pub fn set_read_only_interval(&mut self, interval: Duration, now: Instant) {
        self.modes.set_read_only_interval(interval, now);
    }

    pub fn toggle_read_only(&mut self, now: Instant) -> bool {
        let on = self.modes.toggle_read_only(now);
        if on {
            // Typing is disabled; don't leave a half-typed word behind.
            self.begin_word();
        }
        on
    }

    pub fn toggle_chapter_cycle(&mut self) -> bool {
        let on = self.modes.toggle_chapter_cycle();
        self.message = Some(if on {
            "chapter cycle mode on".to_string()
        } else {
            "chapter cycle mode off".to_string()
        });
        on
    }

    pub fn toggle_word_visibility(&mut self) -> bool {
        self.modes.toggle_word_visibility()
    }

    pub fn toggle_translation(&mut self) -> bool {
        self.modes.toggle_translation()
    }

    pub fn toggle_dict_name(&mut self) -> bool {
        self.modes.toggle_dict_name()
    }

    /// Ask the audio layer to pronounce the current word, unless a previous
    /// request is still playing.
    pub fn play_voice(&mut self) -> bool {
        if !self.modes.is_active() || self.voice_lock {
            return false;
        }
        self.voice_lock = true;
        self.cues
            .push(Cue::Pronounce(self.cursor.current_word().name.clone()));
        true
    }

    /// The audio layer finished (or gave up on) the last pronunciation.
    pub fn voice_finished(&mut self) {
        self.voice_lock = false;
    }

    pub fn take_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn is_active(&self) -> bool {
        self.modes.is_active()
    }

    pub fn settings(&self) -> &Settings {
        self.modes.settings()
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_word(&self) -> &Word {
        self.cursor.current_word()
    }

    pub fn wrong_word_book(&self) -> Option<&WrongWordBook> {
        self.book.as_ref()
    }

    pub fn progress(&self) -> ProgressData {
        ProgressData::new(
            self.cursor.dictionary().id(),
            self.cursor.chapter(),
            self.cursor.word_index(),
        )
    }

    fn begin_word(&mut self) {
        if !self.modes.is_active() {
            return;
        }
        let word = self.cursor.current_word().clone();
        self.input.start_word(&word);
        self.play_voice();
    }

    fn record_wrong(&mut self, word: &str, translation: &str) {
        let Some(book) = &self.book else {
            return;
        };
        if let Err(e) = book.record(word, translation) {
            tracing::error!(error = %e, "failed to record wrong word");
            self.message = Some(format!("could not save wrong word: {e}"));
        }
    }

    fn save_progress(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save_progress(&self.progress()) {
            tracing::warn!(error = %e, "failed to save progress");
        }
    }
}
