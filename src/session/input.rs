use std::time::{Duration, Instant};

use crate::dict::Word;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No word started yet, or the previous one was discarded.
    Idle,
    Matching,
    Completed,
    /// A wrong key was pressed; input is ignored until `clear_wrong`.
    Errored,
}

/// What a single keystroke did to the current word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// Prefix extended, word not finished yet.
    Continuing,
    /// The last character of the word was just typed.
    Completed,
    Mismatch(Mismatch),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub index: usize,
    pub expected: char,
    pub actual: char,
    pub word: String,
    pub translation: String,
}

pub struct InputState {
    word: Option<Word>,
    target: Vec<char>,
    typed: Vec<char>,
    state: EngineState,
    cooldown: Duration,
    lock_until: Option<Instant>,
}

impl InputState {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            word: None,
            target: Vec::new(),
            typed: Vec::new(),
            state: EngineState::Idle,
            cooldown,
            lock_until: None,
        }
    }

    pub fn start_word(&mut self, word: &Word) {
        self.target = word.chars();
        self.word = Some(word.clone());
        self.typed.clear();
        self.lock_until = None;
        self.state = if self.target.is_empty() {
            EngineState::Completed
        } else {
            EngineState::Matching
        };
    }

    /// Drop the current word and any partial input.
    pub fn reset(&mut self) {
        self.word = None;
        self.target.clear();
        self.typed.clear();
        self.lock_until = None;
        self.state = EngineState::Idle;
    }

    pub fn consume(&mut self, ch: char) -> Option<Comparison> {
        self.consume_at(ch, Instant::now())
    }

    /// Feed one character. Returns `None` when the keystroke is ignored:
    /// nothing started, word already completed, or waiting out an error.
    pub fn consume_at(&mut self, ch: char, now: Instant) -> Option<Comparison> {
        if self.state != EngineState::Matching {
            return None;
        }

        let index = self.typed.len();
        let expected = self.target[index];
        if ch != expected {
            self.state = EngineState::Errored;
            self.lock_until = Some(now + self.cooldown);
            let (word, translation) = match &self.word {
                Some(w) => (w.name.clone(), w.translation()),
                None => (self.target.iter().collect(), String::new()),
            };
            return Some(Comparison::Mismatch(Mismatch {
                index,
                expected,
                actual: ch,
                word,
                translation,
            }));
        }

        self.typed.push(ch);
        if self.typed.len() == self.target.len() {
            self.state = EngineState::Completed;
            Some(Comparison::Completed)
        } else {
            Some(Comparison::Continuing)
        }
    }

    /// Leave the error state and start the word over. No-op unless errored.
    pub fn clear_wrong(&mut self) -> bool {
        if self.state != EngineState::Errored {
            return false;
        }
        self.typed.clear();
        self.lock_until = None;
        self.state = EngineState::Matching;
        true
    }

    pub fn cooldown_elapsed(&self, now: Instant) -> bool {
        self.state == EngineState::Errored && self.lock_until.is_none_or(|until| now >= until)
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn has_wrong(&self) -> bool {
        self.state == EngineState::Errored
    }

    pub fn word(&self) -> Option<&Word> {
        self.word.as_ref()
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn lock_until(&self) -> Option<Instant> {
        self.lock_until
    }

    pub fn progress(&self) -> f64 {
        if self.target.is_empty() {
            return 0.0;
        }
        self.typed.len() as f64 / self.target.len() as f64
    }
}
