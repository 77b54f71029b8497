use std::time::{Duration, Instant};

use crate::config::{Config, MAX_CHAPTER_LENGTH, MIN_CHAPTER_LENGTH, MIN_READ_ONLY_INTERVAL_MS};

/// Session-wide switches and tunables, owned by the mode controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub placeholder: char,
    pub chapter_length: usize,
    pub word_visibility: bool,
    pub read_only_mode: bool,
    pub chapter_cycle_mode: bool,
    pub translation_visible: bool,
    pub dict_name_visible: bool,
    pub read_only_interval: Duration,
    pub highlight_wrong_delay: Duration,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            placeholder: config.placeholder,
            chapter_length: config.chapter_length,
            word_visibility: config.word_visibility,
            read_only_mode: config.read_only_mode,
            chapter_cycle_mode: config.chapter_cycle_mode,
            translation_visible: config.translation_visible,
            dict_name_visible: config.dict_name_visible,
            read_only_interval: Duration::from_millis(config.read_only_interval_ms),
            highlight_wrong_delay: Duration::from_millis(config.highlight_wrong_delay_ms),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl Settings {
    /// Copy only the switches that differ from `baseline` into `config`.
    /// One-off overrides baked into the baseline are left out of the file.
    pub fn apply_changes(&self, baseline: &Settings, config: &mut Config) {
        if self.placeholder != baseline.placeholder {
            config.placeholder = self.placeholder;
        }
        if self.chapter_length != baseline.chapter_length {
            config.chapter_length = self.chapter_length;
        }
        if self.word_visibility != baseline.word_visibility {
            config.word_visibility = self.word_visibility;
        }
        if self.read_only_mode != baseline.read_only_mode {
            config.read_only_mode = self.read_only_mode;
        }
        if self.chapter_cycle_mode != baseline.chapter_cycle_mode {
            config.chapter_cycle_mode = self.chapter_cycle_mode;
        }
        if self.translation_visible != baseline.translation_visible {
            config.translation_visible = self.translation_visible;
        }
        if self.dict_name_visible != baseline.dict_name_visible {
            config.dict_name_visible = self.dict_name_visible;
        }
        if self.read_only_interval != baseline.read_only_interval {
            config.read_only_interval_ms = self.read_only_interval.as_millis() as u64;
        }
        if self.highlight_wrong_delay != baseline.highlight_wrong_delay {
            config.highlight_wrong_delay_ms = self.highlight_wrong_delay.as_millis() as u64;
        }
    }
}

/// A repeating deadline polled from the event loop.
///
/// There is at most one pending deadline, so starting an already running
/// timer does nothing, and once stopped `poll` never fires again until the
/// next `start`.
#[derive(Debug)]
pub struct PeriodicTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(now + self.interval);
        true
    }

    pub fn stop(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Fire at most once per call. A late poll does not replay missed ticks.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.next_due.is_some() {
            self.next_due = Some(now + interval);
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Owns the settings and the read-only auto-advance timer.
///
/// The timer runs exactly when the session is active and read-only mode is
/// on; every toggle re-derives that.
pub struct ModeController {
    settings: Settings,
    active: bool,
    read_only_timer: PeriodicTimer,
}

impl ModeController {
    pub fn new(settings: Settings) -> Self {
        let read_only_timer = PeriodicTimer::new(settings.read_only_interval);
        Self {
            settings,
            active: false,
            read_only_timer,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool, now: Instant) {
        self.active = active;
        self.sync_timer(now);
    }

    pub fn toggle_read_only(&mut self, now: Instant) -> bool {
        self.settings.read_only_mode = !self.settings.read_only_mode;
        self.sync_timer(now);
        self.settings.read_only_mode
    }

    pub fn toggle_chapter_cycle(&mut self) -> bool {
        self.settings.chapter_cycle_mode = !self.settings.chapter_cycle_mode;
        self.settings.chapter_cycle_mode
    }

    pub fn toggle_word_visibility(&mut self) -> bool {
        self.settings.word_visibility = !self.settings.word_visibility;
        self.settings.word_visibility
    }

    pub fn toggle_translation(&mut self) -> bool {
        self.settings.translation_visible = !self.settings.translation_visible;
        self.settings.translation_visible
    }

    pub fn toggle_dict_name(&mut self) -> bool {
        self.settings.dict_name_visible = !self.settings.dict_name_visible;
        self.settings.dict_name_visible
    }

    pub fn set_placeholder(&mut self, placeholder: char) {
        if !placeholder.is_control() {
            self.settings.placeholder = placeholder;
        }
    }

    /// Returns the clamped length actually stored.
    pub fn set_chapter_length(&mut self, chapter_length: usize) -> usize {
        self.settings.chapter_length = chapter_length.clamp(MIN_CHAPTER_LENGTH, MAX_CHAPTER_LENGTH);
        self.settings.chapter_length
    }

    pub fn set_read_only_interval(&mut self, interval: Duration, now: Instant) {
        let interval = interval.max(Duration::from_millis(MIN_READ_ONLY_INTERVAL_MS));
        self.settings.read_only_interval = interval;
        self.read_only_timer.set_interval(interval, now);
    }

    pub fn set_highlight_wrong_delay(&mut self, delay: Duration) {
        self.settings.highlight_wrong_delay = delay;
    }

    /// True when the auto-advance deadline has passed.
    pub fn poll_read_only(&mut self, now: Instant) -> bool {
        self.read_only_timer.poll(now)
    }

    pub fn read_only_timer_running(&self) -> bool {
        self.read_only_timer.is_running()
    }

    fn sync_timer(&mut self, now: Instant) {
        if self.active && self.settings.read_only_mode {
            if self.read_only_timer.start(now) {
                tracing::debug!(
                    interval_ms = self.settings.read_only_interval.as_millis() as u64,
                    "read-only timer started"
                );
            }
        } else if self.read_only_timer.stop() {
            tracing::debug!("read-only timer stopped");
        }
    }
}
