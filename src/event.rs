use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

/// Key presses from a reader thread, interleaved with a `Tick` every
/// `tick_rate`. Ticks keep their cadence while keys arrive, since the
/// trainer's cool-down and auto-advance deadlines are checked on them.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let mut next_tick = Instant::now() + tick_rate;
            loop {
                let timeout = next_tick.saturating_duration_since(Instant::now());
                if event::poll(timeout).unwrap_or(false) {
                    if let Ok(Event::Key(key)) = event::read()
                        && key.kind == KeyEventKind::Press
                        && tx.send(AppEvent::Key(key)).is_err()
                    {
                        return;
                    }
                }
                if Instant::now() >= next_tick {
                    if tx.send(AppEvent::Tick).is_err() {
                        return;
                    }
                    next_tick = Instant::now() + tick_rate;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
