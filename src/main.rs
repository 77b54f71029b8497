mod event;

use std::fs;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing_subscriber::EnvFilter;

use event::{AppEvent, EventHandler};
use qwerty_learner::TrainerError;
use qwerty_learner::config::Config;
use qwerty_learner::dict::Catalog;
use qwerty_learner::session::mode::Settings;
use qwerty_learner::session::trainer::{Cue, Trainer};
use qwerty_learner::store::json_store::JsonStore;
use qwerty_learner::store::wrong_words::WrongWordEntry;
use qwerty_learner::ui::word_bar::{WordBar, WordBarContent};
use qwerty_learner::ui::wrong_words::WrongWordsPanel;

const LOG_ENV: &str = "QWERTY_LEARNER_LOG";

#[derive(Parser)]
#[command(name = "qwerty-learner", version, about = "Word-typing trainer with a wrong-word book")]
struct Cli {
    #[arg(short, long, help = "Dictionary id to practise (see `dicts`)")]
    dict: Option<String>,

    #[arg(short, long, help = "Chapter to start at (1-based)")]
    chapter: Option<usize>,

    #[arg(long, help = "Words per chapter")]
    chapter_length: Option<usize>,

    #[arg(long, help = "Character shown in place of hidden letters")]
    placeholder: Option<char>,

    #[arg(long, help = "Start in read-only (auto-advance) mode")]
    read_only: bool,

    #[arg(long, help = "Wrap to chapter 1 after the last word")]
    cycle: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List available dictionaries
    Dicts,
    /// Print the wrong-word book, most missed first
    WrongWords,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A config that fails to parse is never written back, so the user's file
    // survives until they fix it.
    let (file_config, config_error) = match Config::load() {
        Ok(config) => (Some(config), None),
        Err(e) => (None, Some(e)),
    };
    let mut config = file_config.clone().unwrap_or_default();
    apply_cli(&mut config, &cli);

    let store = JsonStore::new().context("failed to open data directory")?;
    init_logging(&store);
    if let Some(e) = &config_error {
        tracing::warn!(error = %e, "ignoring unreadable config, using defaults");
    }

    let catalog = Catalog::from_config(&config);

    match cli.command {
        Some(Command::Dicts) => return print_dicts(&catalog),
        Some(Command::WrongWords) => return print_wrong_words(&store),
        None => {}
    }

    let saved_dict = store.load_progress().and_then(|p| p.dict_id);
    let dict_id = cli.dict.as_deref().or(saved_dict.as_deref());
    let book = store.wrong_word_book();
    let mut trainer = Trainer::new(catalog, Settings::from(&config), dict_id)?
        .with_wrong_word_book(book)
        .with_store(store);

    if let Some(chapter) = cli.chapter {
        let index = chapter_index(chapter, trainer.cursor().total_chapters())?;
        trainer.select_chapter(index)?;
    }
    trainer.set_active(true, Instant::now());
    let baseline = trainer.settings().clone();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));
    let mut app = App::new(trainer);
    if let Some(e) = &config_error {
        app.message = Some(format!("config not loaded, changes won't be saved: {e}"));
    }
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(updated) = config_to_save(file_config, &baseline, app.trainer.settings())
        && let Err(e) = updated.save()
    {
        tracing::warn!(error = %e, "failed to save config");
    }

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    Ok(())
}

fn apply_cli(config: &mut Config, cli: &Cli) {
    if let Some(len) = cli.chapter_length {
        config.chapter_length = len;
    }
    if let Some(placeholder) = cli.placeholder {
        config.placeholder = placeholder;
    }
    if cli.read_only {
        config.read_only_mode = true;
    }
    if cli.cycle {
        config.chapter_cycle_mode = true;
    }
    config.validate();
}

/// The on-disk config plus in-app changes, or `None` when the file could not
/// be read and must be left alone.
fn config_to_save(file_config: Option<Config>, baseline: &Settings, current: &Settings) -> Option<Config> {
    let mut config = file_config?;
    current.apply_changes(baseline, &mut config);
    Some(config)
}

/// Map the 1-based `--chapter` flag onto a chapter index.
fn chapter_index(chapter: usize, total: usize) -> qwerty_learner::Result<usize> {
    chapter.checked_sub(1).ok_or(TrainerError::Range {
        what: "chapter",
        index: chapter,
        len: total,
    })
}

/// Log to a file: the terminal belongs to the UI.
fn init_logging(store: &JsonStore) {
    let path = store.base_dir().join("qwerty-learner.log");
    let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn print_dicts(catalog: &Catalog) -> Result<()> {
    for d in catalog.list() {
        println!("{:<12} {:<16} {}", d.id, d.name, d.description);
    }
    Ok(())
}

fn print_wrong_words(store: &JsonStore) -> Result<()> {
    let book = store.wrong_word_book();
    let (ledger, errors) = book.load()?;
    for entry in ledger.entries() {
        println!("{:>4}  {}  {}", entry.count, entry.word, entry.translation);
    }
    for err in errors {
        eprintln!("{}: {err}", book.path().display());
    }
    Ok(())
}

struct App {
    trainer: Trainer,
    message: Option<String>,
    wrong_words: Option<Vec<WrongWordEntry>>,
    should_quit: bool,
}

impl App {
    fn new(trainer: Trainer) -> Self {
        Self {
            trainer,
            message: None,
            wrong_words: None,
            should_quit: false,
        }
    }

    fn toggle_wrong_words(&mut self) {
        if self.wrong_words.take().is_some() {
            return;
        }
        let Some(book) = self.trainer.wrong_word_book() else {
            return;
        };
        match book.load() {
            Ok((ledger, _)) => self.wrong_words = Some(ledger.entries().to_vec()),
            Err(e) => self.message = Some(format!("could not read wrong words: {e}")),
        }
    }

    /// Drain audio cues. There is no sound backend; a mistake rings the
    /// terminal bell and pronunciation requests complete immediately.
    fn flush_cues(&mut self) {
        for cue in self.trainer.take_cues() {
            match cue {
                Cue::Wrong => print!("\x07"),
                Cue::Pronounce(word) => {
                    tracing::debug!(%word, "pronounce");
                    self.trainer.voice_finished();
                }
                Cue::Click | Cue::Success => {}
            }
        }
        if let Some(message) = self.trainer.take_message() {
            self.message = Some(message);
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => {
                app.trainer.tick(Instant::now());
            }
        }
        app.flush_cues();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    let trainer = &mut app.trainer;

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('n') => {
                trainer.next_word();
            }
            KeyCode::Char('p') => {
                trainer.prev_word();
            }
            KeyCode::Char('t') => {
                trainer.toggle_translation();
            }
            KeyCode::Char('d') => {
                trainer.toggle_dict_name();
            }
            KeyCode::Char('v') => {
                trainer.toggle_word_visibility();
            }
            KeyCode::Char('r') => {
                let on = trainer.toggle_read_only(now);
                app.message = Some(format!("read-only mode {}", if on { "on" } else { "off" }));
            }
            KeyCode::Char('l') => {
                trainer.toggle_chapter_cycle();
            }
            KeyCode::Char('o') => {
                trainer.play_voice();
            }
            KeyCode::Char('s') => {
                trainer.toggle_active(now);
            }
            KeyCode::Char('w') => app.toggle_wrong_words(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => {
            if let Err(e) = trainer.next_dictionary() {
                app.message = Some(e.to_string());
            }
        }
        KeyCode::PageDown => {
            if let Err(e) = trainer.next_chapter() {
                app.message = Some(e.to_string());
            }
        }
        KeyCode::PageUp => {
            if let Err(e) = trainer.prev_chapter() {
                app.message = Some(e.to_string());
            }
        }
        KeyCode::Char(ch) => {
            app.message = None;
            trainer.type_char_at(ch, now);
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let content = WordBarContent::build(&app.trainer);
    frame.render_widget(WordBar::new(&content, app.message.as_deref()), layout[0]);

    if let Some(entries) = &app.wrong_words {
        frame.render_widget(WrongWordsPanel::new(entries), layout[1]);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        " [^N/^P] word  [PgUp/PgDn] chapter  [Tab] dict  [^T] trans  [^V] hide  [^R] read-only  [^L] cycle  [^W] wrong words  [Esc] quit ",
        Style::default().fg(Color::Rgb(0x58, 0x5b, 0x70)),
    )));
    frame.render_widget(footer, layout[2]);
}
