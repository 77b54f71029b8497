use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::trainer::Trainer;

const ACCENT: Color = Color::Rgb(0x89, 0xb4, 0xfa);
const TEXT: Color = Color::Rgb(0xcd, 0xd6, 0xf4);
const PENDING: Color = Color::Rgb(0x58, 0x5b, 0x70);
const CORRECT: Color = Color::Rgb(0xa6, 0xe3, 0xa1);
const WRONG: Color = Color::Rgb(0xf3, 0x8b, 0xa8);
const BORDER: Color = Color::Rgb(0x45, 0x47, 0x5a);

/// Everything the status line shows, computed from the trainer.
///
/// Hiding the word only changes these strings; the trainer keeps comparing
/// against the real spelling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordBarContent {
    pub position: String,
    pub dict_name: Option<String>,
    pub word: String,
    pub typed: String,
    pub remaining: String,
    pub phonetic: Option<String>,
    pub translation: Option<String>,
    pub wrong: bool,
    pub flags: Vec<&'static str>,
}

impl WordBarContent {
    pub fn build(trainer: &Trainer) -> Self {
        let settings = trainer.settings();
        let cursor = trainer.cursor();
        let word = trainer.current_word();
        let placeholder = settings.placeholder;

        let position = format!(
            "ch.{}/{} {}/{}",
            cursor.chapter() + 1,
            cursor.total_chapters(),
            cursor.word_index() + 1,
            cursor.chapter_len(),
        );

        let display_word = if settings.word_visibility {
            word.name.clone()
        } else {
            std::iter::repeat_n(placeholder, word.len()).collect()
        };

        let typed_len = trainer.input().typed().len();
        let typed: String = trainer.input().typed().iter().collect();
        let remaining: String =
            std::iter::repeat_n(placeholder, word.len().saturating_sub(typed_len)).collect();

        let mut flags = Vec::new();
        if !trainer.is_active() {
            flags.push("paused");
        }
        if settings.read_only_mode {
            flags.push("read-only");
        }
        if settings.chapter_cycle_mode {
            flags.push("cycle");
        }

        Self {
            position,
            dict_name: settings
                .dict_name_visible
                .then(|| cursor.dictionary().name().to_string()),
            word: display_word,
            typed,
            remaining,
            phonetic: word.phonetic().map(|p| format!("/{p}/")),
            translation: settings
                .translation_visible
                .then(|| word.translation())
                .filter(|t| !t.is_empty()),
            wrong: trainer.input().has_wrong(),
            flags,
        }
    }
}

pub struct WordBar<'a> {
    content: &'a WordBarContent,
    message: Option<&'a str>,
}

impl<'a> WordBar<'a> {
    pub fn new(content: &'a WordBarContent, message: Option<&'a str>) -> Self {
        Self { content, message }
    }
}

impl Widget for WordBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let c = self.content;

        let mut header = Vec::new();
        if let Some(name) = &c.dict_name {
            header.push(Span::styled(
                format!("{name} "),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ));
        }
        header.push(Span::styled(c.position.clone(), Style::default().fg(PENDING)));
        for flag in &c.flags {
            header.push(Span::styled(format!(" [{flag}]"), Style::default().fg(PENDING)));
        }

        let mut word_line = vec![Span::styled(
            c.word.clone(),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )];
        if let Some(phonetic) = &c.phonetic {
            word_line.push(Span::styled(format!("  {phonetic}"), Style::default().fg(PENDING)));
        }

        let typed_style = if c.wrong {
            Style::default().fg(WRONG).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(CORRECT)
        };
        let input_line = Line::from(vec![
            Span::styled(c.typed.clone(), typed_style),
            Span::styled(c.remaining.clone(), Style::default().fg(PENDING)),
        ]);

        let mut lines = vec![Line::from(header), Line::from(word_line), input_line];
        if let Some(translation) = &c.translation {
            lines.push(Line::from(Span::styled(
                translation.clone(),
                Style::default().fg(TEXT),
            )));
        }
        if let Some(message) = self.message {
            lines.push(Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(ACCENT),
            )));
        }

        let block = Block::bordered().border_style(Style::default().fg(BORDER));
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{Catalog, DictionaryDescriptor, Word};
    use crate::session::mode::Settings;
    use std::time::Instant;

    fn trainer() -> Trainer {
        let mut catalog = Catalog::empty();
        let mut apple = Word::new("apple", "苹果");
        apple.usphone = Some("ˈæpəl".to_string());
        catalog.push(DictionaryDescriptor::memory(
            "fruit",
            "Fruit",
            vec![apple, Word::new("pear", "梨")],
        ));
        let mut trainer = Trainer::new(catalog, Settings::default(), None).unwrap();
        trainer.toggle_active(Instant::now());
        trainer
    }

    #[test]
    fn visible_word_shows_spelling_and_progress() {
        let mut trainer = trainer();
        trainer.type_char('a');
        trainer.type_char('p');
        let content = WordBarContent::build(&trainer);
        assert_eq!(content.word, "apple");
        assert_eq!(content.typed, "ap");
        assert_eq!(content.remaining, "___");
        assert_eq!(content.position, "ch.1/1 1/2");
        assert_eq!(content.dict_name.as_deref(), Some("Fruit"));
        assert_eq!(content.phonetic.as_deref(), Some("/ˈæpəl/"));
        assert_eq!(content.translation.as_deref(), Some("苹果"));
        assert!(!content.wrong);
    }

    #[test]
    fn hidden_word_uses_placeholder() {
        let mut trainer = trainer();
        trainer.toggle_word_visibility();
        trainer.set_placeholder('*');
        trainer.type_char('a');
        let content = WordBarContent::build(&trainer);
        assert_eq!(content.word, "*****");
        assert_eq!(content.typed, "a");
        assert_eq!(content.remaining, "****");
    }

    #[test]
    fn hidden_translation_and_name() {
        let mut trainer = trainer();
        trainer.toggle_translation();
        trainer.toggle_dict_name();
        trainer.toggle_chapter_cycle();
        let content = WordBarContent::build(&trainer);
        assert_eq!(content.translation, None);
        assert_eq!(content.dict_name, None);
        assert_eq!(content.flags, vec!["cycle"]);
    }

    #[test]
    fn wrong_flag_follows_engine() {
        let mut trainer = trainer();
        trainer.type_char('z');
        assert!(WordBarContent::build(&trainer).wrong);
    }

    #[test]
    fn renders_into_buffer() {
        let trainer = trainer();
        let content = WordBarContent::build(&trainer);
        let area = Rect::new(0, 0, 40, 7);
        let mut buf = Buffer::empty(area);
        WordBar::new(&content, Some("hi")).render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(text.contains("apple"));
        assert!(text.contains("hi"));
    }
}
