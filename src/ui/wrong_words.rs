use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::store::wrong_words::WrongWordEntry;

/// The most-missed words, highest count first.
pub struct WrongWordsPanel<'a> {
    entries: &'a [WrongWordEntry],
}

impl<'a> WrongWordsPanel<'a> {
    pub fn new(entries: &'a [WrongWordEntry]) -> Self {
        Self { entries }
    }
}

impl Widget for WrongWordsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(" Wrong words ")
            .border_style(Style::default().fg(Color::Rgb(0x45, 0x47, 0x5a)));
        let inner_height = block.inner(area).height as usize;

        let lines: Vec<Line> = if self.entries.is_empty() {
            vec![Line::from(Span::styled(
                "no mistakes recorded yet",
                Style::default().fg(Color::Rgb(0x58, 0x5b, 0x70)),
            ))]
        } else {
            self.entries
                .iter()
                .take(inner_height)
                .map(|e| {
                    Line::from(vec![
                        Span::styled(
                            format!("{:>4}  ", e.count),
                            Style::default().fg(Color::Rgb(0xf3, 0x8b, 0xa8)),
                        ),
                        Span::raw(format!("{}  ", e.word)),
                        Span::styled(
                            e.translation.clone(),
                            Style::default().fg(Color::Rgb(0x58, 0x5b, 0x70)),
                        ),
                    ])
                })
                .collect()
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
