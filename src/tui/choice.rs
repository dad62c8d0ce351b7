//! Choice list: pick one entry, used for the two-factor method.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::msgbox::centered_rect;
use super::view::{KeyOutcome, UiAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceList {
    pub title: String,
    pub entries: Vec<String>,
    pub selected: usize,
}

impl ChoiceList {
    pub fn new(title: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            title: title.into(),
            entries,
            selected: 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let last = self.entries.len().saturating_sub(1);
        match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                self.selected = self.selected.saturating_sub(1);
                KeyOutcome::Consumed
            }
            KeyCode::Down | KeyCode::Tab => {
                self.selected = (self.selected + 1).min(last);
                KeyOutcome::Consumed
            }
            KeyCode::Home => {
                self.selected = 0;
                KeyOutcome::Consumed
            }
            KeyCode::End => {
                self.selected = last;
                KeyOutcome::Consumed
            }
            KeyCode::Enter if !self.entries.is_empty() => {
                KeyOutcome::Action(UiAction::Choose(self.selected))
            }
            KeyCode::Esc => KeyOutcome::Action(UiAction::Cancel),
            _ => KeyOutcome::Unhandled,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let widest = self
            .entries
            .iter()
            .map(|e| unicode_width::UnicodeWidthStr::width(e.as_str()))
            .chain(std::iter::once(self.title.len()))
            .max()
            .unwrap_or(0);
        let popup = centered_rect(
            (widest + 8) as u16,
            self.entries.len() as u16 + 2,
            area,
        );
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));

        let lines: Vec<Line> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                if idx == self.selected {
                    Line::from(Span::styled(
                        format!(" > {}", entry),
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("   {}", entry),
                        Style::default().fg(Color::Gray),
                    ))
                }
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}
