//! Modal message box with an optional OK button.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::view::{KeyOutcome, UiAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBox {
    pub title: String,
    pub text: String,
    pub show_button: bool,
}

impl MessageBox {
    pub fn new(title: impl Into<String>, text: impl Into<String>, show_button: bool) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            show_button,
        }
    }

    pub fn handle_key(&self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') if self.show_button => {
                KeyOutcome::Action(UiAction::Acknowledge)
            }
            _ => KeyOutcome::Unhandled,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let text_lines: Vec<&str> = self.text.trim_end_matches('\n').lines().collect();
        let widest = text_lines
            .iter()
            .map(|l| unicode_width::UnicodeWidthStr::width(*l))
            .chain(std::iter::once(self.title.len() + 4))
            .max()
            .unwrap_or(0);

        let button_rows = if self.show_button { 2 } else { 0 };
        let width = ((widest + 6) as u16).max(24);
        let height = text_lines.len() as u16 + button_rows + 2;
        let popup = centered_rect(width, height, area);
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

        let mut lines: Vec<Line> = text_lines
            .iter()
            .map(|l| Line::from(l.to_string()))
            .collect();
        if self.show_button {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[ OK ]",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }
}

/// Return a centered sub-rect of the given size within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_ok_button_acknowledges() {
        let msg = MessageBox::new("Success", "Authentication was successful, tokens saved!\n", true);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(
            msg.handle_key(enter),
            KeyOutcome::Action(UiAction::Acknowledge)
        ));
    }

    #[test]
    fn test_wait_box_ignores_enter() {
        let msg = MessageBox::new("Please wait", "Authenticating...\n", false);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(msg.handle_key(enter), KeyOutcome::Unhandled));
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(40, 40, area), area);
    }
}
