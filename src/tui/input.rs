//! Single-line text input and the prompt view built on it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use super::msgbox::centered_rect;
use super::view::{KeyOutcome, UiAction};

/// Editable line of text with a character-based cursor.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    pub value: String,
    /// Cursor position (character offset into `value`).
    pub cursor_pos: usize,
    /// Render every character as `*`.
    pub masked: bool,
}

impl TextInput {
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = self.char_to_byte(self.cursor_pos);
        self.value.insert(byte_pos, c);
        self.cursor_pos += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            let byte_pos = self.char_to_byte(self.cursor_pos);
            let prev_byte_pos = self.char_to_byte(self.cursor_pos - 1);
            self.value.drain(prev_byte_pos..byte_pos);
            self.cursor_pos -= 1;
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor_pos < self.value.chars().count() {
            let byte_pos = self.char_to_byte(self.cursor_pos);
            let next_byte_pos = self.char_to_byte(self.cursor_pos + 1);
            self.value.drain(byte_pos..next_byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_pos < self.value.chars().count() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_pos = self.value.chars().count();
    }

    /// Apply an editing key. Returns false for keys that are not edits.
    ///
    /// Printable characters are always taken, including `q` and `l`.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c);
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }

    /// Text as shown on screen, masked if needed.
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Visible slice of the display text and cursor column within it.
    pub fn visible(&self, width: usize) -> (String, usize) {
        let chars: Vec<char> = self.display().chars().collect();
        if width == 0 {
            return (String::new(), 0);
        }
        let start = if self.cursor_pos < width {
            0
        } else {
            self.cursor_pos - width + 1
        };
        let end = (start + width).min(chars.len());
        let visible: String = chars[start.min(end)..end].iter().collect();
        (visible, self.cursor_pos - start)
    }

    fn char_to_byte(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

/// Render `input` on one row of `area`, setting the cursor when focused.
pub fn render_input(frame: &mut Frame, area: Rect, input: &TextInput, focused: bool) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let (visible, cursor) = input.visible(area.width as usize);
    let style = if focused {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Gray)
    };
    let row = Rect::new(area.x, area.y, area.width, 1);
    frame.render_widget(Paragraph::new(Line::from(visible)).style(style), row);

    if focused {
        frame.set_cursor_position((area.x + cursor as u16, area.y));
    }
}

/// Titled single-field prompt used for proof and one-time-code entry.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub title: String,
    pub input: TextInput,
}

impl Prompt {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            input: TextInput::default(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Esc => KeyOutcome::Action(UiAction::Cancel),
            KeyCode::Enter => {
                let text = self.input.value.trim();
                if text.is_empty() {
                    KeyOutcome::Consumed
                } else {
                    KeyOutcome::Action(UiAction::SubmitInput(text.to_string()))
                }
            }
            _ if self.input.handle_key(key) => KeyOutcome::Consumed,
            _ => KeyOutcome::Unhandled,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(70);
        let popup = centered_rect(width, 5, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        if inner.height < 3 {
            return;
        }
        let field = Rect::new(inner.x + 1, inner.y + 1, inner.width.saturating_sub(2), 1);
        render_input(frame, field, &self.input, true);
    }
}
