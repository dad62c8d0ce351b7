//! Login form: email and password fields plus Authenticate/Cancel buttons.
//!
//! Items are laid out top to bottom. Labels and dividers are never focused;
//! Tab and Shift+Tab wrap around the selectable items, Up/Down stop at the ends.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::input::{render_input, TextInput};
use super::msgbox::centered_rect;
use super::view::{KeyOutcome, UiAction};
use crate::auth::Credentials;

const FORM_WIDTH: u16 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Authenticate,
    Cancel,
}

#[derive(Debug, Clone)]
pub enum FormItem {
    Label(&'static str),
    Divider,
    Field {
        label: &'static str,
        input: TextInput,
    },
    Button {
        label: &'static str,
        kind: ButtonKind,
    },
}

impl FormItem {
    fn selectable(&self) -> bool {
        matches!(self, FormItem::Field { .. } | FormItem::Button { .. })
    }
}

#[derive(Debug, Clone)]
pub struct AuthForm {
    items: Vec<FormItem>,
    focus: usize,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthForm {
    pub fn new() -> Self {
        let items = vec![
            FormItem::Label("Please authenticate with your Microsoft Account"),
            FormItem::Divider,
            FormItem::Field {
                label: "Email Address",
                input: TextInput::default(),
            },
            FormItem::Divider,
            FormItem::Field {
                label: "Account Password",
                input: TextInput::masked(),
            },
            FormItem::Divider,
            FormItem::Button {
                label: "Authenticate",
                kind: ButtonKind::Authenticate,
            },
            FormItem::Button {
                label: "Cancel",
                kind: ButtonKind::Cancel,
            },
        ];
        let focus = items.iter().position(FormItem::selectable).unwrap_or(0);
        Self { items, focus }
    }

    fn selectable_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.selectable())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Move focus among selectable items, wrapping if `wrap` is set.
    fn step(&mut self, forward: bool, wrap: bool) {
        let selectable = self.selectable_indices();
        let Some(pos) = selectable.iter().position(|&i| i == self.focus) else {
            return;
        };
        let len = selectable.len();
        let next = match (forward, wrap) {
            (true, true) => (pos + 1) % len,
            (false, true) => (pos + len - 1) % len,
            (true, false) => (pos + 1).min(len - 1),
            (false, false) => pos.saturating_sub(1),
        };
        self.focus = selectable[next];
    }

    fn field_value(&self, label: &str) -> String {
        self.items
            .iter()
            .find_map(|item| match item {
                FormItem::Field { label: l, input } if *l == label => Some(input.value.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.field_value("Email Address").trim(),
            self.field_value("Account Password"),
        )
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Tab => {
                self.step(true, true);
                return KeyOutcome::Consumed;
            }
            KeyCode::BackTab => {
                self.step(false, true);
                return KeyOutcome::Consumed;
            }
            KeyCode::Down => {
                self.step(true, false);
                return KeyOutcome::Consumed;
            }
            KeyCode::Up => {
                self.step(false, false);
                return KeyOutcome::Consumed;
            }
            _ => {}
        }

        // None while a field has focus
        let button = match self.items.get(self.focus) {
            Some(FormItem::Field { .. }) => None,
            Some(FormItem::Button { kind, .. }) => Some(*kind),
            _ => return KeyOutcome::Unhandled,
        };

        match (button, key.code) {
            (None, KeyCode::Enter) => {
                self.step(true, false);
                KeyOutcome::Consumed
            }
            (None, _) => match self.items.get_mut(self.focus) {
                Some(FormItem::Field { input, .. }) => {
                    if input.handle_key(key) {
                        KeyOutcome::Consumed
                    } else {
                        KeyOutcome::Unhandled
                    }
                }
                _ => KeyOutcome::Unhandled,
            },
            (Some(ButtonKind::Authenticate), KeyCode::Enter | KeyCode::Char(' ')) => {
                KeyOutcome::Action(UiAction::SubmitCredentials(self.credentials()))
            }
            (Some(ButtonKind::Cancel), KeyCode::Enter | KeyCode::Char(' ')) => {
                KeyOutcome::Action(UiAction::CancelLogin)
            }
            (Some(_), KeyCode::Left) => {
                self.step(false, false);
                KeyOutcome::Consumed
            }
            (Some(_), KeyCode::Right) => {
                self.step(true, false);
                KeyOutcome::Consumed
            }
            _ => KeyOutcome::Unhandled,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = self.items.len() as u16 + 1;
        let popup = centered_rect(FORM_WIDTH, rows + 2, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " Authentication required ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let mut y = inner.y;
        let bottom = inner.y + inner.height;
        let mut buttons: Vec<Span> = Vec::new();

        for (idx, item) in self.items.iter().enumerate() {
            let focused = idx == self.focus;
            match item {
                FormItem::Button { label, .. } => {
                    let style = if focused {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Cyan)
                    };
                    buttons.push(Span::styled(format!("[ {} ]", label), style));
                    buttons.push(Span::raw("  "));
                    continue;
                }
                _ if y >= bottom => continue,
                FormItem::Label(text) => {
                    let line = Line::from(Span::styled(
                        format!(" {}", text),
                        Style::default().fg(Color::White),
                    ));
                    frame.render_widget(Paragraph::new(line), Rect::new(inner.x, y, inner.width, 1));
                }
                FormItem::Divider => {}
                FormItem::Field { label, input } => {
                    let label_style = if focused {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    let label_width = 19;
                    let label_line =
                        Line::from(Span::styled(format!(" {:<18}", label), label_style));
                    frame.render_widget(
                        Paragraph::new(label_line),
                        Rect::new(inner.x, y, label_width.min(inner.width), 1),
                    );
                    let field = Rect::new(
                        inner.x + label_width,
                        y,
                        inner.width.saturating_sub(label_width + 1),
                        1,
                    );
                    render_input(frame, field, input, focused);
                }
            }
            y += 1;
        }

        if y < bottom {
            frame.render_widget(
                Paragraph::new(Line::from(buttons)).centered(),
                Rect::new(inner.x, y, inner.width, 1),
            );
        }
    }
}
