//! Views that can sit on the view stack and the actions they emit.

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use super::choice::ChoiceList;
use super::form::AuthForm;
use super::input::Prompt;
use super::log_view::{self, LogPane};
use super::msgbox::MessageBox;
use crate::auth::Credentials;

/// User intent produced by a view, interpreted by the auth flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// OK pressed on a message box.
    Acknowledge,
    SubmitCredentials(Credentials),
    /// Cancel pressed on the login form.
    CancelLogin,
    /// Entry picked from a choice list.
    Choose(usize),
    SubmitInput(String),
    /// Esc in a choice list or prompt.
    Cancel,
    CloseLog,
}

/// What a view did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    /// Falls through to the global bindings.
    Unhandled,
    Action(UiAction),
}

#[derive(Debug, Clone)]
pub enum View {
    /// Background under every other view.
    Root,
    MessageBox(MessageBox),
    AuthForm(AuthForm),
    Choice(ChoiceList),
    Prompt(Prompt),
    Log,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Root => "root",
            View::MessageBox(_) => "message",
            View::AuthForm(_) => "auth-form",
            View::Choice(_) => "choice",
            View::Prompt(_) => "prompt",
            View::Log => "log",
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, log: &mut LogPane) -> KeyOutcome {
        match self {
            View::Root => KeyOutcome::Unhandled,
            View::MessageBox(msg) => msg.handle_key(key),
            View::AuthForm(form) => form.handle_key(key),
            View::Choice(list) => list.handle_key(key),
            View::Prompt(prompt) => prompt.handle_key(key),
            View::Log => log_view::handle_key(log, key),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, log: &LogPane) {
        match self {
            View::Root => {}
            View::MessageBox(msg) => msg.render(frame, area),
            View::AuthForm(form) => form.render(frame, area),
            View::Choice(list) => list.render(frame, area),
            View::Prompt(prompt) => prompt.render(frame, area),
            View::Log => log_view::render(area, frame.buffer_mut(), log),
        }
    }
}
