//! TUI Application state and main event loop

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;

use super::backend::{Backend, BackendCommand, BackendResponse};
use super::flow::{AuthFlow, Effect, FlowEvent};
use super::log_capture::{LogBuffer, LogLine};
use super::log_view::LogPane;
use super::ui;
use super::view::{KeyOutcome, UiAction, View};
use super::view_stack::ViewStack;
use crate::config::UiSettings;

/// Target frame rate for UI updates (~30 fps)
const FRAME_DURATION_MS: u64 = 33;

/// Everything the UI needs from startup.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub tokens_path: PathBuf,
    pub need_full_auth: bool,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// First event after the loop starts.
    Start,
    Key(KeyEvent),
    Backend(BackendResponse),
}

/// Application state
pub struct App {
    pub(crate) views: ViewStack,
    pub(crate) log: LogPane,
    flow: AuthFlow,
    need_full_auth: bool,
    /// Commands waiting to be sent to the backend.
    outbox: Vec<BackendCommand>,
    should_exit: bool,
}

impl App {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            views: ViewStack::new(View::Root, ctx.ui.max_view_depth),
            log: LogPane::new(ctx.ui.log_capacity),
            flow: AuthFlow::new(),
            need_full_auth: ctx.need_full_auth,
            outbox: Vec::new(),
            should_exit: false,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn is_authenticated(&self) -> bool {
        self.flow.is_authenticated()
    }

    pub fn dispatch(&mut self, event: AppEvent) {
        match event {
            AppEvent::Start => {
                let effects = self.flow.handle(FlowEvent::Start {
                    need_full_auth: self.need_full_auth,
                });
                self.apply(effects);
            }
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Backend(resp) => {
                let effects = self.flow.handle(FlowEvent::Backend(resp));
                self.apply(effects);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return;
        }

        match self.views.current_mut().handle_key(key, &mut self.log) {
            KeyOutcome::Consumed => {}
            KeyOutcome::Action(UiAction::CloseLog) => self.close_log(),
            KeyOutcome::Action(action) => {
                let effects = self.flow.handle(FlowEvent::Ui(action));
                self.apply(effects);
            }
            KeyOutcome::Unhandled => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_exit = true,
                KeyCode::Char('l') | KeyCode::Char('L') => self.push(View::Log),
                _ => {}
            },
        }
    }

    fn close_log(&mut self) {
        if matches!(self.views.current(), View::Log) && !self.views.pop() {
            self.should_exit = true;
        }
    }

    fn push(&mut self, view: View) {
        if let Err(e) = self.views.push(view) {
            tracing::warn!("{}", e);
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        // Flow views live below the log viewer, so bring them back first.
        let touches_views = effects
            .iter()
            .any(|e| matches!(e, Effect::Push(_) | Effect::Pop | Effect::ReturnToRoot));
        if touches_views {
            self.close_log();
        }

        for effect in effects {
            match effect {
                Effect::Push(view) => self.push(view),
                Effect::Pop => {
                    if !self.views.pop() {
                        self.should_exit = true;
                    }
                }
                Effect::ReturnToRoot => self.views.return_to_root(),
                Effect::Send(cmd) => self.outbox.push(cmd),
                Effect::Quit => self.should_exit = true,
            }
        }
    }

    /// Move captured log lines into the log pane.
    pub fn ingest_logs(&mut self, lines: Vec<LogLine>) {
        self.log.extend(lines);
    }

    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Render the UI
    pub fn render(&self, frame: &mut ratatui::Frame) {
        ui::render(frame, &self.views, &self.log);
    }
}

/// Run the TUI until the user quits.
///
/// Returns whether authentication succeeded.
pub async fn run(ctx: AppContext, mut backend: Backend, logs: LogBuffer) -> Result<bool> {
    // init() installs a panic hook that restores the terminal
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &ctx, &mut backend, &logs).await;
    ratatui::restore();
    result
}

async fn run_app(
    terminal: &mut DefaultTerminal,
    ctx: &AppContext,
    backend: &mut Backend,
    logs: &LogBuffer,
) -> Result<bool> {
    let mut app = App::new(ctx);
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(FRAME_DURATION_MS));

    app.dispatch(AppEvent::Start);

    loop {
        app.ingest_logs(logs.drain());
        for cmd in app.take_commands() {
            backend.send(cmd);
        }
        if app.should_exit() {
            break;
        }

        terminal
            .draw(|frame| app.render(frame))
            .context("Failed to draw terminal")?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => app.dispatch(AppEvent::Key(key)),
                // Resize and friends: redrawn on the next iteration
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => break,
            },
            resp = backend.recv() => match resp {
                Some(resp) => app.dispatch(AppEvent::Backend(resp)),
                None => {
                    tracing::error!("Backend stopped unexpectedly");
                    break;
                }
            },
            _ = tick.tick() => {}
        }
    }

    Ok(app.is_authenticated())
}
