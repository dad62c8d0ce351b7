//! UI rendering for the TUI

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
    Frame,
};

use super::log_view::LogPane;
use super::view::View;
use super::view_stack::ViewStack;

const HEADER_TEXT: &str = " Xbox WebAPI";
const FOOTER_MAIN_TEXT: &str = " L: view log  Q: quit";
const FOOTER_LOG_TEXT: &str = " Up/Down/PgUp/PgDn: scroll  Esc: back  Q: quit";

/// Main render function
pub fn render(frame: &mut Frame, views: &ViewStack, log: &LogPane) {
    let area = frame.area();

    // Layout: header (1 line) + body + footer (1 line)
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let current = views.current();
    render_bar(header_area, frame.buffer_mut(), HEADER_TEXT, true);

    Block::default()
        .style(Style::default().bg(Color::Black))
        .render(body_area, frame.buffer_mut());

    match current {
        View::Log => current.render(frame, body_area, log),
        _ => {
            // Dialogs use the middle 80% of the screen
            let [_, dialog_area, _] = Layout::horizontal([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .areas(body_area);
            current.render(frame, dialog_area, log);
        }
    }

    let footer = if matches!(current, View::Log) {
        FOOTER_LOG_TEXT
    } else {
        FOOTER_MAIN_TEXT
    };
    render_bar(footer_area, frame.buffer_mut(), footer, false);
}

fn render_bar(area: Rect, buf: &mut Buffer, text: &str, bold: bool) {
    let mut style = Style::default().fg(Color::White);
    if bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    let line = Line::from(Span::styled(text.to_string(), style));
    Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}
