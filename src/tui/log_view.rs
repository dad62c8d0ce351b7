//! Log pane: bounded, scrollable list of captured log lines.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tracing::Level;

use super::log_capture::LogLine;
use super::view::{KeyOutcome, UiAction};

/// Rows moved by PageUp/PageDown.
const PAGE: usize = 10;

/// Bounded FIFO of log entries with a focused (selected) entry.
pub struct LogPane {
    entries: VecDeque<LogLine>,
    capacity: usize,
    /// Index of the focused entry; `None` only while empty.
    focus: Option<usize>,
}

impl LogPane {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            focus: None,
        }
    }

    /// Append an entry.
    ///
    /// Focus follows the new entry only if it was on the previous last one.
    /// Past capacity the oldest entries are dropped and focus keeps pointing
    /// at the same entry.
    pub fn push(&mut self, entry: LogLine) {
        let follow = self.focus.map_or(true, |f| f + 1 == self.entries.len());
        self.entries.push_back(entry);
        if follow {
            self.focus = Some(self.entries.len() - 1);
        }

        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
            self.focus = self.focus.map(|f| f.saturating_sub(excess));
        }
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = LogLine>) {
        for entry in entries {
            self.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogLine> {
        self.entries.iter()
    }

    /// Move focus toward older entries.
    pub fn scroll_up(&mut self, n: usize) {
        if let Some(f) = self.focus {
            self.focus = Some(f.saturating_sub(n));
        }
    }

    /// Move focus toward newer entries.
    pub fn scroll_down(&mut self, n: usize) {
        if let Some(f) = self.focus {
            let last = self.entries.len().saturating_sub(1);
            self.focus = Some(f.saturating_add(n).min(last));
        }
    }

    pub fn scroll_to_top(&mut self) {
        if !self.entries.is_empty() {
            self.focus = Some(0);
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.focus = self.entries.len().checked_sub(1);
    }
}

/// Keys while the log view is current.
///
/// The log key itself is swallowed so the view is never opened twice.
pub fn handle_key(pane: &mut LogPane, key: KeyEvent) -> KeyOutcome {
    match key.code {
        KeyCode::Char('l') | KeyCode::Char('L') => KeyOutcome::Consumed,
        KeyCode::Esc => KeyOutcome::Action(UiAction::CloseLog),
        KeyCode::Up => {
            pane.scroll_up(1);
            KeyOutcome::Consumed
        }
        KeyCode::Down => {
            pane.scroll_down(1);
            KeyOutcome::Consumed
        }
        KeyCode::PageUp => {
            pane.scroll_up(PAGE);
            KeyOutcome::Consumed
        }
        KeyCode::PageDown => {
            pane.scroll_down(PAGE);
            KeyOutcome::Consumed
        }
        KeyCode::Home => {
            pane.scroll_to_top();
            KeyOutcome::Consumed
        }
        KeyCode::End => {
            pane.scroll_to_bottom();
            KeyOutcome::Consumed
        }
        _ => KeyOutcome::Unhandled,
    }
}

/// Render the log pane.
pub fn render(area: Rect, buf: &mut Buffer, pane: &LogPane) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Log ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 || pane.is_empty() {
        return;
    }

    let height = inner.height as usize;
    let focus = pane.focus.unwrap_or(0);
    let offset = compute_scroll_offset(focus, height, pane.len());

    let lines: Vec<Line> = pane
        .entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(idx, entry)| entry_line(entry, idx == focus))
        .collect();

    Paragraph::new(lines).render(inner, buf);
}

/// Keep the focused entry visible.
fn compute_scroll_offset(focus: usize, height: usize, total: usize) -> usize {
    if total <= height || focus < height {
        return 0;
    }
    let max_offset = total.saturating_sub(height);
    focus.saturating_sub(height - 1).min(max_offset)
}

fn level_color(level: Level) -> Color {
    match level {
        Level::ERROR => Color::Red,
        Level::WARN => Color::Yellow,
        Level::INFO => Color::Green,
        Level::DEBUG | Level::TRACE => Color::DarkGray,
    }
}

fn entry_line(entry: &LogLine, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(level_color(entry.level))
    };

    Line::from(Span::styled(format!(" {}", entry.text), style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use proptest::prelude::*;

    fn line(i: usize) -> LogLine {
        LogLine::new(format!("line {}", i), Level::INFO, "test")
    }

    fn texts(pane: &LogPane) -> Vec<String> {
        pane.entries().map(|e| e.text.clone()).collect()
    }

    #[test]
    fn test_first_entry_takes_focus() {
        let mut pane = LogPane::new(10);
        assert_eq!(pane.focus(), None);
        pane.push(line(0));
        assert_eq!(pane.focus(), Some(0));
    }

    #[test]
    fn test_focus_sticks_to_bottom() {
        let mut pane = LogPane::new(100);
        pane.extend((0..5).map(line));
        assert_eq!(pane.focus(), Some(4));

        pane.push(line(5));
        assert_eq!(pane.focus(), Some(5));
    }

    #[test]
    fn test_focus_stays_when_scrolled_away() {
        let mut pane = LogPane::new(100);
        pane.extend((0..5).map(line));
        pane.scroll_up(2);
        assert_eq!(pane.focus(), Some(2));

        pane.push(line(5));
        assert_eq!(pane.focus(), Some(2));
    }

    #[test]
    fn test_eviction_keeps_focus_on_same_entry() {
        let mut pane = LogPane::new(5);
        pane.extend((0..5).map(line));
        pane.scroll_up(1);
        assert_eq!(pane.focus(), Some(3));

        pane.push(line(5));
        assert_eq!(texts(&pane), vec!["line 1", "line 2", "line 3", "line 4", "line 5"]);
        assert_eq!(pane.focus(), Some(2));
        assert_eq!(texts(&pane)[2], "line 3");
    }

    #[test]
    fn test_scroll_clamps() {
        let mut pane = LogPane::new(10);
        pane.extend((0..5).map(line));
        pane.scroll_up(100);
        assert_eq!(pane.focus(), Some(0));
        pane.scroll_down(100);
        assert_eq!(pane.focus(), Some(4));
    }

    #[test]
    fn test_log_key_is_swallowed() {
        let mut pane = LogPane::new(10);
        let key = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE);
        assert!(matches!(handle_key(&mut pane, key), KeyOutcome::Consumed));
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(matches!(handle_key(&mut pane, key), KeyOutcome::Unhandled));
    }

    #[test]
    fn test_scroll_offset_keeps_focus_visible() {
        assert_eq!(compute_scroll_offset(0, 10, 5), 0);
        assert_eq!(compute_scroll_offset(25, 10, 30), 16);
        assert_eq!(compute_scroll_offset(29, 10, 30), 20);
    }

    proptest! {
        #[test]
        fn prop_retains_most_recent_entries(capacity in 1usize..50, inserted in 0usize..200) {
            let mut pane = LogPane::new(capacity);
            pane.extend((0..inserted).map(line));

            let kept = inserted.min(capacity);
            prop_assert_eq!(pane.len(), kept);
            let expected: Vec<String> =
                (inserted - kept..inserted).map(|i| format!("line {}", i)).collect();
            prop_assert_eq!(texts(&pane), expected);
        }

        #[test]
        fn prop_never_exceeds_capacity(capacity in 1usize..20, ops in prop::collection::vec(0u8..3, 0..100)) {
            let mut pane = LogPane::new(capacity);
            for (i, op) in ops.into_iter().enumerate() {
                match op {
                    0 => pane.push(line(i)),
                    1 => pane.scroll_up(1),
                    _ => pane.scroll_down(1),
                }
                prop_assert!(pane.len() <= capacity);
                if let Some(f) = pane.focus() {
                    prop_assert!(f < pane.len());
                }
            }
        }
    }
}
