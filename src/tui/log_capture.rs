//! Log capture for TUI mode
//!
//! Provides a ring buffer that implements `MakeWriter` so tracing-subscriber
//! can write formatted log lines here instead of stderr. This prevents tracing
//! output from corrupting the ratatui alternate screen. Each line keeps the
//! level and target of the event that produced it.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// One formatted line plus the metadata of its originating event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub level: Level,
    pub target: String,
}

impl LogLine {
    pub fn new(text: impl Into<String>, level: Level, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
            target: target.into(),
        }
    }
}

/// A thread-safe ring buffer for log lines.
///
/// This is the backpressure limit on the write path; the UI drains it into
/// the log pane on every loop iteration.
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<LogLine>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity,
        }
    }

    /// Push a log line into the buffer.
    ///
    /// If the buffer is at capacity, the oldest line is removed.
    /// If the mutex is poisoned (another thread panicked), we recover the
    /// inner data and continue - logging should not cascade failures.
    pub fn push(&self, line: LogLine) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if guard.len() >= self.capacity {
            guard.pop_front();
        }
        guard.push_back(line);
    }

    /// Drain all accumulated lines from the buffer, oldest first.
    pub fn drain(&self) -> Vec<LogLine> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.drain(..).collect()
    }
}

/// A writer that buffers bytes and flushes complete lines to a LogBuffer.
pub struct BufferWriter {
    buffer: LogBuffer,
    pending: Vec<u8>,
    level: Level,
    target: String,
}

impl BufferWriter {
    fn new(buffer: LogBuffer, level: Level, target: String) -> Self {
        Self {
            buffer,
            pending: Vec::new(),
            level,
            target,
        }
    }

    fn emit(&self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes).into_owned();
        self.buffer
            .push(LogLine::new(text, self.level, self.target.clone()));
    }

    fn flush_lines(&mut self) {
        // Flush all complete lines (ending in \n) from pending.
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line[..line.len() - 1]);
        }
    }
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        // Flush any remaining partial line on explicit flush.
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.emit(&pending);
        }
        Ok(())
    }
}

impl Drop for BufferWriter {
    fn drop(&mut self) {
        let _ = Write::flush(self);
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter::new(self.clone(), Level::INFO, String::new())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        BufferWriter::new(self.clone(), *meta.level(), meta.target().to_string())
    }
}
