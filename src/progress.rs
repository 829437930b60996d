//! Human-readable progress log.
//!
//! The pipeline never prints directly; it writes lines to an injected
//! [`ProgressSink`]. The CLI renders them above a progress bar and tests collect
//! them in memory.
//!
//! Line markers: `[i]` information, `[!]` warning, `[X]` failure,
//! `->` filing result.

use std::sync::{Arc, Mutex};

use console::style;
use indicatif::ProgressBar;

/// Receiver for progress lines.
pub trait ProgressSink: Send + Sync {
    /// Emit one line.
    fn line(&self, message: &str);

    /// Emit several lines that must not be interleaved with other output.
    fn block(&self, lines: &[String]) {
        if !lines.is_empty() {
            self.line(&lines.join("\n"));
        }
    }
}

/// Collects progress lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line received so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl ProgressSink for MemorySink {
    fn line(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }

    fn block(&self, block: &[String]) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.extend(block.iter().cloned());
        }
    }
}

/// Prints lines to the terminal, colored by marker.
///
/// With a progress bar attached, lines are printed above it so the bar is
/// not torn.
pub struct ConsoleSink {
    bar: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar: Some(bar) }
    }

    /// Plain stdout output, no progress bar.
    pub fn stdout() -> Self {
        Self { bar: None }
    }

    fn styled(message: &str) -> String {
        let trimmed = message.trim_start();
        if trimmed.starts_with("[X]") {
            style(message).red().to_string()
        } else if trimmed.starts_with("[!]") {
            style(message).yellow().to_string()
        } else if trimmed.starts_with("->") {
            style(message).green().to_string()
        } else if trimmed.starts_with("[i]") {
            style(message).dim().to_string()
        } else {
            message.to_string()
        }
    }

    fn print(&self, text: String) {
        match &self.bar {
            Some(bar) => bar.println(text),
            None => println!("{}", text),
        }
    }
}

impl ProgressSink for ConsoleSink {
    fn line(&self, message: &str) {
        self.print(Self::styled(message));
    }

    fn block(&self, lines: &[String]) {
        let rendered: Vec<String> = lines.iter().map(|l| Self::styled(l)).collect();
        if !rendered.is_empty() {
            self.print(rendered.join("\n"));
        }
    }
}

/// Per-document view of a sink.
///
/// In immediate mode every line is forwarded as it is written. In buffered
/// mode lines are held until [`finish`](Self::finish) and emitted as one
/// block, so concurrent documents never interleave.
pub struct DocumentLog {
    sink: Arc<dyn ProgressSink>,
    buffer: Option<Mutex<Vec<String>>>,
}

impl DocumentLog {
    pub fn immediate(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink, buffer: None }
    }

    pub fn buffered(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            buffer: Some(Mutex::new(Vec::new())),
        }
    }

    /// Flush buffered lines, if any.
    pub fn finish(self) {
        if let Some(buffer) = self.buffer {
            let lines = buffer.into_inner().unwrap_or_default();
            self.sink.block(&lines);
        }
    }
}

impl ProgressSink for DocumentLog {
    fn line(&self, message: &str) {
        match &self.buffer {
            Some(buffer) => {
                if let Ok(mut lines) = buffer.lock() {
                    lines.push(message.to_string());
                }
            }
            None => self.sink.line(message),
        }
    }
}
