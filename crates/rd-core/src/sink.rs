//! Log sinks for dump lines.
//!
//! The dumper hands every formatted line to a [`LogSink`] with one call per
//! line. Sinks write each line atomically, so dumps of concurrent
//! transactions may interleave but never tear a line.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Tracing target used by [`TracingSink`].
pub const DUMP_TARGET: &str = "reqdump::dump";

/// Destination for dump lines.
pub trait LogSink: Send + Sync {
    /// Write one complete line.
    fn write_line(&self, line: &str);
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn write_line(&self, line: &str) {
        (**self).write_line(line);
    }
}

impl<T: LogSink + ?Sized> LogSink for &T {
    fn write_line(&self, line: &str) {
        (**self).write_line(line);
    }
}

/// Routes lines through `tracing` at INFO under [`DUMP_TARGET`], leaving
/// transport and formatting to the installed subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, line: &str) {
        tracing::info!(target: DUMP_TARGET, "{}", line);
    }
}

/// Writes lines verbatim to any writer.
pub struct WriterSink<W = io::Stdout> {
    writer: Mutex<W>,
}

impl WriterSink<io::Stdout> {
    /// Create a sink writing to stdout.
    pub fn stdout() -> Self {
        WriterSink::new(io::stdout())
    }
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Remove and return every line written so far.
    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut l| std::mem::take(&mut *l))
            .unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_sink_one_line_per_call() {
        let sink = WriterSink::new(Vec::new());
        sink.write_line("a method=GET");
        sink.write_line("a status=200");
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "a method=GET\na status=200\n");
    }

    #[test]
    fn test_memory_sink_take() {
        let sink = MemorySink::new();
        sink.write_line("one");
        sink.write_line("two");
        assert_eq!(sink.take(), vec!["one", "two"]);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_arc_sink_forwards() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<MemorySink> = Arc::clone(&sink);
        shared.write_line("line");
        assert_eq!(sink.lines(), vec!["line"]);
    }
}
