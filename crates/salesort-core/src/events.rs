//! Run event log: a durable tab-separated file per run, mirrored to the
//! console through `tracing`.
//!
//! [`EventLog`] is handed to every stage by reference. Writes are buffered and
//! flushed on [`EventLog::flush`] and on drop, so an early return from `main`
//! still persists everything recorded so far. Logging never fails the caller:
//! I/O errors are reported once on the console and then ignored.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};

const HEADER: &str = "timestamp\tseverity\taction\tproduct_title\tproduct_id\tdetail";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => f.write_str("debug"),
            Severity::Info => f.write_str("info"),
            Severity::Warn => f.write_str("warn"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub action: String,
    pub product_title: Option<String>,
    pub product_id: Option<String>,
    pub detail: Option<String>,
}

impl Event {
    #[must_use]
    pub fn new(severity: Severity, action: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            action: action.into(),
            product_title: None,
            product_id: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn debug(action: impl Into<String>) -> Self {
        Self::new(Severity::Debug, action)
    }

    #[must_use]
    pub fn info(action: impl Into<String>) -> Self {
        Self::new(Severity::Info, action)
    }

    #[must_use]
    pub fn warn(action: impl Into<String>) -> Self {
        Self::new(Severity::Warn, action)
    }

    #[must_use]
    pub fn error(action: impl Into<String>) -> Self {
        Self::new(Severity::Error, action)
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.product_title = Some(title.into());
        self
    }

    #[must_use]
    pub fn product_id(mut self, id: impl fmt::Display) -> Self {
        self.product_id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Renders the event as one tab-separated row (no trailing newline).
    fn to_row(&self) -> String {
        let ts = self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        [
            ts,
            self.severity.to_string(),
            escape_field(&self.action),
            escape_field(self.product_title.as_deref().unwrap_or("")),
            escape_field(self.product_id.as_deref().unwrap_or("")),
            escape_field(self.detail.as_deref().unwrap_or("")),
        ]
        .join("\t")
    }
}

/// Keeps one event on one row: tabs and line breaks inside a field are
/// written as `\t`, `\n` and `\r` escapes.
fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

struct FileSink {
    writer: BufWriter<File>,
    /// Set after the first I/O failure; later writes are dropped silently.
    broken: bool,
}

impl FileSink {
    fn write_line(&mut self, line: &str) {
        if self.broken {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{line}") {
            self.mark_broken(&err);
        }
    }

    fn flush(&mut self) {
        if self.broken {
            return;
        }
        if let Err(err) = self.writer.flush() {
            self.mark_broken(&err);
        }
    }

    fn mark_broken(&mut self, err: &io::Error) {
        self.broken = true;
        tracing::warn!(error = %err, "event log file write failed; continuing with console only");
    }
}

/// Append-only run log. See the module docs.
pub struct EventLog {
    sink: Option<Mutex<FileSink>>,
    path: Option<PathBuf>,
}

impl EventLog {
    /// Creates a new log file named `salesort-<YYYYMMDD-HHMMSS>.tsv` inside
    /// `dir` (created if missing) and writes the header row.
    ///
    /// An existing file is never reused: if the name is taken a numeric
    /// suffix is added.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory or file cannot be created.
    pub fn open(dir: &Path, started_at: DateTime<Utc>) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let stamp = started_at.format("%Y%m%d-%H%M%S").to_string();

        let mut attempt = 0u32;
        let (file, path) = loop {
            let name = if attempt == 0 {
                format!("salesort-{stamp}.tsv")
            } else {
                format!("salesort-{stamp}-{attempt}.tsv")
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (file, path),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists && attempt < 100 => {
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };

        let mut sink = FileSink {
            writer: BufWriter::new(file),
            broken: false,
        };
        sink.write_line(HEADER);

        Ok(Self {
            sink: Some(Mutex::new(sink)),
            path: Some(path),
        })
    }

    /// A log that only mirrors to the console.
    #[must_use]
    pub fn console_only() -> Self {
        Self {
            sink: None,
            path: None,
        }
    }

    /// Path of the durable log file, if one is open.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, event: &Event) {
        emit_console(event);
        if let Some(mut sink) = self.lock_sink() {
            sink.write_line(&event.to_row());
        }
    }

    pub fn flush(&self) {
        if let Some(mut sink) = self.lock_sink() {
            sink.flush();
        }
    }

    fn lock_sink(&self) -> Option<MutexGuard<'_, FileSink>> {
        let sink = self.sink.as_ref()?;
        // A poisoned lock only means another writer panicked mid-line; the
        // buffer is still usable.
        Some(sink.lock().unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        self.flush();
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog").field("path", &self.path).finish()
    }
}

fn emit_console(event: &Event) {
    let action = event.action.as_str();
    let title = event.product_title.as_deref().unwrap_or_default();
    let id = event.product_id.as_deref().unwrap_or_default();
    let detail = event.detail.as_deref().unwrap_or_default();
    match event.severity {
        Severity::Debug => {
            tracing::debug!(action, product_title = title, product_id = id, "{detail}");
        }
        Severity::Info => {
            tracing::info!(action, product_title = title, product_id = id, "{detail}");
        }
        Severity::Warn => {
            tracing::warn!(action, product_title = title, product_id = id, "{detail}");
        }
        Severity::Error => {
            tracing::error!(action, product_title = title, product_id = id, "{detail}");
        }
    }
}
