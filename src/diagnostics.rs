//! Severity-filtered diagnostic sink.
//!
//! Every component receives a `&mut Diagnostics` instead of reaching for a
//! global logger. Events below the configured threshold are dropped; the rest
//! are forwarded to `tracing`, whose subscriber the binary installs for the
//! duration of a single run. A recording sink also keeps them in emission
//! order so callers can inspect what was reported.

use crate::cli::LogLevel;

/// Indentation used under a document title in per-document messages
const DETAIL_INDENT: &str = "      ";

/// A single emitted diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: LogLevel,
    /// Component that raised the event (e.g. "loader", "validator")
    pub component: &'static str,
    pub message: String,
}

/// Diagnostic sink with a severity threshold
#[derive(Debug)]
pub struct Diagnostics {
    threshold: LogLevel,
    record: bool,
    emitted: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Forward events to `tracing` without keeping them
    pub fn new(threshold: LogLevel) -> Self {
        Self {
            threshold,
            record: false,
            emitted: Vec::new(),
        }
    }

    /// Forward events and keep a copy of each one
    pub fn recording(threshold: LogLevel) -> Self {
        Self {
            record: true,
            ..Self::new(threshold)
        }
    }

    pub fn is_recording(&self) -> bool {
        self.record
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    /// Check if events at `level` pass the threshold
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    /// Emit an event if it passes the threshold
    pub fn emit(&mut self, level: LogLevel, component: &'static str, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }

        let message = message.into();
        match level {
            LogLevel::Debug => tracing::debug!(component = component, "{}", message),
            LogLevel::Info => tracing::info!(component = component, "{}", message),
            LogLevel::Warning => tracing::warn!(component = component, "{}", message),
            LogLevel::Error => tracing::error!(component = component, "{}", message),
        }

        if self.record {
            self.emitted.push(Diagnostic {
                level,
                component,
                message,
            });
        }
    }

    pub fn debug(&mut self, component: &'static str, message: impl Into<String>) {
        self.emit(LogLevel::Debug, component, message);
    }

    pub fn info(&mut self, component: &'static str, message: impl Into<String>) {
        self.emit(LogLevel::Info, component, message);
    }

    pub fn warning(&mut self, component: &'static str, message: impl Into<String>) {
        self.emit(LogLevel::Warning, component, message);
    }

    pub fn error(&mut self, component: &'static str, message: impl Into<String>) {
        self.emit(LogLevel::Error, component, message);
    }

    /// Report a problem with one document: the title on the first line, the
    /// detail indented on the next.
    pub fn document_error(&mut self, component: &'static str, title: &str, detail: &str) {
        self.error(component, format_document_message(title, detail));
    }

    /// Lazily-built debug event; the closure only runs when debug is enabled.
    pub fn debug_with(&mut self, component: &'static str, message: impl FnOnce() -> String) {
        if self.enabled(LogLevel::Debug) {
            self.emit(LogLevel::Debug, component, message());
        }
    }

    /// Everything emitted so far, oldest first. Always empty unless recording.
    pub fn emitted(&self) -> &[Diagnostic] {
        &self.emitted
    }

    pub fn count_at(&self, level: LogLevel) -> usize {
        self.emitted.iter().filter(|d| d.level == level).count()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

pub fn format_document_message(title: &str, detail: &str) -> String {
    format!("{}\n{}{}", title, DETAIL_INDENT, detail)
}
