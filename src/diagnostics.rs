//! Diagnostic reporting shared by the pipeline stages
//!
//! Every stage receives a [`Diagnostics`] sink when it is constructed instead
//! of logging through a global. The binary passes [`TracingDiagnostics`];
//! tests pass [`MemoryDiagnostics`] and inspect what was reported.

use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Severity of a diagnostic message
pub enum Level {
    /// Progress detail, only shown when verbose logging is enabled
    Debug,
    /// Notable but expected events
    Info,
    /// Problems the user can fix
    Warn,
    /// Failures reported to the user
    Error,
}

/// Receives messages from the pipeline stages
///
/// Messages must never contain passwords or field values.
pub trait Diagnostics {
    /// Record a progress message
    fn debug(&self, message: fmt::Arguments<'_>);
    /// Record a notable event
    fn info(&self, message: fmt::Arguments<'_>);
    /// Record a problem the user can fix
    fn warn(&self, message: fmt::Arguments<'_>);
    /// Record a failure
    fn error(&self, message: fmt::Arguments<'_>);
}

#[derive(Debug, Default, Clone, Copy)]
/// Forwards diagnostics to the installed `tracing` subscriber
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn debug(&self, message: fmt::Arguments<'_>) {
        tracing::debug!("{}", message);
    }

    fn info(&self, message: fmt::Arguments<'_>) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        tracing::error!("{}", message);
    }
}

#[derive(Debug, Default)]
/// Keeps every diagnostic in memory
pub struct MemoryDiagnostics {
    records: RefCell<Vec<(Level, String)>>,
}

impl MemoryDiagnostics {
    /// Create an empty sink
    pub fn new() -> MemoryDiagnostics {
        MemoryDiagnostics::default()
    }

    /// All recorded messages, oldest first
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.borrow().clone()
    }

    /// Whether any message at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .borrow()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    fn push(&self, level: Level, message: fmt::Arguments<'_>) {
        self.records.borrow_mut().push((level, message.to_string()));
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn debug(&self, message: fmt::Arguments<'_>) {
        self.push(Level::Debug, message);
    }

    fn info(&self, message: fmt::Arguments<'_>) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        self.push(Level::Error, message);
    }
}
