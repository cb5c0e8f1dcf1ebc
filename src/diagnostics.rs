//! Diagnostic sink for non-fatal conditions.
//!
//! The core never fails on a diagnostic; it reports through a
//! [`DiagnosticSink`] and carries on (or returns its own error). The default
//! [`LogSink`] forwards to the `log` facade.

use core::fmt;

/// Severity attached to a diagnostic message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Recoverable input problem, e.g. a malformed tag payload.
    Warning,
    /// An operation was refused.
    Error,
}

impl Severity {
    /// Matching `log` level.
    pub fn level(self) -> log::Level {
        match self {
            Self::Warning => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

/// Receiver for severity-tagged diagnostic messages.
///
/// Fire-and-forget: the core ignores whatever the sink does with a message.
pub trait DiagnosticSink {
    /// Report one formatted message.
    fn emit(&self, severity: Severity, message: fmt::Arguments<'_>);
}

/// Forwards diagnostics to the `log` crate under the `zenraster` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, severity: Severity, message: fmt::Arguments<'_>) {
        log::log!(target: "zenraster", severity.level(), "{message}");
    }
}

/// Drops every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _severity: Severity, _message: fmt::Arguments<'_>) {}
}

impl<F> DiagnosticSink for F
where
    F: Fn(Severity, fmt::Arguments<'_>),
{
    fn emit(&self, severity: Severity, message: fmt::Arguments<'_>) {
        self(severity, message)
    }
}
