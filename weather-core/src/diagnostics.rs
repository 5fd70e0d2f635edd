//! Operator-facing diagnostics.
//!
//! Per-city failures never abort a run. They are reported here instead, as
//! structured events, and the binary routes them to stderr through `tracing`.

use std::{fmt, sync::Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Provider answered with a non-2xx status.
    Http,
    /// Host unreachable, refused, DNS failure.
    Connection,
    Timeout,
    /// Any other transport fault, including an undecodable body.
    Transport,
    /// Success status but the payload lacks fields the record needs.
    MalformedPayload,
    LogWrite,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Http => "http",
            FailureKind::Connection => "connection",
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
            FailureKind::MalformedPayload => "malformed_payload",
            FailureKind::LogWrite => "log_write",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub severity: Severity,
    pub kind: FailureKind,
    pub city: String,
    pub message: String,
}

impl DiagnosticEvent {
    pub fn warning(kind: FailureKind, city: &str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, kind, city: city.to_string(), message: message.into() }
    }

    pub fn error(kind: FailureKind, city: &str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, kind, city: city.to_string(), message: message.into() }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: DiagnosticEvent);
}

/// Forwards events to the `tracing` subscriber installed by the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, event: DiagnosticEvent) {
        let DiagnosticEvent { severity, kind, city, message } = event;
        match severity {
            Severity::Warning => tracing::warn!(%city, %kind, "{message}"),
            Severity::Error => tracing::error!(%city, %kind, "{message}"),
        }
    }
}

/// Keeps every reported event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn kinds(&self) -> Vec<FailureKind> {
        self.events().iter().map(|e| e.kind).collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, event: DiagnosticEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_call_order() {
        let sink = RecordingSink::new();
        sink.report(DiagnosticEvent::warning(FailureKind::Timeout, "Paris", "slow"));
        sink.report(DiagnosticEvent::error(FailureKind::MalformedPayload, "Oslo", "no main"));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].severity, Severity::Warning);
        assert_eq!(events[0].city, "Paris");
        assert_eq!(events[1].severity, Severity::Error);
        assert_eq!(sink.kinds(), vec![FailureKind::Timeout, FailureKind::MalformedPayload]);
    }

    #[test]
    fn failure_kind_display_is_snake_case() {
        assert_eq!(FailureKind::MalformedPayload.to_string(), "malformed_payload");
        assert_eq!(FailureKind::Http.to_string(), "http");
    }
}
