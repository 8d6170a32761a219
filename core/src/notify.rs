//! Operator-visible messages
//!
//! Messages the player should see (as opposed to diagnostics that only go to
//! the log) pass through a [`Notifier`]. Each one carries the
//! [`MESSAGE_PREFIX`] so the operator can tell which mod produced it.

use std::fmt;

/// Prefix stamped on every operator message
pub const MESSAGE_PREFIX: &str = "[VehicleRemover]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
        })
    }
}

/// Sink for operator messages (the game's debug panel, a log, a test buffer)
pub trait Notifier {
    fn notify(&mut self, severity: Severity, message: &str);

    fn info(&mut self, message: &str) {
        self.notify(Severity::Info, message);
    }

    fn warning(&mut self, message: &str) {
        self.notify(Severity::Warning, message);
    }
}

/// Stamp the subsystem prefix onto a message
pub fn prefixed(message: &str) -> String {
    format!("{} {}", MESSAGE_PREFIX, message)
}

/// Forwards operator messages to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, severity: Severity, message: &str) {
        let line = prefixed(message);
        match severity {
            Severity::Info => tracing::info!(target: "operator", "{}", line),
            Severity::Warning => tracing::warn!(target: "operator", "{}", line),
        }
    }
}

/// A recorded operator message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorMessage {
    pub severity: Severity,
    /// Full text, prefix included
    pub text: String,
}

/// Keeps every message in memory, optionally forwarding to `tracing` too.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<OperatorMessage>,
    echo: bool,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also emit each message through [`TracingNotifier`]
    pub fn echoing() -> Self {
        Self {
            messages: Vec::new(),
            echo: true,
        }
    }

    pub fn messages(&self) -> &[OperatorMessage] {
        &self.messages
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &OperatorMessage> {
        self.messages.iter().filter(move |m| m.severity == severity)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &OperatorMessage> {
        self.with_severity(Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Notifier for MessageLog {
    fn notify(&mut self, severity: Severity, message: &str) {
        if self.echo {
            TracingNotifier.notify(severity, message);
        }
        self.messages.push(OperatorMessage {
            severity,
            text: prefixed(message),
        });
    }
}
