use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::foundation::error::RefcardError;

/// One user-facing log line returned alongside a response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub is_error: bool,
    pub message: String,
}

/// Per-request structured log.
///
/// Every entry is mirrored to `tracing`. Appends are mutex-guarded so render tasks
/// running on different threads can share one log.
#[derive(Debug, Default)]
pub struct RequestLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational message.
    pub fn msg(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.push(LogEntry {
            is_error: false,
            message,
        });
    }

    /// Record a recoverable error.
    pub fn err(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.push(LogEntry {
            is_error: true,
            message,
        });
    }

    /// Record a recoverable [`RefcardError`] with a short context prefix.
    pub fn error(&self, context: &str, error: &RefcardError) {
        if context.is_empty() {
            self.err(error.to_string());
        } else {
            self.err(format!("{context}: {error}"));
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.lock().iter().filter(|e| e.is_error).count()
    }

    /// Snapshot of the entries recorded so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, entry: LogEntry) {
        self.lock().push(entry);
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/log.rs"]
mod tests;
