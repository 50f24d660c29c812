//! System-status channel
//!
//! Every failure caught by the orchestration layers is translated into
//! exactly one status event; nothing propagates to the caller as an
//! unhandled error.

use std::sync::Mutex;

/// Severity of a status event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Error,
    Info,
}

/// A user-visible status event
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub kind: StatusKind,
    pub message: String,
}

impl StatusUpdate {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }
}

/// Sink accepting status events for user-visible notification
pub trait StatusSink: Send + Sync {
    fn publish(&self, update: StatusUpdate);
}

/// Default sink that forwards events to the log
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn publish(&self, update: StatusUpdate) {
        match update.kind {
            StatusKind::Error => log::error!("{}", update.message),
            StatusKind::Info => log::info!("{}", update.message),
        }
    }
}

/// Sink that records events in memory, for tests and headless use
#[derive(Default)]
pub struct CollectingStatusSink {
    events: Mutex<Vec<StatusUpdate>>,
}

impl CollectingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all recorded events
    pub fn take(&self) -> Vec<StatusUpdate> {
        std::mem::take(&mut self.events.lock().unwrap())
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any recorded event is an error
    pub fn has_error(&self) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.kind == StatusKind::Error)
    }
}

impl StatusSink for CollectingStatusSink {
    fn publish(&self, update: StatusUpdate) {
        self.events.lock().unwrap().push(update);
    }
}
