//! Thread model representing a conversation

use serde::{Deserialize, Serialize};

use super::EmailMessage;

/// Unique identifier for a thread (provider thread ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A thread (conversation) holding one or more messages
///
/// Messages are ordered chronologically ascending; display layers may
/// reverse them for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailThread {
    /// Provider thread ID, unique within a bucket
    pub id: ThreadId,
    /// History cursor the thread was last seen at
    pub history_id: String,
    /// Messages in chronological order
    pub messages: Vec<EmailMessage>,
}

impl EmailThread {
    pub fn new(id: ThreadId, history_id: impl Into<String>, messages: Vec<EmailMessage>) -> Self {
        Self {
            id,
            history_id: history_id.into(),
            messages,
        }
    }

    /// The most recent message, if any
    pub fn last_message(&self) -> Option<&EmailMessage> {
        self.messages.last()
    }

    /// Timestamp of the newest activity in the thread (milliseconds)
    pub fn latest_internal_date(&self) -> i64 {
        self.messages
            .iter()
            .map(|m| m.internal_date)
            .max()
            .unwrap_or(0)
    }
}
