//! Message model representing a single mail message within a thread

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{LabelId, ThreadId};

/// Unique identifier for a message (provider message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Addressing and subject headers lifted out of the raw header list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageHeaders {
    pub date: String,
    pub from: String,
    pub subject: String,
    pub to: String,
    pub cc: String,
    pub bcc: String,
}

/// Reference to an attachment carried by a message part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub attachment_id: String,
    pub filename: String,
    pub mime_type: String,
    pub size: u32,
}

/// Normalized message payload.
///
/// The raw provider payload is a recursive part tree; it is flattened at
/// the transport boundary so core logic never sees undecoded parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub mime_type: String,
    pub headers: MessageHeaders,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    pub attachments: Vec<AttachmentRef>,
}

/// A single mail message within a thread
///
/// Immutable once fetched: updates replace the whole object, fields are
/// never patched individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Provider message ID
    pub id: MessageId,
    /// ID of the thread this message belongs to
    pub thread_id: ThreadId,
    /// Label IDs attached to this message (e.g., "INBOX", "UNREAD")
    pub label_ids: Vec<String>,
    /// Preview text
    pub snippet: String,
    /// Normalized payload
    pub payload: MessagePayload,
    /// Provider-internal timestamp (milliseconds since epoch); 0 for a
    /// draft that has not been saved yet
    pub internal_date: i64,
    /// History cursor the message was last seen at
    pub history_id: String,
}

impl EmailMessage {
    /// Create a new message builder
    pub fn builder(id: MessageId, thread_id: ThreadId) -> EmailMessageBuilder {
        EmailMessageBuilder::new(id, thread_id)
    }

    /// Whether this message carries the draft label
    pub fn is_draft(&self) -> bool {
        self.label_ids.iter().any(|l| l == LabelId::DRAFT)
    }

    /// Whether this message carries the unread label
    pub fn is_unread(&self) -> bool {
        self.label_ids.iter().any(|l| l == LabelId::UNREAD)
    }

    /// The internal date as a UTC timestamp
    pub fn received_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.internal_date)
            .single()
            .unwrap_or_default()
    }
}

/// Builder for creating EmailMessage instances
pub struct EmailMessageBuilder {
    id: MessageId,
    thread_id: ThreadId,
    label_ids: Vec<String>,
    snippet: String,
    payload: MessagePayload,
    internal_date: i64,
    history_id: String,
}

impl EmailMessageBuilder {
    fn new(id: MessageId, thread_id: ThreadId) -> Self {
        Self {
            id,
            thread_id,
            label_ids: Vec::new(),
            snippet: String::new(),
            payload: MessagePayload::default(),
            internal_date: 0,
            history_id: String::new(),
        }
    }

    pub fn label_ids(mut self, label_ids: Vec<String>) -> Self {
        self.label_ids = label_ids;
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn payload(mut self, payload: MessagePayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn internal_date(mut self, internal_date: i64) -> Self {
        self.internal_date = internal_date;
        self
    }

    pub fn history_id(mut self, history_id: impl Into<String>) -> Self {
        self.history_id = history_id.into();
        self
    }

    pub fn build(self) -> EmailMessage {
        EmailMessage {
            id: self.id,
            thread_id: self.thread_id,
            label_ids: self.label_ids,
            snippet: self.snippet,
            payload: self.payload,
            internal_date: self.internal_date,
            history_id: self.history_id,
        }
    }
}
