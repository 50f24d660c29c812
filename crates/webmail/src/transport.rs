//! Transport contract consumed by the core
//!
//! The core never talks HTTP directly; it goes through [`MailTransport`].
//! The production implementation lives in [`crate::gmail`]; tests supply
//! in-memory implementations.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{EmailThread, Label, MessageId, ThreadId};

/// Query for one page of a label-scoped or search-scoped thread list
#[derive(Debug, Clone, Default)]
pub struct ThreadListQuery {
    /// Label IDs the list is scoped to
    pub label_ids: Vec<String>,
    /// Maximum number of threads per page
    pub max_results: u32,
    /// Page token from a previous response, if paginating
    pub page_token: Option<String>,
    /// Free-text search query; present only on the search path
    pub q: Option<String>,
}

/// Minimal thread reference returned by list and history endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadStub {
    pub id: ThreadId,
    pub history_id: String,
}

/// One page of thread stubs plus pagination metadata
#[derive(Debug, Clone, Default)]
pub struct ThreadListPage {
    pub threads: Vec<ThreadStub>,
    pub next_page_token: Option<String>,
    /// Fetch completion time in milliseconds, used for staleness display
    pub timestamp: Option<i64>,
}

/// A label mutation request against a thread or message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelChangeRequest {
    pub add_label_ids: Vec<String>,
    pub remove_label_ids: Vec<String>,
    /// When set, the target is moved to trash instead of relabeled
    pub delete: bool,
}

impl LabelChangeRequest {
    /// Whether this request removes any label other than UNREAD
    pub fn removes_beyond_unread(&self) -> bool {
        !self.remove_label_ids.is_empty()
            && !self
                .remove_label_ids
                .iter()
                .any(|l| l == crate::models::LabelId::UNREAD)
    }
}

/// An incremental change record: the threads touched since a history
/// cursor, scoped to one label-set
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub labels: Vec<String>,
    pub threads: Vec<ThreadStub>,
}

/// The authenticated user's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email_address: String,
    /// Current history cursor for incremental refresh
    pub history_id: String,
    #[serde(default)]
    pub messages_total: u64,
    #[serde(default)]
    pub threads_total: u64,
}

/// Mail-provider API consumed by the core
///
/// All operations are fallible; transport-level failures are surfaced as
/// errors and translated to status events by the orchestration layers.
pub trait MailTransport: Send + Sync {
    /// Fetch one page of thread stubs for a label-set or search query
    fn fetch_thread_list(&self, query: &ThreadListQuery) -> Result<ThreadListPage>;

    /// Fetch the full detail (all messages) of one thread
    fn fetch_thread_detail(&self, id: &ThreadId) -> Result<EmailThread>;

    /// Apply a label mutation to a thread
    fn update_thread(&self, id: &ThreadId, request: &LabelChangeRequest) -> Result<()>;

    /// Move a thread to trash
    fn trash_thread(&self, id: &ThreadId) -> Result<()>;

    /// Move a single message to trash
    fn trash_message(&self, id: &MessageId) -> Result<()>;

    /// Fetch incremental history records since the given cursor,
    /// scoped to the given storage labels
    fn fetch_history(&self, start_history_id: u64, label_scope: &[String])
    -> Result<Vec<HistoryRecord>>;

    /// Fetch the authenticated user's profile
    fn fetch_profile(&self) -> Result<UserProfile>;

    /// List all labels in the mailbox
    fn list_labels(&self) -> Result<Vec<Label>>;

    /// Create a user label by display name
    fn create_label(&self, name: &str) -> Result<Label>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_beyond_unread() {
        let archive = LabelChangeRequest {
            remove_label_ids: vec!["INBOX".to_string()],
            ..Default::default()
        };
        assert!(archive.removes_beyond_unread());

        let mark_read = LabelChangeRequest {
            remove_label_ids: vec!["UNREAD".to_string()],
            ..Default::default()
        };
        assert!(!mark_read.removes_beyond_unread());

        let add_only = LabelChangeRequest {
            add_label_ids: vec!["STARRED".to_string()],
            ..Default::default()
        };
        assert!(!add_only.removes_beyond_unread());
    }
}
