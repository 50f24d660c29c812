//! Email-list repository state
//!
//! One bucket per label-set plus a singleton search bucket, a selection
//! set scoped to a single label-set, and the active-view marker. All
//! mutations are synchronous and run to completion; safety comes from the
//! single-writer discipline, not from locking.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{EmailThread, MessageId, ThreadId};
use crate::store::merge::{self, BucketUpdate};

/// A label-scoped (or search-scoped) collection of threads plus
/// pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailListBucket {
    /// Label-set this bucket is keyed by
    pub labels: Vec<String>,
    /// Threads, unique by id, sorted (see the merge engine comparators)
    pub threads: Vec<EmailThread>,
    /// Token for the next page; None when the list is exhausted
    pub next_page_token: Option<String>,
    /// Completion time of the last full fetch, milliseconds
    pub timestamp: Option<i64>,
    /// Search query this bucket answers; None for label buckets
    pub q: Option<String>,
}

impl EmailListBucket {
    /// An empty bucket recording that a fetch happened and yielded zero
    /// results, distinct from "never fetched"
    pub fn empty(labels: Vec<String>) -> Self {
        Self {
            labels,
            threads: Vec::new(),
            next_page_token: None,
            timestamp: None,
            q: None,
        }
    }

    pub fn contains_thread(&self, id: &ThreadId) -> bool {
        self.threads.iter().any(|t| &t.id == id)
    }
}

/// Which view the user is currently looking at
///
/// Buckets are addressed by label-set key, never by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActiveList {
    #[default]
    None,
    /// The search results bucket
    Search,
    /// The bucket keyed by this label-set
    Labels(Vec<String>),
}

/// Selection event action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    Add,
    Remove,
}

/// One multi-select event
#[derive(Debug, Clone)]
pub struct SelectionEvent {
    pub action: SelectionAction,
    pub id: ThreadId,
    /// Label scope the event originates from
    pub label_ids: Vec<String>,
}

/// The multi-selected thread ids, scoped to a single label-set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedEmails {
    pub label_ids: Vec<String>,
    pub ids: Vec<ThreadId>,
}

/// Normalized in-memory cache of all email-list views
#[derive(Debug, Clone, Default)]
pub struct EmailListState {
    pub(crate) email_list: Vec<EmailListBucket>,
    pub(crate) search_list: Option<EmailListBucket>,
    pub(crate) active_list: ActiveList,
    pub(crate) selected: SelectedEmails,
    pub(crate) is_fetching: bool,
}

impl EmailListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full reset, e.g. on logout
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // === Read accessors ===

    pub fn buckets(&self) -> &[EmailListBucket] {
        &self.email_list
    }

    pub fn bucket_at(&self, index: usize) -> Option<&EmailListBucket> {
        self.email_list.get(index)
    }

    pub fn search_bucket(&self) -> Option<&EmailListBucket> {
        self.search_list.as_ref()
    }

    /// The bucket keyed by the given label-set
    pub fn bucket_for_labels(&self, labels: &[String]) -> Option<&EmailListBucket> {
        self.index_of_labels(labels)
            .and_then(|i| self.email_list.get(i))
    }

    pub fn active(&self) -> &ActiveList {
        &self.active_list
    }

    pub fn active_bucket(&self) -> Option<&EmailListBucket> {
        match &self.active_list {
            ActiveList::None => None,
            ActiveList::Search => self.search_list.as_ref(),
            ActiveList::Labels(labels) => self.bucket_for_labels(labels),
        }
    }

    pub fn selection(&self) -> &SelectedEmails {
        &self.selected
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    /// Index of the bucket whose label-set contains the first of the
    /// given labels
    pub(crate) fn index_of_labels(&self, labels: &[String]) -> Option<usize> {
        let first = labels.first()?;
        self.email_list
            .iter()
            .position(|bucket| bucket.labels.contains(first))
    }

    pub(crate) fn active_bucket_mut(&mut self) -> Option<&mut EmailListBucket> {
        match self.active_list.clone() {
            ActiveList::None => None,
            ActiveList::Search => self.search_list.as_mut(),
            ActiveList::Labels(labels) => {
                let index = self.index_of_labels(&labels)?;
                self.email_list.get_mut(index)
            }
        }
    }

    // === Mutations ===

    pub fn set_active(&mut self, active: ActiveList) {
        self.active_list = active;
    }

    pub fn set_fetching(&mut self, is_fetching: bool) {
        self.is_fetching = is_fetching;
    }

    /// Bulk-initialize the bucket list (base-label bootstrap)
    pub fn replace_bucket_list(&mut self, buckets: Vec<EmailListBucket>) {
        self.email_list = buckets;
    }

    /// Merge a batch of threads into the bucket for the given label-set,
    /// creating or replacing buckets as the merge engine decides
    pub fn upsert_bucket(&mut self, update: BucketUpdate) {
        merge::upsert(self, update);
    }

    /// Remove a thread from the active bucket; no-op when absent
    pub fn remove_thread(&mut self, thread_id: &ThreadId) {
        if let Some(bucket) = self.active_bucket_mut() {
            bucket.threads.retain(|t| &t.id != thread_id);
        }
    }

    /// Remove a thread from the bucket keyed by the given label-set
    ///
    /// Used by the draft-discard path, which targets the drafts bucket
    /// regardless of which view is active.
    pub fn remove_thread_in(&mut self, labels: &[String], thread_id: &ThreadId) {
        if let Some(index) = self.index_of_labels(labels) {
            self.email_list[index]
                .threads
                .retain(|t| &t.id != thread_id);
        }
    }

    /// Batch removal from the active bucket
    pub fn remove_threads(&mut self, thread_ids: &[ThreadId]) {
        let ids: HashSet<&ThreadId> = thread_ids.iter().collect();
        if let Some(bucket) = self.active_bucket_mut() {
            bucket.threads.retain(|t| !ids.contains(&t.id));
        }
    }

    /// Remove one message from one thread in the active bucket; the
    /// thread is retained even if its message list becomes empty
    pub fn remove_message(&mut self, thread_id: &ThreadId, message_id: &MessageId) {
        if let Some(bucket) = self.active_bucket_mut()
            && let Some(thread) = bucket.threads.iter_mut().find(|t| &t.id == thread_id)
        {
            thread.messages.retain(|m| &m.id != message_id);
        }
    }

    /// Apply a batch of selection events
    ///
    /// A batch whose scope differs from the stored scope resets the set
    /// before applying; an empty batch clears the selection entirely.
    pub fn apply_selection(&mut self, events: &[SelectionEvent]) {
        let Some(first) = events.first() else {
            self.selected = SelectedEmails::default();
            return;
        };

        let scope_matches = !self.selected.label_ids.is_empty()
            && first
                .label_ids
                .iter()
                .any(|l| self.selected.label_ids.contains(l));
        if !scope_matches {
            self.selected = SelectedEmails {
                label_ids: first.label_ids.clone(),
                ids: Vec::new(),
            };
        }

        for event in events {
            match event.action {
                SelectionAction::Add => {
                    if !self.selected.ids.contains(&event.id) {
                        self.selected.ids.push(event.id.clone());
                    }
                }
                SelectionAction::Remove => {
                    self.selected.ids.retain(|id| id != &event.id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmailMessage, MessageId};

    fn make_thread(id: &str, internal_date: i64) -> EmailThread {
        let message = EmailMessage::builder(MessageId::new(format!("{id}-m1")), ThreadId::new(id))
            .internal_date(internal_date)
            .build();
        EmailThread::new(ThreadId::new(id), "1", vec![message])
    }

    fn state_with_inbox(threads: Vec<EmailThread>) -> EmailListState {
        let mut state = EmailListState::new();
        state.replace_bucket_list(vec![EmailListBucket {
            labels: vec!["INBOX".to_string()],
            threads,
            next_page_token: Some("tok".to_string()),
            timestamp: Some(1),
            q: None,
        }]);
        state.set_active(ActiveList::Labels(vec!["INBOX".to_string()]));
        state
    }

    fn add_event(id: &str, labels: &[&str]) -> SelectionEvent {
        SelectionEvent {
            action: SelectionAction::Add,
            id: ThreadId::new(id),
            label_ids: labels.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_remove_thread_from_active_bucket() {
        let mut state = state_with_inbox(vec![
            make_thread("t1", 100),
            make_thread("t2", 200),
            make_thread("t3", 300),
        ]);

        state.remove_thread(&ThreadId::new("t1"));

        let bucket = state.active_bucket().unwrap();
        let ids: Vec<&str> = bucket.threads.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t3"]);
    }

    #[test]
    fn test_remove_thread_missing_is_noop() {
        let mut state = state_with_inbox(vec![make_thread("t1", 100)]);
        state.remove_thread(&ThreadId::new("unknown"));
        assert_eq!(state.active_bucket().unwrap().threads.len(), 1);
    }

    #[test]
    fn test_remove_threads_batch() {
        let mut state = state_with_inbox(vec![
            make_thread("t1", 100),
            make_thread("t2", 200),
            make_thread("t3", 300),
        ]);

        state.remove_threads(&[ThreadId::new("t1"), ThreadId::new("t3")]);

        let bucket = state.active_bucket().unwrap();
        assert_eq!(bucket.threads.len(), 1);
        assert_eq!(bucket.threads[0].id.as_str(), "t2");
    }

    #[test]
    fn test_remove_threads_leaves_other_buckets_alone() {
        let mut state = state_with_inbox(vec![make_thread("t1", 100)]);
        state.email_list.push(EmailListBucket {
            labels: vec!["SENT".to_string()],
            threads: vec![make_thread("t1", 100)],
            next_page_token: None,
            timestamp: None,
            q: None,
        });

        state.remove_threads(&[ThreadId::new("t1")]);

        assert!(state.bucket_for_labels(&["INBOX".to_string()]).unwrap().threads.is_empty());
        assert_eq!(
            state.bucket_for_labels(&["SENT".to_string()]).unwrap().threads.len(),
            1
        );
    }

    #[test]
    fn test_remove_message_retains_empty_thread() {
        let mut state = state_with_inbox(vec![make_thread("t1", 100)]);

        state.remove_message(&ThreadId::new("t1"), &MessageId::new("t1-m1"));

        let bucket = state.active_bucket().unwrap();
        assert_eq!(bucket.threads.len(), 1);
        assert!(bucket.threads[0].messages.is_empty());
    }

    #[test]
    fn test_selection_accumulates_within_scope() {
        let mut state = EmailListState::new();
        state.apply_selection(&[add_event("a", &["INBOX"])]);
        state.apply_selection(&[add_event("b", &["INBOX"])]);

        assert_eq!(state.selection().ids.len(), 2);
        assert_eq!(state.selection().label_ids, vec!["INBOX".to_string()]);
    }

    #[test]
    fn test_selection_resets_on_scope_change() {
        let mut state = EmailListState::new();
        state.apply_selection(&[add_event("a", &["INBOX"]), add_event("b", &["INBOX"])]);
        assert_eq!(state.selection().ids.len(), 2);

        state.apply_selection(&[add_event("c", &["SENT"])]);

        assert_eq!(state.selection().label_ids, vec!["SENT".to_string()]);
        assert_eq!(state.selection().ids, vec![ThreadId::new("c")]);
    }

    #[test]
    fn test_selection_remove_and_dedup() {
        let mut state = EmailListState::new();
        state.apply_selection(&[
            add_event("a", &["INBOX"]),
            add_event("a", &["INBOX"]),
            add_event("b", &["INBOX"]),
        ]);
        assert_eq!(state.selection().ids.len(), 2);

        state.apply_selection(&[SelectionEvent {
            action: SelectionAction::Remove,
            id: ThreadId::new("a"),
            label_ids: vec!["INBOX".to_string()],
        }]);
        assert_eq!(state.selection().ids, vec![ThreadId::new("b")]);
    }

    #[test]
    fn test_empty_selection_batch_clears() {
        let mut state = EmailListState::new();
        state.apply_selection(&[add_event("a", &["INBOX"])]);
        state.apply_selection(&[]);
        assert_eq!(state.selection(), &SelectedEmails::default());
    }

    #[test]
    fn test_active_search_bucket() {
        let mut state = EmailListState::new();
        state.search_list = Some(EmailListBucket {
            labels: vec!["SEARCH".to_string()],
            threads: vec![make_thread("s1", 10)],
            next_page_token: None,
            timestamp: None,
            q: Some("foo".to_string()),
        });
        state.set_active(ActiveList::Search);

        state.remove_thread(&ThreadId::new("s1"));
        assert!(state.search_bucket().unwrap().threads.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = state_with_inbox(vec![make_thread("t1", 100)]);
        state.apply_selection(&[add_event("t1", &["INBOX"])]);
        state.set_fetching(true);

        state.reset();

        assert!(state.buckets().is_empty());
        assert!(state.search_bucket().is_none());
        assert!(!state.is_fetching());
        assert_eq!(state.active(), &ActiveList::None);
    }
}
