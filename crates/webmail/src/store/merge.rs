//! Merge engine
//!
//! Pure reconciliation of a freshly fetched thread batch into the bucket
//! state: update-in-place by id, dedup, sort, and pagination metadata
//! carry-over. Applying the same batch twice is idempotent, which makes
//! late-arriving stale responses harmless.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::models::{EmailThread, LabelId};
use crate::store::state::{EmailListBucket, EmailListState};

/// Carry-over marker for pagination metadata.
///
/// `Keep` retains the prior bucket's value (the history-delta path must
/// not disturb pagination state); `Set` overwrites, including with None.
#[derive(Debug, Clone, PartialEq)]
pub enum Carry<T> {
    Keep,
    Set(T),
}

impl<T: Clone> Carry<T> {
    fn resolve(&self, prior: T) -> T {
        match self {
            Carry::Keep => prior,
            Carry::Set(value) => value.clone(),
        }
    }
}

/// One batch of fetched threads destined for a bucket
#[derive(Debug, Clone)]
pub struct BucketUpdate {
    /// Label-set the batch was fetched for
    pub labels: Vec<String>,
    /// Fully resolved threads
    pub threads: Vec<EmailThread>,
    /// Fetch timestamp (milliseconds), or Keep on delta refreshes
    pub timestamp: Carry<Option<i64>>,
    /// Pagination token, or Keep on delta refreshes
    pub next_page_token: Carry<Option<String>>,
    /// Search query; presence routes the batch to the search bucket
    pub q: Option<String>,
}

impl BucketUpdate {
    /// A list-page update that overwrites pagination metadata
    pub fn page(
        labels: Vec<String>,
        threads: Vec<EmailThread>,
        timestamp: Option<i64>,
        next_page_token: Option<String>,
    ) -> Self {
        Self {
            labels,
            threads,
            timestamp: Carry::Set(timestamp),
            next_page_token: Carry::Set(next_page_token),
            q: None,
        }
    }

    /// A delta update that retains the bucket's pagination metadata
    pub fn delta(labels: Vec<String>, threads: Vec<EmailThread>) -> Self {
        Self {
            labels,
            threads,
            timestamp: Carry::Keep,
            next_page_token: Carry::Keep,
            q: None,
        }
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    fn is_search(&self) -> bool {
        self.labels.iter().any(|l| l == LabelId::SEARCH)
    }
}

/// Merge a batch into the state, creating or replacing buckets as needed
pub(crate) fn upsert(state: &mut EmailListState, update: BucketUpdate) {
    // Nothing to merge into without a label-set
    if update.labels.is_empty() {
        return;
    }

    let existing_index = state.index_of_labels(&update.labels);

    if !update.threads.is_empty() {
        // Search path: merge into a matching query, supersede otherwise
        if let Some(q) = &update.q {
            state.search_list = Some(match state.search_list.as_ref() {
                Some(search) if search.q.as_deref() == Some(q.as_str()) => {
                    merge_bucket(search, &update)
                }
                _ => fresh_bucket(&update),
            });
            return;
        }

        if let Some(index) = existing_index {
            state.email_list[index] = merge_bucket(&state.email_list[index], &update);
            return;
        }

        if !update.is_search() {
            state.email_list.push(fresh_bucket(&update));
        }
        return;
    }

    // A fetch that yielded zero results still marks the label-set as
    // fetched, distinct from "never fetched"
    if existing_index.is_none() && !update.is_search() {
        state.email_list.push(EmailListBucket {
            labels: update.labels,
            threads: Vec::new(),
            next_page_token: None,
            timestamp: update.timestamp.resolve(None),
            q: None,
        });
    }
}

/// Pure merge of a batch into an existing bucket
fn merge_bucket(existing: &EmailListBucket, update: &BucketUpdate) -> EmailListBucket {
    let mut threads = existing.threads.clone();
    let mut additions = Vec::new();

    for incoming in &update.threads {
        match threads.iter_mut().find(|t| t.id == incoming.id) {
            // Full overwrite, never a field-merge
            Some(slot) => *slot = incoming.clone(),
            None => additions.push(incoming.clone()),
        }
    }
    threads.extend(additions);

    dedup_threads(&mut threads);
    sort_threads(&mut threads, is_draft_set(&update.labels));

    EmailListBucket {
        labels: update.labels.clone(),
        threads,
        next_page_token: update
            .next_page_token
            .resolve(existing.next_page_token.clone()),
        timestamp: update.timestamp.resolve(existing.timestamp),
        q: update.q.clone(),
    }
}

/// Build a bucket from a batch with no prior state
fn fresh_bucket(update: &BucketUpdate) -> EmailListBucket {
    let mut threads = update.threads.clone();
    dedup_threads(&mut threads);
    sort_threads(&mut threads, is_draft_set(&update.labels));

    EmailListBucket {
        labels: update.labels.clone(),
        threads,
        next_page_token: update.next_page_token.resolve(None),
        timestamp: update.timestamp.resolve(None),
        q: update.q.clone(),
    }
}

fn is_draft_set(labels: &[String]) -> bool {
    labels.iter().any(|l| l == LabelId::DRAFT)
}

/// Drop duplicate ids, first occurrence wins
fn dedup_threads(threads: &mut Vec<EmailThread>) {
    let mut seen = HashSet::new();
    threads.retain(|t| seen.insert(t.id.clone()));
}

/// Sort threads for display
///
/// Non-draft buckets order by newest activity descending. Draft buckets
/// order by the last message's save time descending, with unsaved drafts
/// (no internal date yet) on top.
fn sort_threads(threads: &mut [EmailThread], drafts: bool) {
    if drafts {
        threads.sort_by_key(|t| Reverse(draft_touch_key(t)));
    } else {
        threads.sort_by_key(|t| Reverse(t.latest_internal_date()));
    }
}

fn draft_touch_key(thread: &EmailThread) -> i64 {
    match thread.last_message() {
        Some(m) if m.internal_date > 0 => m.internal_date,
        _ => i64::MAX,
    }
}
