//! Detail loader
//!
//! Resolves list-level thread stubs into full threads and dispatches them
//! into the merge engine. Detail fetches fan out concurrently and the
//! batch completes only when every fetch has settled; a transport failure
//! aborts the whole batch with a single status event and no partial
//! writes, while individually malformed entries are filtered out.

use rayon::prelude::*;
use std::sync::Arc;

use crate::labels::{LabelDirectory, LoadedLabels};
use crate::models::EmailThread;
use crate::session::SessionState;
use crate::status::{StatusSink, StatusUpdate};
use crate::store::{BucketUpdate, Carry, EmailListState};
use crate::transport::{MailTransport, ThreadListPage, ThreadListQuery, ThreadStub};

/// A bucket-level batch of thread stubs awaiting detail resolution
#[derive(Debug, Clone)]
pub struct DetailRequest {
    /// Label-set the batch was fetched for
    pub labels: Vec<String>,
    /// Stubs to resolve
    pub stubs: Vec<ThreadStub>,
    /// Fetch timestamp to apply, or Keep on delta refreshes
    pub timestamp: Carry<Option<i64>>,
    /// Pagination token to apply, or Keep on delta refreshes
    pub next_page_token: Carry<Option<String>>,
    /// Search query, when the batch answers a search
    pub q: Option<String>,
}

impl DetailRequest {
    /// Batch from a list page: pagination metadata overwrites
    pub fn page(labels: Vec<String>, page: ThreadListPage) -> Self {
        Self {
            labels,
            stubs: page.threads,
            timestamp: Carry::Set(page.timestamp),
            next_page_token: Carry::Set(page.next_page_token),
            q: None,
        }
    }

    /// Batch from a history delta: pagination metadata is retained
    pub fn delta(labels: Vec<String>, stubs: Vec<ThreadStub>) -> Self {
        Self {
            labels,
            stubs,
            timestamp: Carry::Keep,
            next_page_token: Carry::Keep,
            q: None,
        }
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }
}

/// Orchestrates detail fetches and feeds the merge engine
pub struct DetailLoader {
    transport: Arc<dyn MailTransport>,
    status: Arc<dyn StatusSink>,
}

impl DetailLoader {
    pub fn new(transport: Arc<dyn MailTransport>, status: Arc<dyn StatusSink>) -> Self {
        Self { transport, status }
    }

    /// Fetch one thread-list page and feed it through detail resolution
    pub fn load_page(
        &self,
        state: &mut EmailListState,
        session: &mut SessionState,
        directory: &LabelDirectory,
        loaded: &mut LoadedLabels,
        labels: Vec<String>,
        page_token: Option<String>,
        q: Option<String>,
    ) {
        let query = ThreadListQuery {
            label_ids: labels.clone(),
            max_results: session.email_fetch_size,
            page_token,
            q: q.clone(),
        };

        match self.transport.fetch_thread_list(&query) {
            Ok(page) => {
                let mut request = DetailRequest::page(labels, page);
                request.q = q;
                self.load_details(state, session, directory, loaded, request);
            }
            Err(e) => {
                log::warn!("Thread list fetch failed: {e:#}");
                self.status
                    .publish(StatusUpdate::error("Unable to fetch the email list."));
            }
        }
    }

    /// Resolve a batch of stubs and merge the results
    pub fn load_details(
        &self,
        state: &mut EmailListState,
        session: &mut SessionState,
        directory: &LabelDirectory,
        loaded: &mut LoadedLabels,
        request: DetailRequest,
    ) {
        if request.stubs.is_empty() {
            // A fetch that yielded nothing still marks the label-set
            // fetched and may complete the initial load
            state.upsert_bucket(BucketUpdate {
                labels: request.labels.clone(),
                threads: Vec::new(),
                timestamp: request.timestamp,
                next_page_token: request.next_page_token,
                q: request.q,
            });
            loaded.mark_loaded(&request.labels);
            self.settle_load_flags(session, directory, loaded);
            return;
        }

        // Fan out one detail fetch per stub; the batch completes only
        // when every member fetch has settled
        let results: Vec<anyhow::Result<EmailThread>> = request
            .stubs
            .par_iter()
            .map(|stub| self.transport.fetch_thread_detail(&stub.id))
            .collect();

        let mut resolved = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(thread) => {
                    // Shape mismatches are filtered, not raised
                    if !thread.messages.is_empty() {
                        resolved.push(thread);
                    }
                }
                Err(e) => {
                    log::warn!("Thread detail fetch failed: {e:#}");
                    self.status
                        .publish(StatusUpdate::error("Unable to update the emails."));
                    return;
                }
            }
        }

        if resolved.is_empty() {
            return;
        }

        let last_is_draft = resolved[0].last_message().is_some_and(|m| m.is_draft());
        if last_is_draft {
            // The resolved thread is a draft update for a thread filed
            // elsewhere (e.g. a reply-draft on a sent thread): re-derive
            // its legal label-sets and merge into each matching bucket
            // instead of the originally requested one
            let source_labels = &resolved[0].messages[0].label_ids;
            for label in directory.legal_labels(source_labels) {
                state.upsert_bucket(BucketUpdate::delta(
                    vec![label.id.0.clone()],
                    resolved.clone(),
                ));
            }
        } else {
            state.upsert_bucket(BucketUpdate {
                labels: request.labels.clone(),
                threads: resolved,
                timestamp: request.timestamp,
                next_page_token: request.next_page_token,
                q: request.q,
            });
            loaded.mark_loaded(&request.labels);
        }

        self.settle_load_flags(session, directory, loaded);
    }

    /// Tear down the initial-load spinner once every expected label-set
    /// has loaded; silent refreshes settle after any dispatch
    fn settle_load_flags(
        &self,
        session: &mut SessionState,
        directory: &LabelDirectory,
        loaded: &LoadedLabels,
    ) {
        if session.flags.is_loading && loaded.all_loaded(directory) {
            session.flags.is_loading = false;
        }
        if session.flags.is_silent_loading {
            session.flags.is_silent_loading = false;
        }
    }
}
