//! Label-update orchestration
//!
//! Applies label mutations optimistically to the repository, issues the
//! matching upstream requests, and keeps the active list filled after
//! removals. Optimistic removals are not rolled back on network failure;
//! the next refresh reconciles.

use log::info;
use std::sync::Arc;

use crate::labels::{LabelDirectory, LoadedLabels};
use crate::loader::DetailLoader;
use crate::models::{LabelId, MessageId, ThreadId};
use crate::nav::Navigator;
use crate::session::SessionState;
use crate::status::{StatusSink, StatusUpdate};
use crate::store::{ActiveList, EmailListState};
use crate::transport::{LabelChangeRequest, MailTransport};

/// When this few items remain below the open detail view, the next page
/// is fetched so the list does not run dry after a removal
const EDGE_LOAD_THRESHOLD: usize = 4;

/// A label mutation targeting one thread within a label-set scope
#[derive(Debug, Clone)]
pub struct ThreadUpdateParams {
    pub thread_id: ThreadId,
    pub request: LabelChangeRequest,
    /// Label-set the mutation originates from, used for backfill
    pub label_ids: Vec<String>,
}

/// Handler for label mutations: archive, delete, mark read/unread,
/// and custom label moves
///
/// Mutations run in two phases: a synchronous optimistic local
/// transition (navigation plus removal from the active bucket), then the
/// upstream request whose failure is surfaced but never reverses
/// phase one.
pub struct LabelUpdateHandler {
    transport: Arc<dyn MailTransport>,
    status: Arc<dyn StatusSink>,
    navigator: Arc<dyn Navigator>,
}

impl LabelUpdateHandler {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        status: Arc<dyn StatusSink>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            status,
            navigator,
        }
    }

    /// Apply a label mutation to a single thread
    pub fn update_thread_labels(
        &self,
        state: &mut EmailListState,
        session: &mut SessionState,
        directory: &LabelDirectory,
        loaded: &mut LoadedLabels,
        loader: &DetailLoader,
        params: ThreadUpdateParams,
    ) {
        let Some(active) = state.active_bucket() else {
            self.status
                .publish(StatusUpdate::error("Error updating label."));
            return;
        };
        let active_len = active.threads.len();
        let active_token = active.next_page_token.clone();

        let destructive = params.request.removes_beyond_unread() || params.request.delete;
        let viewing_drafts = matches!(
            state.active(),
            ActiveList::Labels(labels) if labels.iter().any(|l| l == LabelId::DRAFT)
        );

        // Phase 1: move the user forward before the network round-trip,
        // and backfill when the tail below the view runs low
        if destructive
            && !viewing_drafts
            && let Some(view_index) = session.detail_view_index
        {
            self.navigator.next_item();

            let tail = active_len.saturating_sub(1).saturating_sub(view_index);
            if tail <= EDGE_LOAD_THRESHOLD
                && let Some(token) = active_token
            {
                session.flags.is_silent_loading = true;
                loader.load_page(
                    state,
                    session,
                    directory,
                    loaded,
                    params.label_ids.clone(),
                    Some(token),
                    None,
                );
            }
        }

        // Phase 2: the upstream request; failure is surfaced, the
        // optimistic state stands
        if params.request.delete {
            self.spawn_trash_thread(params.thread_id.clone());
        } else if let Err(e) = self
            .transport
            .update_thread(&params.thread_id, &params.request)
        {
            log::warn!(
                "Label update for thread {} failed: {e:#}",
                params.thread_id.as_str()
            );
            self.status
                .publish(StatusUpdate::error("Error updating label."));
        }

        if destructive {
            info!("Removing thread {} from the active list", params.thread_id.as_str());
            state.remove_thread(&params.thread_id);
        }
    }

    /// Apply one label mutation to every currently selected thread
    ///
    /// The affected threads leave the active bucket in one batch
    /// operation up front; the per-item network calls then run
    /// sequentially on a detached task, each failure wrapped on its own
    /// so the rest of the batch proceeds.
    pub fn update_thread_labels_batch(
        &self,
        state: &mut EmailListState,
        request: &LabelChangeRequest,
    ) {
        let ids = state.selection().ids.clone();
        if ids.is_empty() {
            return;
        }

        if request.removes_beyond_unread() || request.delete {
            state.remove_threads(&ids);
        }

        info!("Applying label update to {} selected threads", ids.len());
        let transport = Arc::clone(&self.transport);
        let status = Arc::clone(&self.status);
        let request = request.clone();
        std::thread::spawn(move || {
            for id in ids {
                let result = if request.delete {
                    transport.trash_thread(&id)
                } else {
                    transport.update_thread(&id, &request)
                };
                if let Err(e) = result {
                    log::warn!("Batch label update for thread {} failed: {e:#}", id.as_str());
                    status.publish(StatusUpdate::error("Error updating label."));
                }
            }
        });
    }

    /// Apply a label mutation to a single message within a thread
    ///
    /// Only deletion reaches the upstream here; the message leaves the
    /// active bucket either way while its thread is retained.
    pub fn update_message_label(
        &self,
        state: &mut EmailListState,
        thread_id: &ThreadId,
        message_id: &MessageId,
        request: &LabelChangeRequest,
    ) {
        if request.delete {
            self.spawn_trash_message(message_id.clone());
        }
        state.remove_message(thread_id, message_id);
    }

    /// Detached trash request: completion is not awaited, the error
    /// channel still reports
    fn spawn_trash_thread(&self, id: ThreadId) {
        let transport = Arc::clone(&self.transport);
        let status = Arc::clone(&self.status);
        std::thread::spawn(move || {
            if let Err(e) = transport.trash_thread(&id) {
                log::warn!("Trash request for thread {} failed: {e:#}", id.as_str());
                status.publish(StatusUpdate::error("Error updating label."));
            }
        });
    }

    fn spawn_trash_message(&self, id: MessageId) {
        let transport = Arc::clone(&self.transport);
        let status = Arc::clone(&self.status);
        std::thread::spawn(move || {
            if let Err(e) = transport.trash_message(&id) {
                log::warn!("Trash request for message {} failed: {e:#}", id.as_str());
                status.publish(StatusUpdate::error("Error updating label."));
            }
        });
    }
}
