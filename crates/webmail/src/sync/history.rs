//! Incremental feed refresh
//!
//! Pulls history records since the cached profile cursor and replays
//! them through the detail loader, keeping buckets current without a
//! full refetch. Records apply strictly in order; pagination state is
//! never disturbed by a delta refresh.

use crate::labels::{LabelDirectory, LoadedLabels};
use crate::loader::{DetailLoader, DetailRequest};
use crate::session::SessionState;
use crate::status::{StatusSink, StatusUpdate};
use crate::store::EmailListState;
use crate::transport::MailTransport;

/// Refresh the email feed from the history endpoint
///
/// On any failure one status error is surfaced and the cursor is left
/// unchanged; there is no automatic retry, the next triggered refresh
/// picks up from the same cursor.
pub fn refresh_email_feed(
    transport: &dyn MailTransport,
    status: &dyn StatusSink,
    loader: &DetailLoader,
    state: &mut EmailListState,
    session: &mut SessionState,
    directory: &LabelDirectory,
    loaded: &mut LoadedLabels,
) {
    state.set_fetching(true);

    let Some(since) = session.history_id() else {
        status.publish(StatusUpdate::error("Unable to refresh the feed."));
        state.set_fetching(false);
        return;
    };

    let scope: Vec<String> = directory
        .storage_labels()
        .iter()
        .map(|l| l.id.0.clone())
        .collect();

    match transport.fetch_history(since, &scope) {
        Ok(records) => {
            let applied = records.len();
            // Record i+1 merges only after record i has committed
            for record in records {
                loader.load_details(
                    state,
                    session,
                    directory,
                    loaded,
                    DetailRequest::delta(record.labels, record.threads),
                );
            }

            // Advance the cursor only after the deltas are in
            match transport.fetch_profile() {
                Ok(profile) => {
                    log::info!(
                        "Feed refreshed: {applied} history records, cursor {}",
                        profile.history_id
                    );
                    session.profile = Some(profile);
                }
                Err(e) => {
                    log::warn!("Profile refetch failed: {e:#}");
                    status.publish(StatusUpdate::error("Unable to refresh the feed."));
                }
            }
        }
        Err(e) => {
            log::warn!("History fetch failed: {e:#}");
            status.publish(StatusUpdate::error("Unable to refresh the feed."));
        }
    }

    state.set_fetching(false);
}
