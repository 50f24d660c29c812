//! Base mailbox bootstrap
//!
//! Run once at startup: ensures the base labels exist upstream, seeds one
//! empty bucket per base label, caches the user profile, and prefetches
//! every box.

use crate::labels::{LabelDirectory, LoadedLabels};
use crate::loader::DetailLoader;
use crate::models::Label;
use crate::session::SessionState;
use crate::status::{StatusSink, StatusUpdate};
use crate::store::{EmailListBucket, EmailListState};
use crate::transport::MailTransport;

/// Labels every mailbox is organized by. The system ones always exist
/// upstream; the Gale ones are created on first run.
pub const BASE_LABELS: &[&str] = &[
    "INBOX",
    "SENT",
    "DRAFT",
    "SPAM",
    "Gale/To Do",
    "Gale/Keep",
    "Gale/Reminder",
];

/// Bootstrap the mailbox: resolve the storage labels, seed buckets, and
/// prefetch each box
///
/// Returns the resolved label directory, or None when the label listing
/// itself fails (a status error has been published).
pub fn bootstrap_mailbox(
    transport: &dyn MailTransport,
    status: &dyn StatusSink,
    loader: &DetailLoader,
    state: &mut EmailListState,
    session: &mut SessionState,
    loaded: &mut LoadedLabels,
) -> Option<LabelDirectory> {
    let mut labels = match transport.list_labels() {
        Ok(labels) => labels,
        Err(e) => {
            log::warn!("Label listing failed: {e:#}");
            status.publish(StatusUpdate::error("Network error, please try again later."));
            return None;
        }
    };

    // Create whichever base labels the mailbox is missing
    for name in BASE_LABELS {
        if labels.iter().any(|l| l.name == *name) {
            continue;
        }
        match transport.create_label(name) {
            Ok(label) => {
                log::info!("Created missing base label {}", label.name);
                labels.push(label);
            }
            Err(e) => {
                log::warn!("Could not create label {name}: {e:#}");
                status.publish(StatusUpdate::error("Unable to prepare the mailbox."));
            }
        }
    }

    // The directory keeps base order; labels that failed to create are
    // simply absent until the next bootstrap
    let storage: Vec<Label> = BASE_LABELS
        .iter()
        .filter_map(|name| labels.iter().find(|l| l.name == *name).cloned())
        .collect();
    let directory = LabelDirectory::new(storage);

    state.replace_bucket_list(
        directory
            .storage_labels()
            .iter()
            .map(|label| EmailListBucket::empty(vec![label.id.0.clone()]))
            .collect(),
    );
    session.flags.is_loading = true;

    // The profile carries the history cursor later refreshes start from
    match transport.fetch_profile() {
        Ok(profile) => session.profile = Some(profile),
        Err(e) => {
            log::warn!("Profile fetch failed: {e:#}");
            status.publish(StatusUpdate::error("Unable to load the user profile."));
        }
    }

    for label in directory.storage_labels() {
        loader.load_page(
            state,
            session,
            &directory,
            loaded,
            vec![label.id.0.clone()],
            None,
            None,
        );
    }

    Some(directory)
}
