//! Webmail core - client-side application logic for the Gale mail client
//!
//! This crate provides the state-reconciliation engine behind the UI:
//! - Domain models (EmailThread, EmailMessage, Label)
//! - A normalized in-memory repository of label-scoped email lists
//! - The merge engine reconciling fetched batches into bucket state
//! - Detail loading with concurrent fan-out and draft reclassification
//! - Label-update orchestration with optimistic removals
//! - Incremental history refresh and startup bootstrap
//! - The Gmail transport implementation behind the `MailTransport` seam
//!
//! This crate has zero UI dependencies; rendering, routing, and the
//! OAuth flow live in the host application.

pub mod actions;
pub mod gmail;
pub mod labels;
pub mod loader;
pub mod models;
pub mod nav;
pub mod session;
pub mod status;
pub mod store;
pub mod sync;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use actions::{LabelUpdateHandler, ThreadUpdateParams};
pub use gmail::{
    AccessTokenProvider, GmailClient, HistoryExpiredError, StaticTokenProvider,
    StoredTokenProvider,
};
pub use labels::{LabelDirectory, LoadedLabels, label_set_key};
pub use loader::{DetailLoader, DetailRequest};
pub use models::{
    AttachmentRef, EmailMessage, EmailThread, Label, LabelId, MessageHeaders, MessageId,
    MessagePayload, ThreadId,
};
pub use nav::{Navigator, NullNavigator};
pub use session::{LoadFlags, SessionState};
pub use status::{CollectingStatusSink, LogStatusSink, StatusKind, StatusSink, StatusUpdate};
pub use store::{
    ActiveList, BucketUpdate, Carry, EmailListBucket, EmailListState, SelectedEmails,
    SelectionAction, SelectionEvent,
};
pub use sync::{BASE_LABELS, bootstrap_mailbox, refresh_email_feed};
pub use transport::{
    HistoryRecord, LabelChangeRequest, MailTransport, ThreadListPage, ThreadListQuery, ThreadStub,
    UserProfile,
};
