//! Mailbox synchronization
//!
//! Startup bootstrap plus the incremental history refresh that keeps
//! buckets current between full fetches.

mod bootstrap;
mod history;

pub use bootstrap::{BASE_LABELS, bootstrap_mailbox};
pub use history::refresh_email_feed;
