//! Email-list repository and merge engine
//!
//! The repository holds the normalized bucket state; the merge engine is
//! the pure reconciliation function every fetched batch goes through.

mod merge;
mod state;

pub use merge::{BucketUpdate, Carry};
pub use state::{
    ActiveList, EmailListBucket, EmailListState, SelectedEmails, SelectionAction, SelectionEvent,
};
