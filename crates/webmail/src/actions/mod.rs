//! Email actions module
//!
//! High-level handlers for label mutations: archive, delete, mark
//! read/unread, and moves between custom labels.

mod handler;

pub use handler::{LabelUpdateHandler, ThreadUpdateParams};
