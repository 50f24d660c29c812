//! Session-wide state outside the email list itself
//!
//! Carries the cached user profile (the history cursor lives there), the
//! global loading flags that drive the initial-load spinner, and the
//! position of the open detail view when there is one.

use crate::transport::UserProfile;

/// Default page size for thread-list fetches
pub const DEFAULT_FETCH_SIZE: u32 = 20;

/// Global loading flags
///
/// `is_loading` gates the initial-load spinner; `is_silent_loading` marks
/// a background refresh that must not block the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadFlags {
    pub is_loading: bool,
    pub is_silent_loading: bool,
}

/// Per-session state shared across the orchestration layers
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Cached profile of the authenticated user; `history_id` is the
    /// cursor the next incremental refresh starts from
    pub profile: Option<UserProfile>,
    /// Global loading flags
    pub flags: LoadFlags,
    /// Page size used for list fetches and pagination backfill
    pub email_fetch_size: u32,
    /// Position of the open detail view within the active list, if the
    /// user is on a detail page
    pub detail_view_index: Option<usize>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            profile: None,
            flags: LoadFlags::default(),
            email_fetch_size: DEFAULT_FETCH_SIZE,
            detail_view_index: None,
        }
    }

    /// The stored history cursor, parsed; None when no profile is cached
    /// or the cursor is not numeric
    pub fn history_id(&self) -> Option<u64> {
        self.profile.as_ref()?.history_id.parse().ok()
    }
}
