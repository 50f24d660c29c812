//! Gmail API integration
//!
//! This module provides:
//! - Raw API response types
//! - The production `MailTransport` implementation over HTTP
//! - Response normalization to domain models
//! - The access-token seam (the OAuth flow itself lives in the host)

pub mod api;
mod auth;
mod client;
mod normalize;

pub use auth::{AccessTokenProvider, StaticTokenProvider, StoredToken, StoredTokenProvider};
pub use client::{GmailClient, HistoryExpiredError};
pub use normalize::{history_records, normalize_message, normalize_thread};
