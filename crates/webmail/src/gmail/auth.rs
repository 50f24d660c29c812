//! Access-token provisioning for the Gmail client
//!
//! The interactive OAuth flow lives in the host application; the core
//! only needs a valid bearer token at request time.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Token filename in the Gale config directory
const TOKEN_FILE: &str = "gmail-token.json";

/// Validity buffer: a token expiring within this window is treated as
/// expired so an in-flight request cannot outlive it
const EXPIRY_BUFFER_SECS: i64 = 300;

/// Source of bearer tokens for API requests
pub trait AccessTokenProvider: Send + Sync {
    /// Return a currently valid access token
    fn access_token(&self) -> Result<String>;
}

/// Fixed token, for tests and short-lived tooling
pub struct StaticTokenProvider(String);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl AccessTokenProvider for StaticTokenProvider {
    fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Token data persisted by the host's OAuth flow
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix seconds; None means the expiry is unknown
    pub expires_at: Option<i64>,
}

/// Provider reading the token file the OAuth flow maintains
/// (~/.config/gale/gmail-token.json)
pub struct StoredTokenProvider {
    token_path: PathBuf,
}

impl StoredTokenProvider {
    /// Use the default token path in the Gale config directory
    pub fn new() -> Result<Self> {
        let token_path =
            config::config_path(TOKEN_FILE).context("Could not determine config directory")?;
        Ok(Self { token_path })
    }

    /// Use an explicit token file path
    pub fn from_path(token_path: impl Into<PathBuf>) -> Self {
        Self {
            token_path: token_path.into(),
        }
    }

    fn load_token(&self) -> Result<StoredToken> {
        config::load_json_file(&self.token_path)
    }
}

impl AccessTokenProvider for StoredTokenProvider {
    fn access_token(&self) -> Result<String> {
        let token = self
            .load_token()
            .context("No stored Gmail token; run the sign-in flow first")?;

        if let Some(expires_at) = token.expires_at {
            let now = chrono::Utc::now().timestamp();
            if expires_at <= now + EXPIRY_BUFFER_SECS {
                bail!("Stored Gmail token is expired; run the sign-in flow again");
            }
        }

        Ok(token.access_token)
    }
}
