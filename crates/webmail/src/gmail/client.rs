//! Gmail API HTTP client
//!
//! Production implementation of the transport contract. Uses synchronous
//! HTTP (ureq) to be executor-agnostic; the orchestration layers decide
//! what runs in parallel.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use super::api::{
    ApiLabel, GmailThread, HistoryResponse, ListLabelsResponse, ListThreadsResponse,
};
use super::auth::AccessTokenProvider;
use super::normalize::{history_records, normalize_thread};
use crate::models::{EmailThread, Label, MessageId, ThreadId};
use crate::transport::{
    HistoryRecord, LabelChangeRequest, MailTransport, ThreadListPage, ThreadListQuery, ThreadStub,
};

/// Error indicating the history cursor has expired
#[derive(Debug, thiserror::Error)]
#[error("History cursor expired or invalid")]
pub struct HistoryExpiredError;

/// Gmail API client
pub struct GmailClient {
    auth: Arc<dyn AccessTokenProvider>,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Create a new Gmail client
    pub fn new(auth: Arc<dyn AccessTokenProvider>) -> Self {
        Self { auth }
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.access_token()?))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let mut response = ureq::get(url)
            .header("Authorization", &self.bearer()?)
            .call()
            .with_context(|| format!("Failed to send {what} request"))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {what} response"))
    }

    fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
        what: &str,
    ) -> Result<T> {
        let mut response = ureq::post(url)
            .header("Authorization", &self.bearer()?)
            .send_json(body)
            .with_context(|| format!("Failed to send {what} request"))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {what} response"))
    }

    fn post_empty(&self, url: &str, what: &str) -> Result<()> {
        ureq::post(url)
            .header("Authorization", &self.bearer()?)
            .send_empty()
            .with_context(|| format!("Failed to send {what} request"))?;
        Ok(())
    }

    /// One page of the history endpoint
    fn list_history_page(
        &self,
        start_history_id: u64,
        page_token: Option<&str>,
    ) -> Result<HistoryResponse> {
        let mut url = Url::parse(&format!("{}/users/me/history", Self::BASE_URL))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("startHistoryId", &start_history_id.to_string());
            pairs.append_pair("historyTypes", "messageAdded");
            pairs.append_pair("historyTypes", "labelAdded");
            pairs.append_pair("historyTypes", "labelRemoved");
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }

        let response = ureq::get(url.as_str())
            .header("Authorization", &self.bearer()?)
            .call();

        match response {
            Ok(mut resp) => resp
                .body_mut()
                .read_json()
                .context("Failed to parse history response"),
            // The provider answers 404 when the cursor is too old
            Err(ureq::Error::StatusCode(404)) => Err(HistoryExpiredError.into()),
            Err(e) => Err(anyhow::anyhow!("Failed to fetch history: {}", e)),
        }
    }
}

impl MailTransport for GmailClient {
    fn fetch_thread_list(&self, query: &ThreadListQuery) -> Result<ThreadListPage> {
        let mut url = Url::parse(&format!("{}/users/me/threads", Self::BASE_URL))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("maxResults", &query.max_results.min(500).to_string());
            for label in &query.label_ids {
                pairs.append_pair("labelIds", label);
            }
            if let Some(token) = &query.page_token {
                pairs.append_pair("pageToken", token);
            }
            if let Some(q) = &query.q {
                pairs.append_pair("q", q);
            }
        }

        let list: ListThreadsResponse = self.get_json(url.as_str(), "list threads")?;

        Ok(ThreadListPage {
            threads: list
                .threads
                .unwrap_or_default()
                .into_iter()
                .map(|t| ThreadStub {
                    id: ThreadId::new(t.id),
                    history_id: t.history_id,
                })
                .collect(),
            next_page_token: list.next_page_token,
            timestamp: Some(Utc::now().timestamp_millis()),
        })
    }

    fn fetch_thread_detail(&self, id: &ThreadId) -> Result<EmailThread> {
        let url = format!(
            "{}/users/me/threads/{}?format=full",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );
        let thread: GmailThread = self.get_json(&url, "get thread")?;
        Ok(normalize_thread(thread))
    }

    fn update_thread(&self, id: &ThreadId, request: &LabelChangeRequest) -> Result<()> {
        let url = format!(
            "{}/users/me/threads/{}/modify",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );
        let body = serde_json::json!({
            "addLabelIds": request.add_label_ids,
            "removeLabelIds": request.remove_label_ids,
        });
        let _: serde_json::Value = self.post_json(&url, body, "modify thread")?;
        Ok(())
    }

    fn trash_thread(&self, id: &ThreadId) -> Result<()> {
        let url = format!(
            "{}/users/me/threads/{}/trash",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );
        self.post_empty(&url, "trash thread")
    }

    fn trash_message(&self, id: &MessageId) -> Result<()> {
        let url = format!(
            "{}/users/me/messages/{}/trash",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );
        self.post_empty(&url, "trash message")
    }

    fn fetch_history(
        &self,
        start_history_id: u64,
        label_scope: &[String],
    ) -> Result<Vec<HistoryRecord>> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let response = self.list_history_page(start_history_id, page_token.as_deref())?;
            records.extend(history_records(&response, label_scope));

            match response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(records)
    }

    fn fetch_profile(&self) -> Result<crate::transport::UserProfile> {
        let url = format!("{}/users/me/profile", Self::BASE_URL);
        self.get_json(&url, "get profile")
    }

    fn list_labels(&self) -> Result<Vec<Label>> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);
        let response: ListLabelsResponse = self.get_json(&url, "list labels")?;

        Ok(response
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(label_from_api)
            .collect())
    }

    fn create_label(&self, name: &str) -> Result<Label> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);
        let body = serde_json::json!({
            "name": name,
            "labelListVisibility": "labelShow",
            "messageListVisibility": "show",
        });
        let label: ApiLabel = self.post_json(&url, body, "create label")?;
        Ok(label_from_api(label))
    }
}

fn label_from_api(label: ApiLabel) -> Label {
    if label.label_type.as_deref() == Some("system") {
        Label::system(label.id, label.name)
    } else {
        Label::new(label.id, label.name)
    }
}
