//! Raw Gmail API response types
//!
//! Deserialized as-is from the wire; everything here is normalized into
//! the domain models before core logic sees it.

use serde::{Deserialize, Serialize};

/// Response from listing threads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListThreadsResponse {
    pub threads: Option<Vec<ThreadRef>>,
    pub next_page_token: Option<String>,
    pub result_size_estimate: Option<u32>,
}

/// Reference to a thread (list-level stub)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRef {
    pub id: String,
    #[serde(default)]
    pub history_id: String,
    #[serde(default)]
    pub snippet: String,
}

/// Full thread from the threads.get endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailThread {
    pub id: String,
    #[serde(default)]
    pub history_id: String,
    pub messages: Option<Vec<GmailMessage>>,
}

/// Full message from the Gmail API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    pub id: String,
    pub thread_id: String,
    pub label_ids: Option<Vec<String>>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub internal_date: String,
    #[serde(default)]
    pub history_id: String,
    pub payload: Option<MessagePayload>,
}

/// Message payload containing headers and body parts
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub headers: Option<Vec<Header>>,
    pub body: Option<MessageBody>,
    pub parts: Option<Vec<MessagePart>>,
    pub mime_type: Option<String>,
}

/// Email header (name-value pair)
#[derive(Debug, Deserialize, Serialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Message body (may be base64 encoded)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub size: Option<u32>,
    pub data: Option<String>,
    pub attachment_id: Option<String>,
}

/// Message part (for multipart messages)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    pub part_id: Option<String>,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
    pub headers: Option<Vec<Header>>,
    pub body: Option<MessageBody>,
    pub parts: Option<Vec<MessagePart>>,
}

/// Response from the history.list endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub history: Option<Vec<HistoryItem>>,
    pub history_id: Option<String>,
    pub next_page_token: Option<String>,
}

/// One history record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    #[serde(default)]
    pub id: String,
    pub messages_added: Option<Vec<HistoryMessage>>,
    pub labels_added: Option<Vec<HistoryMessage>>,
    pub labels_removed: Option<Vec<HistoryMessage>>,
}

/// A message touched by a history record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    pub message: MessageRef,
    pub label_ids: Option<Vec<String>>,
}

/// Reference to a message (id, thread id, current labels)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    pub thread_id: String,
    pub label_ids: Option<Vec<String>>,
}

/// Response from listing labels
#[derive(Debug, Deserialize)]
pub struct ListLabelsResponse {
    pub labels: Option<Vec<ApiLabel>>,
}

/// A label as the API reports it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLabel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub label_type: Option<String>,
}
