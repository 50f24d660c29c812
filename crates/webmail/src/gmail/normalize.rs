//! Gmail API response normalization
//!
//! Converts raw API responses to domain models. The recursive payload
//! part tree is flattened here so the merge engine never handles raw
//! untyped payloads.

use anyhow::{Context, Result};
use base64::prelude::*;

use super::api::{
    GmailMessage, GmailThread, HistoryResponse, MessagePart, MessagePayload as RawPayload,
};
use crate::models::{
    AttachmentRef, EmailMessage, EmailThread, MessageHeaders, MessageId, MessagePayload, ThreadId,
};
use crate::transport::{HistoryRecord, ThreadStub};

/// Normalize a raw API message to an EmailMessage
pub fn normalize_message(raw: GmailMessage) -> Result<EmailMessage> {
    let id = MessageId::new(&raw.id);
    let thread_id = ThreadId::new(&raw.thread_id);

    let payload = raw.payload.as_ref().context("Message has no payload")?;

    let headers = MessageHeaders {
        date: extract_header(payload, "Date").unwrap_or_default(),
        from: extract_header(payload, "From").unwrap_or_default(),
        subject: extract_header(payload, "Subject").unwrap_or_default(),
        to: extract_header(payload, "To").unwrap_or_default(),
        cc: extract_header(payload, "Cc").unwrap_or_default(),
        bcc: extract_header(payload, "Bcc").unwrap_or_default(),
    };

    // Drafts may not carry an internal date until saved
    let internal_date: i64 = raw.internal_date.parse().unwrap_or(0);

    let normalized = MessagePayload {
        mime_type: payload.mime_type.clone().unwrap_or_default(),
        headers,
        body_text: extract_plain_text_body(payload),
        body_html: extract_html_body(payload),
        attachments: collect_attachments(payload),
    };

    Ok(EmailMessage::builder(id, thread_id)
        .label_ids(raw.label_ids.unwrap_or_default())
        .snippet(decode_html_entities(&raw.snippet))
        .payload(normalized)
        .internal_date(internal_date)
        .history_id(raw.history_id)
        .build())
}

/// Normalize a raw API thread to an EmailThread
///
/// Messages that fail to normalize are dropped rather than failing the
/// thread; messages are ordered chronologically ascending.
pub fn normalize_thread(raw: GmailThread) -> EmailThread {
    let id = ThreadId::new(&raw.id);
    let mut messages: Vec<EmailMessage> = raw
        .messages
        .unwrap_or_default()
        .into_iter()
        .filter_map(|m| match normalize_message(m) {
            Ok(message) => Some(message),
            Err(e) => {
                log::warn!("Dropping malformed message in thread {}: {e:#}", raw.id);
                None
            }
        })
        .collect();
    messages.sort_by_key(|m| m.internal_date);

    EmailThread::new(id, raw.history_id, messages)
}

/// Flatten a history response into per-label-set delta records
///
/// Each record lists the threads touched under one storage label from the
/// given scope; record order follows the response so deltas apply in
/// sequence. Messages carrying none of the scoped labels are ignored.
pub fn history_records(response: &HistoryResponse, label_scope: &[String]) -> Vec<HistoryRecord> {
    let mut records = Vec::new();

    for item in response.history.as_deref().unwrap_or_default() {
        let touched = item
            .messages_added
            .iter()
            .chain(item.labels_added.iter())
            .chain(item.labels_removed.iter())
            .flatten();

        for label in label_scope {
            let mut stubs: Vec<ThreadStub> = Vec::new();
            for entry in touched.clone() {
                let message_labels = entry
                    .message
                    .label_ids
                    .as_deref()
                    .or(entry.label_ids.as_deref())
                    .unwrap_or_default();
                if !message_labels.iter().any(|l| l == label) {
                    continue;
                }
                let id = ThreadId::new(&entry.message.thread_id);
                if !stubs.iter().any(|s| s.id == id) {
                    stubs.push(ThreadStub {
                        id,
                        history_id: item.id.clone(),
                    });
                }
            }
            if !stubs.is_empty() {
                records.push(HistoryRecord {
                    labels: vec![label.clone()],
                    threads: stubs,
                });
            }
        }
    }

    records
}

/// Extract a header value by name
fn extract_header(payload: &RawPayload, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}

/// Extract plain text body from message payload
fn extract_plain_text_body(payload: &RawPayload) -> Option<String> {
    // Check if this is a simple message with body data
    if let Some(body) = &payload.body
        && let Some(data) = &body.data
        && payload
            .mime_type
            .as_ref()
            .is_some_and(|m| m.starts_with("text/plain"))
    {
        return decode_base64_body(data);
    }

    // Check parts for text/plain
    if let Some(parts) = &payload.parts
        && let Some(text) = find_body_in_parts(parts, "text/plain")
    {
        return Some(text);
    }

    // Fall back to any text content
    if let Some(body) = &payload.body
        && let Some(data) = &body.data
    {
        return decode_base64_body(data);
    }

    None
}

/// Extract HTML body from message payload
fn extract_html_body(payload: &RawPayload) -> Option<String> {
    if let Some(body) = &payload.body
        && let Some(data) = &body.data
        && payload
            .mime_type
            .as_ref()
            .is_some_and(|m| m.starts_with("text/html"))
    {
        return decode_base64_body(data);
    }

    if let Some(parts) = &payload.parts {
        return find_body_in_parts(parts, "text/html");
    }

    None
}

/// Recursively search message parts for the given mime type
fn find_body_in_parts(parts: &[MessagePart], mime_prefix: &str) -> Option<String> {
    for part in parts {
        if part
            .mime_type
            .as_ref()
            .is_some_and(|m| m.starts_with(mime_prefix))
            && let Some(body) = &part.body
            && let Some(data) = &body.data
            && let Some(text) = decode_base64_body(data)
        {
            return Some(text);
        }

        // Recursively check nested parts
        if let Some(nested) = &part.parts
            && let Some(text) = find_body_in_parts(nested, mime_prefix)
        {
            return Some(text);
        }
    }

    None
}

/// Collect attachment references from the part tree
fn collect_attachments(payload: &RawPayload) -> Vec<AttachmentRef> {
    let mut attachments = Vec::new();
    if let Some(parts) = &payload.parts {
        collect_attachments_in_parts(parts, &mut attachments);
    }
    attachments
}

fn collect_attachments_in_parts(parts: &[MessagePart], out: &mut Vec<AttachmentRef>) {
    for part in parts {
        if let Some(filename) = &part.filename
            && !filename.is_empty()
            && let Some(body) = &part.body
            && let Some(attachment_id) = &body.attachment_id
        {
            out.push(AttachmentRef {
                attachment_id: attachment_id.clone(),
                filename: filename.clone(),
                mime_type: part.mime_type.clone().unwrap_or_default(),
                size: body.size.unwrap_or(0),
            });
        }

        if let Some(nested) = &part.parts {
            collect_attachments_in_parts(nested, out);
        }
    }
}

/// Decode base64-encoded body data
///
/// The provider uses URL-safe base64 but padding can vary, so multiple
/// decoders are tried.
fn decode_base64_body(data: &str) -> Option<String> {
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE};

    let decoders: &[&base64::engine::GeneralPurpose] =
        &[&BASE64_URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD, &STANDARD_NO_PAD];

    for decoder in decoders {
        if let Ok(decoded) = decoder.decode(data) {
            if let Ok(s) = String::from_utf8(decoded) {
                return Some(s);
            }
        }
    }

    None
}

/// Decode HTML entities in snippet text
fn decode_html_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::{Header, HistoryItem, HistoryMessage, MessageBody, MessageRef};

    fn make_test_payload(headers: Vec<(&str, &str)>) -> RawPayload {
        RawPayload {
            headers: Some(
                headers
                    .into_iter()
                    .map(|(n, v)| Header {
                        name: n.to_string(),
                        value: v.to_string(),
                    })
                    .collect(),
            ),
            body: Some(MessageBody {
                size: Some(0),
                data: None,
                attachment_id: None,
            }),
            parts: None,
            mime_type: Some("text/plain".to_string()),
        }
    }

    fn make_raw_message(id: &str, thread_id: &str, internal_date: &str) -> GmailMessage {
        GmailMessage {
            id: id.to_string(),
            thread_id: thread_id.to_string(),
            label_ids: Some(vec!["INBOX".to_string()]),
            snippet: "Hello &amp; welcome".to_string(),
            internal_date: internal_date.to_string(),
            history_id: "99".to_string(),
            payload: Some(make_test_payload(vec![
                ("From", "alice@example.com"),
                ("Subject", "Greetings"),
            ])),
        }
    }

    #[test]
    fn test_extract_header_case_insensitive() {
        let payload = make_test_payload(vec![("FROM", "test@example.com")]);
        assert_eq!(
            extract_header(&payload, "from"),
            Some("test@example.com".to_string())
        );
        assert_eq!(extract_header(&payload, "Cc"), None);
    }

    #[test]
    fn test_normalize_message_lifts_headers_and_snippet() {
        let message = normalize_message(make_raw_message("m1", "t1", "1700000000000")).unwrap();
        assert_eq!(message.id.as_str(), "m1");
        assert_eq!(message.payload.headers.from, "alice@example.com");
        assert_eq!(message.payload.headers.subject, "Greetings");
        assert_eq!(message.snippet, "Hello & welcome");
        assert_eq!(message.internal_date, 1_700_000_000_000);
    }

    #[test]
    fn test_normalize_message_without_payload_fails() {
        let mut raw = make_raw_message("m1", "t1", "0");
        raw.payload = None;
        assert!(normalize_message(raw).is_err());
    }

    #[test]
    fn test_normalize_message_unparseable_date_becomes_zero() {
        let message = normalize_message(make_raw_message("m1", "t1", "")).unwrap();
        assert_eq!(message.internal_date, 0);
    }

    #[test]
    fn test_normalize_thread_sorts_and_drops_malformed() {
        let mut broken = make_raw_message("m3", "t1", "100");
        broken.payload = None;

        let thread = normalize_thread(GmailThread {
            id: "t1".to_string(),
            history_id: "42".to_string(),
            messages: Some(vec![
                make_raw_message("m2", "t1", "200"),
                make_raw_message("m1", "t1", "100"),
                broken,
            ]),
        });

        assert_eq!(thread.id.as_str(), "t1");
        assert_eq!(thread.messages.len(), 2);
        assert_eq!(thread.messages[0].id.as_str(), "m1");
        assert_eq!(thread.messages[1].id.as_str(), "m2");
    }

    #[test]
    fn test_decode_base64_body() {
        // "Hello, World!" in base64url
        let encoded = "SGVsbG8sIFdvcmxkIQ";
        let decoded = decode_base64_body(encoded);
        assert_eq!(decoded, Some("Hello, World!".to_string()));
    }

    #[test]
    fn test_find_body_in_nested_parts() {
        let payload = RawPayload {
            headers: None,
            body: None,
            mime_type: Some("multipart/mixed".to_string()),
            parts: Some(vec![MessagePart {
                part_id: Some("0".to_string()),
                mime_type: Some("multipart/alternative".to_string()),
                filename: None,
                headers: None,
                body: None,
                parts: Some(vec![MessagePart {
                    part_id: Some("0.0".to_string()),
                    mime_type: Some("text/plain".to_string()),
                    filename: Some(String::new()),
                    headers: None,
                    body: Some(MessageBody {
                        size: Some(13),
                        data: Some("SGVsbG8sIFdvcmxkIQ".to_string()),
                        attachment_id: None,
                    }),
                    parts: None,
                }]),
            }]),
        };

        assert_eq!(
            extract_plain_text_body(&payload),
            Some("Hello, World!".to_string())
        );
        assert_eq!(extract_html_body(&payload), None);
    }

    #[test]
    fn test_collect_attachments() {
        let payload = RawPayload {
            headers: None,
            body: None,
            mime_type: Some("multipart/mixed".to_string()),
            parts: Some(vec![MessagePart {
                part_id: Some("1".to_string()),
                mime_type: Some("application/pdf".to_string()),
                filename: Some("invoice.pdf".to_string()),
                headers: None,
                body: Some(MessageBody {
                    size: Some(1024),
                    data: None,
                    attachment_id: Some("att-1".to_string()),
                }),
                parts: None,
            }]),
        };

        let attachments = collect_attachments(&payload);
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "invoice.pdf");
        assert_eq!(attachments[0].attachment_id, "att-1");
    }

    #[test]
    fn test_history_records_scoped_and_ordered() {
        let response = HistoryResponse {
            history_id: Some("500".to_string()),
            next_page_token: None,
            history: Some(vec![
                HistoryItem {
                    id: "401".to_string(),
                    messages_added: Some(vec![HistoryMessage {
                        message: MessageRef {
                            id: "m1".to_string(),
                            thread_id: "t1".to_string(),
                            label_ids: Some(vec!["INBOX".to_string(), "UNREAD".to_string()]),
                        },
                        label_ids: None,
                    }]),
                    labels_added: None,
                    labels_removed: None,
                },
                HistoryItem {
                    id: "402".to_string(),
                    messages_added: None,
                    labels_added: Some(vec![HistoryMessage {
                        message: MessageRef {
                            id: "m2".to_string(),
                            thread_id: "t2".to_string(),
                            label_ids: Some(vec!["SENT".to_string()]),
                        },
                        label_ids: Some(vec!["SENT".to_string()]),
                    }]),
                    labels_removed: None,
                },
            ]),
        };

        let scope = vec!["INBOX".to_string(), "SENT".to_string()];
        let records = history_records(&response, &scope);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].labels, vec!["INBOX".to_string()]);
        assert_eq!(records[0].threads[0].id.as_str(), "t1");
        assert_eq!(records[0].threads[0].history_id, "401");
        assert_eq!(records[1].labels, vec!["SENT".to_string()]);
        assert_eq!(records[1].threads[0].id.as_str(), "t2");
    }

    #[test]
    fn test_history_records_ignores_out_of_scope_labels() {
        let response = HistoryResponse {
            history_id: None,
            next_page_token: None,
            history: Some(vec![HistoryItem {
                id: "401".to_string(),
                messages_added: Some(vec![HistoryMessage {
                    message: MessageRef {
                        id: "m1".to_string(),
                        thread_id: "t1".to_string(),
                        label_ids: Some(vec!["SPAM".to_string()]),
                    },
                    label_ids: None,
                }]),
                labels_added: None,
                labels_removed: None,
            }]),
        };

        let records = history_records(&response, &["INBOX".to_string()]);
        assert!(records.is_empty());
    }
}
