//! Shared fixtures for unit tests

use anyhow::{Result, bail};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::labels::LabelDirectory;
use crate::models::{EmailMessage, EmailThread, Label, MessageId, ThreadId};
use crate::transport::{
    HistoryRecord, LabelChangeRequest, MailTransport, ThreadListPage, ThreadListQuery, ThreadStub,
    UserProfile,
};

/// A recorded mutation call against the mock transport
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    UpdateThread(ThreadId, LabelChangeRequest),
    TrashThread(ThreadId),
    TrashMessage(MessageId),
}

/// In-memory transport serving canned data and recording mutations
#[derive(Default)]
pub struct MockTransport {
    pub threads: Mutex<HashMap<String, EmailThread>>,
    pub pages: Mutex<Vec<ThreadListPage>>,
    pub history: Mutex<Vec<HistoryRecord>>,
    pub profile: Mutex<Option<UserProfile>>,
    pub labels: Mutex<Vec<Label>>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub fail_details: bool,
    pub fail_history: bool,
    pub fail_updates: bool,
}

impl MockTransport {
    pub fn with_threads(threads: Vec<EmailThread>) -> Self {
        Self {
            threads: Mutex::new(threads.into_iter().map(|t| (t.id.0.clone(), t)).collect()),
            ..Default::default()
        }
    }

    pub fn queue_page(&self, page: ThreadListPage) {
        self.pages.lock().unwrap().push(page);
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl MailTransport for MockTransport {
    fn fetch_thread_list(&self, _query: &ThreadListQuery) -> Result<ThreadListPage> {
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            bail!("no pages queued")
        }
        Ok(pages.remove(0))
    }

    fn fetch_thread_detail(&self, id: &ThreadId) -> Result<EmailThread> {
        if self.fail_details {
            bail!("network down")
        }
        self.threads
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("thread not found"))
    }

    fn update_thread(&self, id: &ThreadId, request: &LabelChangeRequest) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::UpdateThread(id.clone(), request.clone()));
        if self.fail_updates {
            bail!("network down")
        }
        Ok(())
    }

    fn trash_thread(&self, id: &ThreadId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::TrashThread(id.clone()));
        if self.fail_updates {
            bail!("network down")
        }
        Ok(())
    }

    fn trash_message(&self, id: &MessageId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RecordedCall::TrashMessage(id.clone()));
        Ok(())
    }

    fn fetch_history(&self, _since: u64, _scope: &[String]) -> Result<Vec<HistoryRecord>> {
        if self.fail_history {
            bail!("network down")
        }
        Ok(self.history.lock().unwrap().clone())
    }

    fn fetch_profile(&self) -> Result<UserProfile> {
        self.profile
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no profile"))
    }

    fn list_labels(&self) -> Result<Vec<Label>> {
        Ok(self.labels.lock().unwrap().clone())
    }

    fn create_label(&self, name: &str) -> Result<Label> {
        let label = Label::new(format!("Label_{name}"), name);
        self.labels.lock().unwrap().push(label.clone());
        Ok(label)
    }
}

/// A single-message thread carrying the given labels
pub fn make_thread(id: &str, labels: &[&str], internal_date: i64) -> EmailThread {
    let message = EmailMessage::builder(MessageId::new(format!("{id}-m1")), ThreadId::new(id))
        .label_ids(labels.iter().map(|s| s.to_string()).collect())
        .internal_date(internal_date)
        .build();
    EmailThread::new(ThreadId::new(id), "1", vec![message])
}

pub fn make_stub(id: &str) -> ThreadStub {
    ThreadStub {
        id: ThreadId::new(id),
        history_id: "1".to_string(),
    }
}

/// Directory with the three labels most tests need
pub fn directory() -> LabelDirectory {
    LabelDirectory::new(vec![
        Label::system("INBOX", "Inbox"),
        Label::system("SENT", "Sent"),
        Label::system("DRAFT", "Drafts"),
    ])
}

/// Wait until the mock has recorded at least `count` calls, for
/// asserting on detached tasks
pub fn wait_for_calls(transport: &MockTransport, count: usize) -> bool {
    for _ in 0..200 {
        if transport.calls.lock().unwrap().len() >= count {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    false
}
