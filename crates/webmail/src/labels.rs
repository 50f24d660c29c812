//! Label directory and loaded-label tracking
//!
//! The directory holds the storage labels the mailbox is organized by.
//! Draft reclassification and batch label mutations consult it to keep
//! only legal labels; transient pseudo-labels (search) never appear here.

use std::collections::HashSet;

use crate::models::{Label, LabelId};

/// Key identifying a label-set (order-insensitive)
pub fn label_set_key(labels: &[String]) -> String {
    let mut sorted: Vec<&str> = labels.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(",")
}

/// Directory of the known storage labels
#[derive(Debug, Clone, Default)]
pub struct LabelDirectory {
    storage_labels: Vec<Label>,
}

impl LabelDirectory {
    pub fn new(storage_labels: Vec<Label>) -> Self {
        Self { storage_labels }
    }

    pub fn storage_labels(&self) -> &[Label] {
        &self.storage_labels
    }

    pub fn is_empty(&self) -> bool {
        self.storage_labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.storage_labels.len()
    }

    /// Look up a storage label by id
    pub fn get(&self, id: &str) -> Option<&Label> {
        self.storage_labels.iter().find(|l| l.id.as_str() == id)
    }

    /// Whether the given id is a known storage label
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Filter a list of label ids down to the known storage labels
    ///
    /// Used for draft reclassification: the intersection decides which
    /// buckets a resolved thread legally belongs to. The unread marker is
    /// not a storage destination and never survives the filter.
    pub fn legal_labels(&self, label_ids: &[String]) -> Vec<&Label> {
        label_ids
            .iter()
            .filter(|id| id.as_str() != LabelId::UNREAD)
            .filter_map(|id| self.get(id))
            .collect()
    }
}

/// Tracker of label-sets that have completed at least one fetch
///
/// Gates initial-load completion: the spinner comes down only once every
/// storage label has a loaded bucket.
#[derive(Debug, Clone, Default)]
pub struct LoadedLabels {
    loaded: HashSet<String>,
}

impl LoadedLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a label-set has completed a fetch
    pub fn mark_loaded(&mut self, labels: &[String]) {
        if !labels.is_empty() {
            self.loaded.insert(label_set_key(labels));
        }
    }

    pub fn is_loaded(&self, labels: &[String]) -> bool {
        self.loaded.contains(&label_set_key(labels))
    }

    pub fn count(&self) -> usize {
        self.loaded.len()
    }

    /// Whether every storage label in the directory has loaded
    pub fn all_loaded(&self, directory: &LabelDirectory) -> bool {
        !directory.is_empty()
            && directory
                .storage_labels()
                .iter()
                .all(|label| self.is_loaded(std::slice::from_ref(&label.id.0)))
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> LabelDirectory {
        LabelDirectory::new(vec![
            Label::system("INBOX", "Inbox"),
            Label::system("SENT", "Sent"),
            Label::new("Label_7", "Receipts"),
        ])
    }

    #[test]
    fn test_legal_labels_intersection() {
        let dir = directory();
        let ids = vec![
            "SENT".to_string(),
            "UNREAD".to_string(),
            "Label_404".to_string(),
            "Label_7".to_string(),
        ];
        let legal = dir.legal_labels(&ids);
        let legal_ids: Vec<&str> = legal.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(legal_ids, vec!["SENT", "Label_7"]);
    }

    #[test]
    fn test_loaded_tracking() {
        let dir = directory();
        let mut loaded = LoadedLabels::new();
        assert!(!loaded.all_loaded(&dir));

        loaded.mark_loaded(&["INBOX".to_string()]);
        loaded.mark_loaded(&["SENT".to_string()]);
        assert!(loaded.is_loaded(&["INBOX".to_string()]));
        assert!(!loaded.all_loaded(&dir));

        loaded.mark_loaded(&["Label_7".to_string()]);
        assert!(loaded.all_loaded(&dir));
    }

    #[test]
    fn test_label_set_key_is_order_insensitive() {
        let a = label_set_key(&["INBOX".to_string(), "UNREAD".to_string()]);
        let b = label_set_key(&["UNREAD".to_string(), "INBOX".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_directory_never_all_loaded() {
        let dir = LabelDirectory::default();
        let loaded = LoadedLabels::new();
        assert!(!loaded.all_loaded(&dir));
    }
}
