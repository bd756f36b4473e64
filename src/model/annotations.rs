use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::activity::CellKey;

/// Free-text comments keyed by cell identity (activity row × day column).
/// A side table, not part of the timeline tree: structural moves leave it
/// untouched, only day deletion prunes entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentStore {
    comments: IndexMap<CellKey, String>,
}

impl CommentStore {
    pub fn new() -> Self {
        CommentStore::default()
    }

    /// Set the comment for a cell. Empty text removes the entry.
    pub fn set(&mut self, activity_id: &str, day_id: &str, text: impl Into<String>) {
        let key = (activity_id.to_string(), day_id.to_string());
        let text = text.into();
        if text.is_empty() {
            self.comments.shift_remove(&key);
        } else {
            self.comments.insert(key, text);
        }
    }

    pub fn get(&self, activity_id: &str, day_id: &str) -> Option<&str> {
        self.comments
            .get(&(activity_id.to_string(), day_id.to_string()))
            .map(String::as_str)
    }

    pub fn remove(&mut self, activity_id: &str, day_id: &str) -> bool {
        self.comments
            .shift_remove(&(activity_id.to_string(), day_id.to_string()))
            .is_some()
    }

    /// Drop comments referencing deleted days
    pub fn prune_days(&mut self, removed_day_ids: &[String]) {
        self.comments
            .retain(|(_, day_id), _| !removed_day_ids.contains(day_id));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &str)> {
        self.comments.iter().map(|(key, text)| (key, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_and_get() {
        let mut store = CommentStore::new();
        store.set("act-1", "d1", "fasting required");
        assert_eq!(store.get("act-1", "d1"), Some("fasting required"));
        assert_eq!(store.get("act-1", "d2"), None);
    }

    #[test]
    fn overwrite_replaces_text() {
        let mut store = CommentStore::new();
        store.set("act-1", "d1", "draft");
        store.set("act-1", "d1", "final");
        assert_eq!(store.get("act-1", "d1"), Some("final"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn empty_text_removes_entry() {
        let mut store = CommentStore::new();
        store.set("act-1", "d1", "note");
        store.set("act-1", "d1", "");
        assert!(store.is_empty());
    }

    #[test]
    fn remove_reports_presence() {
        let mut store = CommentStore::new();
        store.set("act-1", "d1", "note");
        assert!(store.remove("act-1", "d1"));
        assert!(!store.remove("act-1", "d1"));
    }

    #[test]
    fn prune_days_keeps_other_columns() {
        let mut store = CommentStore::new();
        store.set("act-1", "d1", "keep");
        store.set("act-1", "d2", "drop");
        store.set("act-2", "d2", "drop too");

        store.prune_days(&["d2".to_string()]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("act-1", "d1"), Some("keep"));
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let mut store = CommentStore::new();
        store.set("act-2", "d3", "b");
        store.set("act-1", "d1", "a");
        let keys: Vec<&CellKey> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys[0].1, "d3");
        assert_eq!(keys[1].1, "d1");
    }
}
