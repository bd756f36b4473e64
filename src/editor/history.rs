use chrono::Local;

use crate::model::config::DEFAULT_HISTORY_CAPACITY;
use crate::model::timeline::Timeline;

/// A whole-tree copy captured before a mutation was applied
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Human-readable action label, e.g. `move week "Week 2"`
    pub label: String,
    /// Local capture time
    pub taken: String,
    pub tree: Timeline,
}

/// Bounded LIFO stack of pre-mutation snapshots. There is no redo: undo
/// restores each captured state exactly once, oldest entries fall off when
/// the capacity is exceeded.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Snapshot>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        History {
            stack: Vec::new(),
            // A zero capacity would silently disable undo
            capacity: capacity.max(1),
        }
    }

    /// Push a deep copy of the tree, tagged with an action label.
    /// The oldest entry is discarded once the stack exceeds capacity.
    pub fn snapshot(&mut self, tree: &Timeline, label: impl Into<String>) {
        self.stack.push(Snapshot {
            label: label.into(),
            taken: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            tree: tree.clone(),
        });
        if self.stack.len() > self.capacity {
            self.stack.drain(..self.stack.len() - self.capacity);
        }
    }

    /// Pop the most recent snapshot; `None` means nothing to undo
    pub fn undo(&mut self) -> Option<Snapshot> {
        self.stack.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Label of the action that would be undone next
    pub fn last_label(&self) -> Option<&str> {
        self.stack.last().map(|s| s.label.as_str())
    }
}
