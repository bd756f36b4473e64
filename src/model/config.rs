use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::timeline::Level;

/// Snapshots retained for undo unless configured otherwise
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Configuration from soa.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub decisions: DecisionConfig,
    #[serde(default)]
    pub naming: NamingConfig,
}

impl EditorConfig {
    /// Label used for default node names at a level, e.g. "Visit" for days
    /// when overridden; falls back to the built-in level label.
    pub fn label_for(&self, level: Level) -> &str {
        self.naming
            .labels
            .get(&level.to_string())
            .map(String::as_str)
            .unwrap_or(level.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DragConfig {
    #[serde(default)]
    pub inside_position: InsidePosition,
}

/// Where an `inside` drop lands within the container's existing children.
/// The source behavior makes the dragged node the first child; append is the
/// alternative reading of the same gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsidePosition {
    #[default]
    Prepend,
    Append,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionConfig {
    #[serde(default)]
    pub policy: PendingPolicy,
}

/// How unresolved empty-container decisions stack up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingPolicy {
    /// Last write wins: a new decision replaces an unresolved one
    #[default]
    Overwrite,
    /// Decisions queue and resolve oldest-first
    Queue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Level label overrides keyed by level name ("day" -> "Visit")
    #[serde(default)]
    pub labels: HashMap<String, String>,
}
