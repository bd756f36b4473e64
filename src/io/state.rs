use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::timeline::Level;

/// Persisted grid UI state (written to .state.json). Header visibility and
/// labeling only; nothing in here is tree-structural.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridUiState {
    #[serde(default = "default_true")]
    pub show_periods: bool,
    #[serde(default = "default_true")]
    pub show_cycles: bool,
    #[serde(default = "default_true")]
    pub show_weeks: bool,
    #[serde(default = "default_true")]
    pub show_days: bool,
    /// Custom header labels keyed by level name
    #[serde(default)]
    pub header_labels: HashMap<String, String>,
}

impl Default for GridUiState {
    fn default() -> Self {
        GridUiState {
            show_periods: true,
            show_cycles: true,
            show_weeks: true,
            show_days: true,
            header_labels: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl GridUiState {
    pub fn is_visible(&self, level: Level) -> bool {
        match level {
            Level::Period => self.show_periods,
            Level::Cycle => self.show_cycles,
            Level::Week => self.show_weeks,
            Level::Day => self.show_days,
        }
    }

    pub fn set_visible(&mut self, level: Level, visible: bool) {
        match level {
            Level::Period => self.show_periods = visible,
            Level::Cycle => self.show_cycles = visible,
            Level::Week => self.show_weeks = visible,
            Level::Day => self.show_days = visible,
        }
    }

    /// Header label for a level, when customized
    pub fn header_label(&self, level: Level) -> Option<&str> {
        self.header_labels
            .get(&level.to_string())
            .map(String::as_str)
    }
}

/// Read .state.json from the project directory
pub fn read_grid_state(dir: &Path) -> Option<GridUiState> {
    let path = dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the project directory
pub fn write_grid_state(dir: &Path, state: &GridUiState) -> Result<(), std::io::Error> {
    let path = dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut state = GridUiState::default();
        state.show_weeks = false;
        state
            .header_labels
            .insert("period".into(), "Epoch".into());

        write_grid_state(dir.path(), &state).unwrap();
        let loaded = read_grid_state(dir.path()).unwrap();

        assert!(loaded.show_periods);
        assert!(!loaded.show_weeks);
        assert_eq!(loaded.header_label(Level::Period), Some("Epoch"));
        assert_eq!(loaded.header_label(Level::Day), None);
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_grid_state(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".state.json"), "not json {{{").unwrap();
        assert!(read_grid_state(dir.path()).is_none());
    }

    #[test]
    fn serde_defaults_on_minimal_object() {
        let state: GridUiState = serde_json::from_str("{}").unwrap();
        assert!(state.show_periods);
        assert!(state.show_cycles);
        assert!(state.show_weeks);
        assert!(state.show_days);
        assert!(state.header_labels.is_empty());
    }

    #[test]
    fn visibility_toggles_per_level() {
        let mut state = GridUiState::default();
        state.set_visible(Level::Cycle, false);
        assert!(!state.is_visible(Level::Cycle));
        assert!(state.is_visible(Level::Week));
        state.set_visible(Level::Cycle, true);
        assert!(state.is_visible(Level::Cycle));
    }
}
