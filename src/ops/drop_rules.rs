use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::timeline::Level;

/// Where a dragged node lands relative to the drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    /// As the previous sibling of the target
    Before,
    /// As the next sibling of the target
    After,
    /// As a child of the target container
    Inside,
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropPosition::Before => write!(f, "before"),
            DropPosition::After => write!(f, "after"),
            DropPosition::Inside => write!(f, "inside"),
        }
    }
}

/// Fixed drop compatibility table.
///
/// A node may be reordered among same-level siblings (`before`/`after`), or
/// dropped `inside` a container of its immediate parent level. Level skipping
/// (e.g. a day directly inside a cycle) is never valid.
///
/// | dragged | target | positions     |
/// |---------|--------|---------------|
/// | period  | period | before, after |
/// | cycle   | period | inside        |
/// | cycle   | cycle  | before, after |
/// | week    | cycle  | inside        |
/// | week    | week   | before, after |
/// | day     | week   | inside        |
/// | day     | day    | before, after |
pub fn can_drop(dragged: Level, target: Level, position: DropPosition) -> bool {
    use DropPosition::{After, Before, Inside};
    match (dragged, target, position) {
        (Level::Period, Level::Period, Before | After) => true,
        (Level::Cycle, Level::Period, Inside) => true,
        (Level::Cycle, Level::Cycle, Before | After) => true,
        (Level::Week, Level::Cycle, Inside) => true,
        (Level::Week, Level::Week, Before | After) => true,
        (Level::Day, Level::Week, Inside) => true,
        (Level::Day, Level::Day, Before | After) => true,
        _ => false,
    }
}
