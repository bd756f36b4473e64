use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Cell identity: activity row × day column
pub type CellKey = (String, String);

/// A clinical activity row in the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    /// Grouping header the row is listed under, e.g. "Labs"
    #[serde(default)]
    pub category: Option<String>,
}

impl Activity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Activity {
            id: id.into(),
            name: name.into(),
            category: None,
        }
    }
}

/// How a visit is conducted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitModality {
    InClinic,
    Remote,
    Phone,
    HomeVisit,
}

/// One activity × day intersection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEntry {
    /// Whether the activity occurs at this visit
    pub occurs: bool,
    #[serde(default)]
    pub modality: Option<VisitModality>,
    /// Short cell annotation, e.g. "±2d"
    #[serde(default)]
    pub annotation: Option<String>,
}

impl CellEntry {
    pub fn occurring() -> Self {
        CellEntry {
            occurs: true,
            modality: None,
            annotation: None,
        }
    }
}

/// Activity rows crossed with the visit sequence. Cells are keyed by
/// (activity id, day id), so structural timeline moves never invalidate
/// them; only day deletion prunes entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityGrid {
    pub activities: Vec<Activity>,
    cells: IndexMap<CellKey, CellEntry>,
    next_row: u64,
}

impl ActivityGrid {
    pub fn new() -> Self {
        ActivityGrid::default()
    }

    /// Append a new activity row, returning its generated id
    pub fn add_activity(&mut self, name: impl Into<String>) -> String {
        self.next_row += 1;
        let id = format!("act-{}", self.next_row);
        self.activities.push(Activity::new(id.clone(), name));
        id
    }

    /// Remove an activity row and every cell on it
    pub fn remove_activity(&mut self, id: &str) -> bool {
        let before = self.activities.len();
        self.activities.retain(|a| a.id != id);
        if self.activities.len() == before {
            return false;
        }
        self.cells.retain(|(activity_id, _), _| activity_id != id);
        true
    }

    pub fn rename_activity(&mut self, id: &str, name: impl Into<String>) -> bool {
        match self.activities.iter_mut().find(|a| a.id == id) {
            Some(activity) => {
                activity.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Record a cell entry. Rejected when the activity row does not exist;
    /// day ids are not checked here, the store is independent of the tree.
    pub fn set_cell(&mut self, activity_id: &str, day_id: &str, entry: CellEntry) -> bool {
        if self.activity(activity_id).is_none() {
            return false;
        }
        self.cells
            .insert((activity_id.to_string(), day_id.to_string()), entry);
        true
    }

    pub fn clear_cell(&mut self, activity_id: &str, day_id: &str) -> bool {
        self.cells
            .shift_remove(&(activity_id.to_string(), day_id.to_string()))
            .is_some()
    }

    pub fn cell(&self, activity_id: &str, day_id: &str) -> Option<&CellEntry> {
        self.cells
            .get(&(activity_id.to_string(), day_id.to_string()))
    }

    /// All recorded cells for one activity row, in insertion order
    pub fn cells_for_activity<'a>(
        &'a self,
        activity_id: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a CellEntry)> {
        self.cells
            .iter()
            .filter(move |((aid, _), _)| aid == activity_id)
            .map(|((_, day_id), entry)| (day_id.as_str(), entry))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Drop cells referencing deleted days
    pub fn prune_days(&mut self, removed_day_ids: &[String]) {
        self.cells
            .retain(|(_, day_id), _| !removed_day_ids.contains(day_id));
    }
}
