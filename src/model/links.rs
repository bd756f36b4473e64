use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A named group of visit days shown as one linked visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitLink {
    pub id: String,
    pub name: String,
    /// Member day ids, in the order they were linked
    pub day_ids: Vec<String>,
}

/// Many-to-many grouping of day leaves, referencing the tree by day id only.
/// Another side table: moves never touch it, deletion prunes memberships and
/// dissolves links left with fewer than two days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitLinkStore {
    links: IndexMap<String, VisitLink>,
    next: u64,
}

impl VisitLinkStore {
    pub fn new() -> Self {
        VisitLinkStore::default()
    }

    /// Link a group of days under a name. Duplicate day ids are collapsed;
    /// fewer than two distinct members is rejected (a link of one day is
    /// meaningless).
    pub fn create(&mut self, name: impl Into<String>, day_ids: &[String]) -> Option<String> {
        let mut members: Vec<String> = Vec::new();
        for day_id in day_ids {
            if !members.contains(day_id) {
                members.push(day_id.clone());
            }
        }
        if members.len() < 2 {
            return None;
        }
        self.next += 1;
        let id = format!("link-{}", self.next);
        self.links.insert(
            id.clone(),
            VisitLink {
                id: id.clone(),
                name: name.into(),
                day_ids: members,
            },
        );
        Some(id)
    }

    pub fn dissolve(&mut self, link_id: &str) -> bool {
        self.links.shift_remove(link_id).is_some()
    }

    pub fn get(&self, link_id: &str) -> Option<&VisitLink> {
        self.links.get(link_id)
    }

    /// Every link a day participates in
    pub fn links_for_day(&self, day_id: &str) -> Vec<&VisitLink> {
        self.links
            .values()
            .filter(|link| link.day_ids.iter().any(|d| d == day_id))
            .collect()
    }

    /// Whether two days share at least one link
    pub fn are_linked(&self, a: &str, b: &str) -> bool {
        self.links.values().any(|link| {
            link.day_ids.iter().any(|d| d == a) && link.day_ids.iter().any(|d| d == b)
        })
    }

    /// Drop deleted days from every link; a link falling below two members
    /// is dissolved with them.
    pub fn prune_days(&mut self, removed_day_ids: &[String]) {
        for link in self.links.values_mut() {
            link.day_ids.retain(|d| !removed_day_ids.contains(d));
        }
        self.links.retain(|_, link| link.day_ids.len() >= 2);
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisitLink> {
        self.links.values()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
